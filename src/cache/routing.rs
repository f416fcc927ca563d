//! In-memory TTL cache for persona routing analyses
//!
//! Provides a `RoutingCache` that maps a normalized question to the routing
//! analysis computed for it, so equivalent questions typed again within the
//! TTL window skip classification.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use crate::routing::RoutingAnalysis;

/// Default time-to-live for routing cache entries (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Anything that is neither a word character nor whitespace
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("static pattern is valid"));

/// Runs of whitespace
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static pattern is valid"));

/// Normalizes a question into its cache key
///
/// Lower-cases the text, strips every character that is not a word character
/// or whitespace, collapses whitespace runs to a single space and trims the
/// ends. Questions that differ only in case, punctuation or spacing share a
/// key.
///
/// ```
/// use persona_router::cache::normalize;
///
/// assert_eq!(normalize("  QUAL A DOSE?!?  "), "qual a dose");
/// ```
pub fn normalize(question: &str) -> String {
    let lowered = question.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// A stored analysis and the instant it was written
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached analysis
    analysis: RoutingAnalysis,
    /// When the entry was stored, in milliseconds since the epoch
    timestamp: i64,
}

/// Memoizes routing analyses by normalized question
///
/// Every entry shares the same TTL. Reads never refresh an entry's age.
/// Expired entries are dropped when a `get` runs into them, and all expired
/// entries are swept after each `set`.
#[derive(Debug)]
pub struct RoutingCache<C: Clock = SystemClock> {
    /// Entries keyed by normalized question
    entries: HashMap<String, CacheEntry>,
    /// Time-to-live in milliseconds
    ttl_millis: i64,
    /// Time source for timestamps and expiry checks
    clock: C,
}

impl RoutingCache<SystemClock> {
    /// Creates an empty cache with the default 5 minute TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates an empty cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl Default for RoutingCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RoutingCache<C> {
    /// Creates an empty cache reading time from `clock`
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_millis: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            clock,
        }
    }

    /// Returns the TTL applied to every entry
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_millis.max(0) as u64)
    }

    /// Stores an analysis for `question`, replacing any entry with the same
    /// normalized key, then sweeps expired entries
    pub fn set(&mut self, question: &str, analysis: RoutingAnalysis) {
        let key = normalize(question);
        let timestamp = self.clock.now_millis();
        debug!(key = %key, "caching routing analysis");

        self.entries.insert(
            key,
            CacheEntry {
                analysis,
                timestamp,
            },
        );

        self.purge_expired();
    }

    /// Looks up the analysis for `question`
    ///
    /// Returns `None` when no entry exists or the entry has expired; an
    /// expired entry is removed as a side effect.
    pub fn get(&mut self, question: &str) -> Option<RoutingAnalysis> {
        let key = normalize(question);
        let now = self.clock.now_millis();

        let entry = self.entries.get(&key)?;
        if self.is_fresh(entry, now) {
            debug!(key = %key, "routing cache hit");
            return Some(entry.analysis.clone());
        }

        debug!(key = %key, "routing cache entry expired");
        self.entries.remove(&key);
        None
    }

    /// Number of resident entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_fresh(&self, entry: &CacheEntry, now: i64) -> bool {
        now.saturating_sub(entry.timestamp) < self.ttl_millis
    }

    /// Removes every entry whose age has reached the TTL
    fn purge_expired(&mut self) {
        let now = self.clock.now_millis();
        let ttl_millis = self.ttl_millis;
        let before = self.entries.len();

        self.entries
            .retain(|_, entry| now.saturating_sub(entry.timestamp) < ttl_millis);

        let purged = before - self.entries.len();
        if purged > 0 {
            debug!(purged, remaining = self.entries.len(), "swept expired routing entries");
        }
    }
}
