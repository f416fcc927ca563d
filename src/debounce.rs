//! Input debouncing for the question box
//!
//! Routing runs only after the user stops typing for a short while, so a
//! burst of keystrokes produces one analysis instead of one per key.

use std::time::{Duration, Instant};

/// Shortest accepted debounce delay
pub const MIN_DEBOUNCE: Duration = Duration::from_millis(300);

/// Longest accepted debounce delay
pub const MAX_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Default debounce delay
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Fires once after a period of input inactivity
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_input: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    /// Creates a debouncer with the given inactivity delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_input: None,
        }
    }

    /// The inactivity delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records input activity at `now`, restarting the wait
    pub fn touch(&mut self, now: Instant) {
        self.last_input = Some(now);
    }

    /// Returns true exactly once when `delay` has passed since the last input
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_input {
            Some(last) if now.saturating_duration_since(last) >= self.delay => {
                self.last_input = None;
                true
            }
            _ => false,
        }
    }

    /// Whether input is waiting to fire
    pub fn is_pending(&self) -> bool {
        self.last_input.is_some()
    }

    /// Drops any pending input without firing
    pub fn cancel(&mut self) {
        self.last_input = None;
    }
}
