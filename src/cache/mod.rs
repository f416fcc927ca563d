//! Cache module for memoizing persona routing analyses
//!
//! This module provides an in-memory cache keyed by normalized question text
//! with a single TTL for every entry. Nothing is persisted; the cache lives as
//! long as the process that owns it.

mod clock;
mod routing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use routing::{normalize, RoutingCache, DEFAULT_TTL};
