//! Freshness markers
//!
//! Every create or update stamps the resource with a new marker so the host
//! can tell that it was (re)written. Markers come from an injected [`IdSource`]
//! so tests can use deterministic values.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Opaque, monotonically increasing identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FreshnessMarker(i64);

impl FreshnessMarker {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for FreshnessMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of freshness markers
pub trait IdSource: Send + Sync {
    /// A marker strictly greater than every marker this source returned before
    fn next_id(&self) -> FreshnessMarker;
}

/// Wall-clock nanoseconds, forced monotonic
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SystemClock {
    fn next_id(&self) -> FreshnessMarker {
        let now = Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_else(|| Utc::now().timestamp_micros().saturating_mul(1000));
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return FreshnessMarker(next),
                Err(actual) => last = actual,
            }
        }
    }
}

/// Counter starting at a fixed value, for tests and reproducible runs
#[derive(Debug)]
pub struct SequenceIds {
    next: AtomicI64,
}

impl SequenceIds {
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }
}

impl Default for SequenceIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSource for SequenceIds {
    fn next_id(&self) -> FreshnessMarker {
        FreshnessMarker(self.next.fetch_add(1, Ordering::SeqCst))
    }
}
