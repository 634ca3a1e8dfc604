//! Counters for record checking
//!
//! - Counters only, monotonic
//! - Thread-safe, Relaxed ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Outcome counters for a batch of check requests
#[derive(Debug, Default)]
pub struct CheckMetrics {
    checked: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    incomplete: AtomicU64,
    malformed: AtomicU64,
}

impl CheckMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record passed validation
    pub fn record_accepted(&self, complete: bool) {
        self.checked.fetch_add(1, Ordering::Relaxed);
        self.accepted.fetch_add(1, Ordering::Relaxed);
        if !complete {
            self.incomplete.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// A record failed validation or completeness rules
    pub fn record_rejected(&self) {
        self.checked.fetch_add(1, Ordering::Relaxed);
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// A request line could not be parsed
    pub fn request_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CheckSnapshot {
        CheckSnapshot {
            checked: self.checked.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            incomplete: self.incomplete.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of `CheckMetrics`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckSnapshot {
    pub checked: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub incomplete: u64,
    pub malformed: u64,
}
