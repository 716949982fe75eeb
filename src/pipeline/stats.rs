//! Throughput counters shared across pipeline calls.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lock-free processing counters.
#[derive(Debug, Default)]
pub struct PipelineStats {
    total: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    fallbacks: AtomicU64,
    skipped: AtomicU64,
    time_micros: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub fallbacks: u64,
    pub skipped: u64,
    pub total_time: Duration,
}

impl StatsSnapshot {
    /// Share of units that succeeded.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64
        }
    }

    /// Mean time per unit.
    pub fn average_time(&self) -> Duration {
        if self.total == 0 {
            Duration::ZERO
        } else {
            self.total_time / self.total as u32
        }
    }
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_success(&self, elapsed: Duration, fallback: bool, skipped: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        if fallback {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        if skipped {
            self.skipped.fetch_add(1, Ordering::Relaxed);
        }
        self.add_time(elapsed);
    }

    pub(crate) fn record_failure(&self, elapsed: Duration) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.add_time(elapsed);
    }

    fn add_time(&self, elapsed: Duration) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.time_micros.fetch_add(micros, Ordering::Relaxed);
    }

    /// Copy the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            total_time: Duration::from_micros(self.time_micros.load(Ordering::Relaxed)),
        }
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for counter in [
            &self.total,
            &self.succeeded,
            &self.failed,
            &self.fallbacks,
            &self.skipped,
            &self.time_micros,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
