/*!
 * Lock-Free Wait Statistics
 * Atomic counters updated on every multiplexed wait
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic wait statistics
///
/// # Performance
/// - Cache-line aligned to prevent false sharing with neighbouring data
/// - Relaxed ordering: counters are diagnostics, not synchronization
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct WaitStats {
    calls: AtomicU64,
    immediate: AtomicU64,
    blocked: AtomicU64,
    ready: AtomicU64,
    timeouts: AtomicU64,
    interrupts: AtomicU64,
    invalid_descriptors: AtomicU64,
    no_valid_targets: AtomicU64,
}

/// Point-in-time copy of `WaitStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitStatsSnapshot {
    pub calls: u64,
    pub immediate: u64,
    pub blocked: u64,
    pub ready: u64,
    pub timeouts: u64,
    pub interrupts: u64,
    pub invalid_descriptors: u64,
    pub no_valid_targets: u64,
}

impl WaitStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Something was ready without blocking
    #[inline(always)]
    pub fn record_immediate(&self) {
        self.immediate.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_blocked(&self) {
        self.blocked.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_ready(&self) {
        self.ready.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_interrupted(&self) {
        self.interrupts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_invalid_descriptor(&self) {
        self.invalid_descriptors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_no_valid_targets(&self) {
        self.no_valid_targets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> WaitStatsSnapshot {
        WaitStatsSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            immediate: self.immediate.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            ready: self.ready.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            interrupts: self.interrupts.load(Ordering::Relaxed),
            invalid_descriptors: self.invalid_descriptors.load(Ordering::Relaxed),
            no_valid_targets: self.no_valid_targets.load(Ordering::Relaxed),
        }
    }
}
