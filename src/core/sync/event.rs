/*!
 * Wake Event
 *
 * Single-consumer, multi-producer wake primitive built on
 * parking_lot::Condvar with an optional adaptive spin phase.
 *
 * The signalled flag is sticky: a signal that arrives before the consumer
 * starts waiting is consumed by the next wait instead of being lost.
 */

use super::config::{StrategyType, SyncConfig};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Result of a wait on the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// The event was signalled
    Signaled,
    /// The deadline passed with no signal
    TimedOut,
}

impl WakeResult {
    /// Check if the wait ended because of a signal
    #[inline(always)]
    pub fn is_signaled(&self) -> bool {
        matches!(self, WakeResult::Signaled)
    }
}

/// Private wake event of one waiter
#[repr(C, align(64))] // Cache-line aligned to prevent false sharing
pub struct WakeEvent {
    signaled: AtomicBool,
    mutex: Mutex<()>,
    condvar: Condvar,
    strategy: StrategyType,
    spin_duration: Duration,
    max_spins: u32,
}

impl WakeEvent {
    /// Create a new event with the given configuration
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            signaled: AtomicBool::new(false),
            mutex: Mutex::new(()),
            condvar: Condvar::new(),
            strategy: config.select_strategy(),
            spin_duration: config.spin_duration,
            max_spins: config.max_spins,
        }
    }

    /// Signal the event
    ///
    /// Never blocks for longer than the internal lock hold of the waiter's
    /// check, so it is safe from any producer context.
    #[inline]
    pub fn signal(&self) {
        self.signaled.store(true, Ordering::Release);
        let _guard = self.mutex.lock();
        self.condvar.notify_one();
    }

    /// Check whether a signal is pending without consuming it
    #[inline]
    pub fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }

    /// Name of the active strategy
    pub fn strategy_name(&self) -> &'static str {
        match self.strategy {
            StrategyType::Park => "park",
            StrategyType::SpinThenPark => "spin-then-park",
            StrategyType::Auto => "auto",
        }
    }

    /// Consume a pending signal, or block until one arrives or the deadline passes
    ///
    /// `None` waits forever.
    pub fn wait_until(&self, deadline: Option<Instant>) -> WakeResult {
        if self.consume() {
            return WakeResult::Signaled;
        }

        if self.strategy == StrategyType::SpinThenPark && self.spin(deadline) {
            return WakeResult::Signaled;
        }

        let mut guard = self.mutex.lock();
        loop {
            if self.consume() {
                return WakeResult::Signaled;
            }
            match deadline {
                None => self.condvar.wait(&mut guard),
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return WakeResult::TimedOut;
                    }
                    if self.condvar.wait_until(&mut guard, deadline).timed_out() {
                        return if self.consume() {
                            WakeResult::Signaled
                        } else {
                            WakeResult::TimedOut
                        };
                    }
                }
            }
        }
    }

    #[inline]
    fn consume(&self) -> bool {
        self.signaled.swap(false, Ordering::AcqRel)
    }

    /// Adaptive spin before parking
    ///
    /// Returns true if a signal was consumed while spinning
    fn spin(&self, deadline: Option<Instant>) -> bool {
        let start = Instant::now();
        let mut spin_count = 0u32;

        loop {
            if self.consume() {
                return true;
            }

            if start.elapsed() >= self.spin_duration || spin_count >= self.max_spins {
                return false;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return false;
            }

            // Yield to scheduler occasionally
            if spin_count % 10 == 0 {
                thread::yield_now();
            } else {
                std::hint::spin_loop();
            }

            spin_count += 1;
        }
    }
}

impl Default for WakeEvent {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}
