/*!
 * Signal Manager
 * Per-thread pending signals and abort of interruptible waits
 */

use super::types::{PendingSignal, Signal, SignalError, SignalResult, SignalStats};
use crate::core::limits::MAX_PENDING_SIGNALS;
use crate::core::time::system_time;
use crate::core::types::Tid;
use crate::wait::{AbortHandle, InterruptSource};
use ahash::RandomState;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct ThreadSignals {
    pending: VecDeque<PendingSignal>,
    blocked: Vec<Signal>,
    active_wait: Option<AbortHandle>,
}

impl ThreadSignals {
    fn is_deliverable(&self, signal: Signal) -> bool {
        !signal.can_catch() || !self.blocked.contains(&signal)
    }

    fn has_deliverable(&self) -> bool {
        self.pending.iter().any(|p| self.is_deliverable(p.signal))
    }
}

/// Signal manager implementation
///
/// # Performance
/// - Cache-line aligned to prevent false sharing of atomic counters
#[repr(C, align(64))]
#[derive(Clone)]
pub struct SignalManager {
    threads: Arc<DashMap<Tid, ThreadSignals, RandomState>>,
    sent: Arc<AtomicU64>,
    delivered: Arc<AtomicU64>,
    interrupted: Arc<AtomicU64>,
}

impl SignalManager {
    pub fn new() -> Self {
        info!("Signal manager initialized");
        Self {
            threads: Arc::new(DashMap::with_hasher(RandomState::new())),
            sent: Arc::new(AtomicU64::new(0)),
            delivered: Arc::new(AtomicU64::new(0)),
            interrupted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Queue a signal for a thread, aborting its interruptible wait if deliverable
    pub fn send(&self, sender: Tid, target: Tid, signal: Signal) -> SignalResult<()> {
        let abort = {
            let mut thread = self.threads.entry(target).or_default();
            if thread.pending.len() >= MAX_PENDING_SIGNALS {
                warn!(tid = target, "signal queue full");
                return Err(SignalError::QueueFull(target));
            }
            thread.pending.push_back(PendingSignal {
                signal,
                sender,
                timestamp: system_time(),
            });
            if thread.is_deliverable(signal) {
                thread.active_wait.clone()
            } else {
                debug!(tid = target, %signal, "signal blocked, left pending");
                None
            }
        };
        self.sent.fetch_add(1, Ordering::Relaxed);
        debug!(from = sender, to = target, %signal, "signal queued");

        // Abort outside the table lock
        if let Some(handle) = abort {
            if handle.abort() {
                self.interrupted.fetch_add(1, Ordering::Relaxed);
                debug!(tid = target, %signal, "interrupted wait");
            }
        }
        Ok(())
    }

    /// Block a signal for a thread
    pub fn block(&self, tid: Tid, signal: Signal) -> SignalResult<()> {
        if !signal.can_catch() {
            return Err(SignalError::Unblockable(signal));
        }
        let mut thread = self.threads.entry(tid).or_default();
        if !thread.blocked.contains(&signal) {
            thread.blocked.push(signal);
        }
        Ok(())
    }

    /// Unblock a signal; a pending instance now aborts the active wait
    pub fn unblock(&self, tid: Tid, signal: Signal) {
        let abort = self.threads.get_mut(&tid).and_then(|mut thread| {
            thread.blocked.retain(|s| *s != signal);
            let now_deliverable = thread.pending.iter().any(|p| p.signal == signal);
            now_deliverable.then(|| thread.active_wait.clone()).flatten()
        });
        if let Some(handle) = abort {
            if handle.abort() {
                self.interrupted.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn is_blocked(&self, tid: Tid, signal: Signal) -> bool {
        self.threads
            .get(&tid)
            .is_some_and(|t| t.blocked.contains(&signal))
    }

    /// Remove and return deliverable pending signals, oldest first
    pub fn take_pending(&self, tid: Tid) -> Vec<PendingSignal> {
        let Some(mut thread) = self.threads.get_mut(&tid) else {
            return Vec::new();
        };
        let blocked = thread.blocked.clone();
        let (deliver, keep): (Vec<_>, Vec<_>) = thread
            .pending
            .drain(..)
            .partition(|p| !p.signal.can_catch() || !blocked.contains(&p.signal));
        thread.pending = keep.into();
        self.delivered
            .fetch_add(deliver.len() as u64, Ordering::Relaxed);
        deliver
    }

    /// Discard every pending signal of a thread, blocked ones included
    pub fn clear_pending(&self, tid: Tid) -> usize {
        self.threads.get_mut(&tid).map_or(0, |mut thread| {
            let cleared = thread.pending.len();
            thread.pending.clear();
            cleared
        })
    }

    /// Number of pending signals, blocked ones included
    pub fn pending_count(&self, tid: Tid) -> usize {
        self.threads.get(&tid).map_or(0, |t| t.pending.len())
    }

    /// Drop all signal state of an exited thread
    pub fn cleanup_thread(&self, tid: Tid) -> usize {
        self.threads
            .remove(&tid)
            .map_or(0, |(_, t)| t.pending.len())
    }

    pub fn stats(&self) -> SignalStats {
        SignalStats {
            total_signals_sent: self.sent.load(Ordering::Relaxed),
            total_signals_delivered: self.delivered.load(Ordering::Relaxed),
            waits_interrupted: self.interrupted.load(Ordering::Relaxed),
            pending_signals: self.threads.iter().map(|t| t.pending.len()).sum(),
        }
    }
}

impl Default for SignalManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptSource for SignalManager {
    fn has_pending(&self, tid: Tid) -> bool {
        self.threads.get(&tid).is_some_and(|t| t.has_deliverable())
    }

    fn register_wait(&self, tid: Tid, handle: AbortHandle) {
        self.threads.entry(tid).or_default().active_wait = Some(handle);
    }

    fn unregister_wait(&self, tid: Tid) {
        if let Some(mut thread) = self.threads.get_mut(&tid) {
            thread.active_wait = None;
        }
    }
}
