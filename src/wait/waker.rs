/*!
 * Session Notifier and Object Wait Queues
 *
 * The notifier is the only part of a wait session that other threads
 * touch. Object wait queues hold a `Waker`: a weak back-reference to the
 * notifier plus the ticket's slot index. Upgrading fails once the session
 * is gone, and the session state flag turns late notifications into
 * no-ops, so a queue entry can never keep a session alive or reach a
 * destroyed one.
 */

use super::types::WaitEvents;
use crate::core::errors::{WaitError, WaitResult};
use crate::core::sync::{SyncConfig, WakeEvent};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Lifecycle of a wait session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum SessionState {
    Resolving = 0,
    Enrolling = 1,
    Blocked = 2,
    Draining = 3,
    Done = 4,
}

impl SessionState {
    #[inline]
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Resolving,
            1 => Self::Enrolling,
            2 => Self::Blocked,
            3 => Self::Draining,
            _ => Self::Done,
        }
    }
}

/// Shared notification side of a wait session
pub struct SessionNotifier {
    state: AtomicU8,
    latched: Box<[AtomicU16]>,
    latched_slots: AtomicUsize,
    timed_out: AtomicBool,
    interrupted: AtomicBool,
    event: WakeEvent,
}

impl SessionNotifier {
    pub(crate) fn try_new(slots: usize, sync: &SyncConfig) -> WaitResult<Arc<Self>> {
        let mut latched = Vec::new();
        latched.try_reserve_exact(slots).map_err(|e| {
            WaitError::ResourceExhausted(format!("{slots} ticket slots: {e}"))
        })?;
        latched.extend((0..slots).map(|_| AtomicU16::new(0)));

        Ok(Arc::new(Self {
            state: AtomicU8::new(SessionState::Resolving as u8),
            latched: latched.into_boxed_slice(),
            latched_slots: AtomicUsize::new(0),
            timed_out: AtomicBool::new(false),
            interrupted: AtomicBool::new(false),
            event: WakeEvent::new(sync),
        }))
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn advance(&self, to: SessionState) {
        self.state.store(to as u8, Ordering::Release);
    }

    /// Latch fired events into a ticket slot and wake the owner
    ///
    /// Returns false once the session is done or the slot is unknown.
    pub(crate) fn latch(&self, slot: usize, events: WaitEvents) -> bool {
        let state = self.state();
        if state == SessionState::Done || events.is_empty() {
            return false;
        }
        let Some(cell) = self.latched.get(slot) else {
            return false;
        };
        if cell.fetch_or(events.bits(), Ordering::AcqRel) == 0 {
            self.latched_slots.fetch_add(1, Ordering::AcqRel);
        }
        if state <= SessionState::Blocked {
            self.event.signal();
        }
        true
    }

    /// Take whatever was latched for a slot
    pub(crate) fn take(&self, slot: usize) -> WaitEvents {
        let bits = self
            .latched
            .get(slot)
            .map_or(0, |cell| cell.swap(0, Ordering::AcqRel));
        if bits != 0 {
            self.latched_slots.fetch_sub(1, Ordering::AcqRel);
        }
        WaitEvents::from_bits_truncate(bits)
    }

    #[inline]
    pub(crate) fn any_latched(&self) -> bool {
        self.latched_slots.load(Ordering::Acquire) > 0
    }

    /// Mark the session interrupted; no-op once past `Blocked`
    pub(crate) fn interrupt(&self) -> bool {
        self.raise(&self.interrupted)
    }

    /// Mark the session timed out; no-op once past `Blocked`
    pub(crate) fn expire(&self) -> bool {
        self.raise(&self.timed_out)
    }

    fn raise(&self, flag: &AtomicBool) -> bool {
        if self.state() > SessionState::Blocked {
            return false;
        }
        // Exactly one signal per flag
        if flag.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.event.signal();
        true
    }

    #[inline]
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_timed_out(&self) -> bool {
        self.timed_out.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn event(&self) -> &WakeEvent {
        &self.event
    }
}

impl fmt::Debug for SessionNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionNotifier")
            .field("state", &self.state())
            .field("slots", &self.latched.len())
            .field("timed_out", &self.is_timed_out())
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}

/// Back-reference from an object's wait queue to one ticket
#[derive(Clone)]
pub struct Waker {
    notifier: Weak<SessionNotifier>,
    slot: usize,
}

impl Waker {
    pub(crate) fn new(notifier: &Arc<SessionNotifier>, slot: usize) -> Self {
        Self {
            notifier: Arc::downgrade(notifier),
            slot,
        }
    }

    /// Deliver events to the ticket; false if the session is gone or done
    #[inline]
    pub fn wake(&self, events: WaitEvents) -> bool {
        self.notifier
            .upgrade()
            .is_some_and(|notifier| notifier.latch(self.slot, events))
    }

    /// Check whether the owning session still accepts notifications
    #[inline]
    pub fn is_live(&self) -> bool {
        self.notifier
            .upgrade()
            .is_some_and(|notifier| notifier.state() != SessionState::Done)
    }
}

impl fmt::Debug for Waker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waker")
            .field("slot", &self.slot)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Handle used by signal delivery to abort a blocked wait
#[derive(Clone)]
pub struct AbortHandle {
    notifier: Weak<SessionNotifier>,
}

impl AbortHandle {
    pub(crate) fn new(notifier: &Arc<SessionNotifier>) -> Self {
        Self {
            notifier: Arc::downgrade(notifier),
        }
    }

    /// Interrupt the wait; returns false if it already finished or was aborted
    pub fn abort(&self) -> bool {
        self.notifier
            .upgrade()
            .is_some_and(|notifier| notifier.interrupt())
    }
}

impl fmt::Debug for AbortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortHandle")
            .field("live", &(self.notifier.strong_count() > 0))
            .finish()
    }
}

/// Opaque token identifying one entry of an object's wait queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicketToken(u64);

/// Outcome of an atomic check-then-enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrollment {
    /// Already ready with these events; nothing was enqueued
    Ready(WaitEvents),
    /// Enqueued; a later readiness change will wake the ticket
    Enrolled(TicketToken),
}

struct WaitEntry {
    token: TicketToken,
    interest: WaitEvents,
    waker: Waker,
}

/// Per-object wait queue
///
/// Always lives inside the owning object's lock, next to the state that
/// decides readiness.
#[derive(Default)]
pub struct WaiterList {
    entries: Vec<WaitEntry>,
    next_token: u64,
}

impl WaiterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `current` readiness against `interest`, enqueueing if not ready
    ///
    /// Callers hold the object lock across computing `current` and this
    /// call, which is what makes the check-then-insert race free.
    pub fn enroll(&mut self, current: WaitEvents, interest: WaitEvents, waker: Waker) -> Enrollment {
        let ready = current & interest;
        if !ready.is_empty() {
            return Enrollment::Ready(ready);
        }
        let token = TicketToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.entries.push(WaitEntry {
            token,
            interest,
            waker,
        });
        Enrollment::Enrolled(token)
    }

    /// Remove an entry; returns false if it was already gone
    pub fn remove(&mut self, token: TicketToken) -> bool {
        match self.entries.iter().position(|e| e.token == token) {
            Some(pos) => {
                self.entries.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    /// Wake every entry interested in `events`
    ///
    /// Fired entries leave the queue; entries whose session is gone are
    /// pruned. Returns how many waiters were woken.
    pub fn notify(&mut self, events: WaitEvents) -> usize {
        if events.is_empty() || self.entries.is_empty() {
            return 0;
        }
        let mut woken = 0;
        self.entries.retain(|entry| {
            let fired = entry.interest & events;
            if fired.is_empty() {
                return entry.waker.is_live();
            }
            if entry.waker.wake(fired) {
                woken += 1;
            }
            false
        });
        woken
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for WaiterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaiterList")
            .field("len", &self.entries.len())
            .finish()
    }
}
