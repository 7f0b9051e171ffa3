/*!
 * Wait Session
 *
 * Aggregate state of one in-progress multiplexed wait. Owned by the
 * calling thread for the duration of the call; other threads only reach
 * its notifier through wakers and abort handles.
 */

use super::adapter::WaitTarget;
use super::timeout::Deadline;
use super::traits::InterruptSource;
use super::types::WaitEvents;
use super::waker::{AbortHandle, Enrollment, SessionNotifier, SessionState, TicketToken, Waker};
use crate::core::errors::{WaitError, WaitResult};
use crate::core::sync::SyncConfig;
use crate::core::types::Tid;
use std::sync::Arc;
use std::time::Instant;
use tracing::trace;
use uuid::Uuid;

/// One enrolled wait on one object
#[derive(Debug)]
pub struct WaitTicket {
    /// Index of the owning descriptor
    index: usize,
    /// Liveness reference, released on disenroll
    target: Option<WaitTarget>,
    token: Option<TicketToken>,
    interest: WaitEvents,
    enrolled_at: Instant,
}

impl WaitTicket {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn interest(&self) -> WaitEvents {
        self.interest
    }

    #[inline]
    pub fn enrolled_at(&self) -> Instant {
        self.enrolled_at
    }

    #[inline]
    pub fn is_enrolled(&self) -> bool {
        self.token.is_some()
    }

    /// Leave the object's wait queue and drop the liveness reference
    ///
    /// Returns true only on the call that actually released something.
    pub fn disenroll(&mut self) -> bool {
        let target = self.target.take();
        match (target, self.token.take()) {
            (Some(target), Some(token)) => {
                target.disenroll(token);
                true
            }
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// State of one multiplexed wait
pub struct WaitSession {
    id: Uuid,
    notifier: Arc<SessionNotifier>,
    tickets: Vec<WaitTicket>,
    capacity: usize,
    deadline: Deadline,
}

impl WaitSession {
    /// Allocate a session able to hold `capacity` tickets
    pub fn new(capacity: usize, deadline: Deadline, sync: &SyncConfig) -> WaitResult<Self> {
        let notifier = SessionNotifier::try_new(capacity, sync)?;
        let mut tickets = Vec::new();
        tickets.try_reserve_exact(capacity).map_err(|e| {
            WaitError::ResourceExhausted(format!("{capacity} wait tickets: {e}"))
        })?;

        Ok(Self {
            id: Uuid::new_v4(),
            notifier,
            tickets,
            capacity,
            deadline,
        })
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.notifier.state()
    }

    #[inline]
    pub fn notifier(&self) -> &SessionNotifier {
        &self.notifier
    }

    pub(crate) fn advance(&self, to: SessionState) {
        trace!(session = %self.id, state = ?to, "wait session transition");
        self.notifier.advance(to);
    }

    /// Handle for asynchronous abort of this session
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle::new(&self.notifier)
    }

    #[inline]
    pub fn tickets(&self) -> &[WaitTicket] {
        &self.tickets
    }

    /// Enroll `target` on behalf of descriptor `index`
    ///
    /// An object that turned ready between the caller's check and the
    /// enqueue reports `Enrollment::Ready` and takes no ticket.
    pub fn enroll(&mut self, index: usize, target: WaitTarget, interest: WaitEvents) -> WaitResult<Enrollment> {
        let slot = self.tickets.len();
        if slot >= self.capacity {
            return Err(WaitError::ResourceExhausted(format!(
                "ticket table full at {slot}"
            )));
        }

        let enrollment = target.enroll(interest, Waker::new(&self.notifier, slot));
        if let Enrollment::Enrolled(token) = enrollment {
            self.tickets.push(WaitTicket {
                index,
                target: Some(target),
                token: Some(token),
                interest,
                enrolled_at: Instant::now(),
            });
        }
        Ok(enrollment)
    }

    /// Disenroll every ticket and collect latched events
    ///
    /// Yields `(descriptor index, events)` for each ticket that fired.
    pub fn drain(&mut self) -> Vec<(usize, WaitEvents)> {
        if self.state() < SessionState::Draining {
            self.advance(SessionState::Draining);
        }

        let mut fired = Vec::new();
        for (slot, ticket) in self.tickets.iter_mut().enumerate() {
            ticket.disenroll();
            let events = self.notifier.take(slot) & ticket.interest;
            if !events.is_empty() {
                fired.push((ticket.index, events));
            }
        }

        self.advance(SessionState::Done);
        fired
    }
}

impl Drop for WaitSession {
    fn drop(&mut self) {
        // Early exits still leave no queue entries behind
        for ticket in &mut self.tickets {
            ticket.disenroll();
        }
        self.notifier.advance(SessionState::Done);
    }
}

/// Registration of an interruptible wait with the signal subsystem
///
/// Unregisters on drop.
pub struct InterruptGuard<'a> {
    source: &'a dyn InterruptSource,
    tid: Tid,
}

impl<'a> InterruptGuard<'a> {
    pub fn register(source: &'a dyn InterruptSource, tid: Tid, handle: AbortHandle) -> Self {
        source.register_wait(tid, handle);
        Self { source, tid }
    }
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        self.source.unregister_wait(self.tid);
    }
}
