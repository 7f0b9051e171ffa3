/*!
 * Counting Semaphore
 *
 * READ (acquire possible) while the count is positive; INVALID once
 * deleted. Releases wake waiters under the same lock that guards the
 * count.
 */

use crate::core::errors::{ObjectError, ObjectResult};
use crate::core::types::ObjectId;
use crate::wait::{Enrollment, ObjectType, TicketToken, WaitEvents, Waitable, WaiterList, Waker};
use parking_lot::Mutex;
use tracing::trace;

#[derive(Debug)]
struct SemaphoreState {
    count: i32,
    deleted: bool,
    waiters: WaiterList,
}

impl SemaphoreState {
    fn events(&self) -> WaitEvents {
        if self.deleted {
            WaitEvents::INVALID
        } else if self.count > 0 {
            WaitEvents::ACQUIRE_SEMAPHORE
        } else {
            WaitEvents::empty()
        }
    }
}

/// Counting semaphore
#[derive(Debug)]
pub struct Semaphore {
    id: ObjectId,
    state: Mutex<SemaphoreState>,
}

impl Semaphore {
    pub fn new(id: ObjectId, count: i32) -> Self {
        Self {
            id,
            state: Mutex::new(SemaphoreState {
                count,
                deleted: false,
                waiters: WaiterList::new(),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Current count
    pub fn count(&self) -> i32 {
        self.state.lock().count
    }

    /// Add `n` to the count and wake waiters
    pub fn release(&self, n: i32) -> ObjectResult<()> {
        if n <= 0 {
            return Err(ObjectError::InvalidArgument(format!("release count {n}")));
        }
        let mut state = self.state.lock();
        if state.deleted {
            return Err(ObjectError::Closed);
        }
        state.count = state.count.saturating_add(n);
        let events = state.events();
        let woken = state.waiters.notify(events);
        trace!(sem = self.id, count = state.count, woken, "semaphore released");
        Ok(())
    }

    /// Take `n` from the count without blocking
    pub fn try_acquire(&self, n: i32) -> ObjectResult<()> {
        if n <= 0 {
            return Err(ObjectError::InvalidArgument(format!("acquire count {n}")));
        }
        let mut state = self.state.lock();
        if state.deleted {
            return Err(ObjectError::Closed);
        }
        if state.count < n {
            return Err(ObjectError::WouldBlock);
        }
        state.count -= n;
        Ok(())
    }

    /// Mark deleted and wake every waiter with INVALID
    pub(crate) fn delete(&self) {
        let mut state = self.state.lock();
        if state.deleted {
            return;
        }
        state.deleted = true;
        let events = state.events();
        state.waiters.notify(events);
    }

    pub fn is_deleted(&self) -> bool {
        self.state.lock().deleted
    }
}

impl Waitable for Semaphore {
    fn object_type(&self) -> ObjectType {
        ObjectType::Semaphore
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn poll_events(&self) -> WaitEvents {
        self.state.lock().events()
    }

    fn enroll(&self, interest: WaitEvents, waker: Waker) -> Enrollment {
        let mut state = self.state.lock();
        let current = state.events();
        state.waiters.enroll(current, interest, waker)
    }

    fn disenroll(&self, token: TicketToken) -> bool {
        self.state.lock().waiters.remove(token)
    }

    fn waiter_count(&self) -> usize {
        self.state.lock().waiters.len()
    }
}
