/*!
 * Thread Object
 *
 * Waitable record of a kernel thread. Becomes INVALID when the thread
 * exits; the exit status stays readable afterwards.
 */

use crate::core::types::ObjectId;
use crate::wait::{Enrollment, ObjectType, TicketToken, WaitEvents, Waitable, WaiterList, Waker};
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug)]
struct ThreadState {
    exit_status: Option<i32>,
    waiters: WaiterList,
}

impl ThreadState {
    fn events(&self) -> WaitEvents {
        if self.exit_status.is_some() {
            WaitEvents::INVALID
        } else {
            WaitEvents::empty()
        }
    }
}

/// Waitable thread record
#[derive(Debug)]
pub struct ThreadObject {
    id: ObjectId,
    name: String,
    state: Mutex<ThreadState>,
}

impl ThreadObject {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            state: Mutex::new(ThreadState {
                exit_status: None,
                waiters: WaiterList::new(),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record thread termination and wake waiters
    ///
    /// Returns false if the thread had already exited.
    pub fn exit(&self, status: i32) -> bool {
        let mut state = self.state.lock();
        if state.exit_status.is_some() {
            return false;
        }
        state.exit_status = Some(status);
        let events = state.events();
        let woken = state.waiters.notify(events);
        debug!(tid = self.id, status, woken, "thread exited");
        true
    }

    pub fn exit_status(&self) -> Option<i32> {
        self.state.lock().exit_status
    }

    pub fn is_alive(&self) -> bool {
        self.exit_status().is_none()
    }
}

impl Waitable for ThreadObject {
    fn object_type(&self) -> ObjectType {
        ObjectType::Thread
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
