/*!
 * Message Port
 *
 * Bounded message queue. READ while a message is queued, WRITE while
 * below capacity, INVALID once closed.
 */

use crate::core::errors::{ObjectError, ObjectResult};
use crate::core::types::ObjectId;
use crate::wait::{Enrollment, ObjectType, TicketToken, WaitEvents, Waitable, WaiterList, Waker};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

/// One queued message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMessage {
    pub code: i32,
    pub data: Vec<u8>,
}

#[derive(Debug)]
struct PortState {
    queue: VecDeque<PortMessage>,
    closed: bool,
    waiters: WaiterList,
}

/// Message port
#[derive(Debug)]
pub struct Port {
    id: ObjectId,
    capacity: usize,
    state: Mutex<PortState>,
}

impl Port {
    pub fn new(id: ObjectId, capacity: usize) -> Self {
        Self {
            id,
            capacity: capacity.max(1),
            state: Mutex::new(PortState {
                queue: VecDeque::new(),
                closed: false,
                waiters: WaiterList::new(),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn events(&self, state: &PortState) -> WaitEvents {
        if state.closed {
            return WaitEvents::INVALID;
        }
        let mut events = WaitEvents::empty();
        if !state.queue.is_empty() {
            events |= WaitEvents::READ;
        }
        if state.queue.len() < self.capacity {
            events |= WaitEvents::WRITE;
        }
        events
    }

    /// Queue a message without blocking
    pub fn write(&self, code: i32, data: impl Into<Vec<u8>>) -> ObjectResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(ObjectError::Closed);
        }
        if state.queue.len() >= self.capacity {
            return Err(ObjectError::Full);
        }
        state.queue.push_back(PortMessage {
            code,
            data: data.into(),
        });
        let events = self.events(&state);
        let woken = state.waiters.notify(events);
        trace!(port = self.id, queued = state.queue.len(), woken, "port message written");
        Ok(())
    }

    /// Dequeue a message without blocking
    pub fn read(&self) -> ObjectResult<PortMessage> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(ObjectError::Closed);
        }
        let message = state.queue.pop_front().ok_or(ObjectError::WouldBlock)?;
        let events = self.events(&state);
        state.waiters.notify(events);
        Ok(message)
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close the port, discarding queued messages
    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        state.queue.clear();
        let events = self.events(&state);
        state.waiters.notify(events);
    }
}

impl Waitable for Port {
    fn object_type(&self) -> ObjectType {
        ObjectType::Port
    }

    fn id(&self) -> ObjectId {
        self.id
    }

    fn poll_events(&self) -> WaitEvents {
        let state = self.state.lock();
        self.events(&state)
    }

    fn enroll(&self, interest: WaitEvents, waker: Waker) -> Enrollment {
        let mut state = self.state.lock();
        let current = self.events(&state);
        state.waiters.enroll(current, interest, waker)
    }

    fn disenroll(&self, token: TicketToken) -> bool {
        self.state.lock().waiters.remove(token)
    }

    fn waiter_count(&self) -> usize {
        self.state.lock().waiters.len()
    }
}
