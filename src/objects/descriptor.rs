/*!
 * Descriptor Endpoint
 *
 * Bounded byte-stream endpoint standing behind a file descriptor number.
 * READ while data is buffered, WRITE while there is room, ERROR once an
 * error is latched, DISCONNECTED after hang-up, INVALID once closed.
 */

use crate::core::errors::{ObjectError, ObjectResult};
use crate::core::types::ObjectId;
use crate::wait::{Enrollment, ObjectType, TicketToken, WaitEvents, Waitable, WaiterList, Waker};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::{debug, trace};

#[derive(Debug)]
struct DescriptorState {
    buffer: VecDeque<u8>,
    error: bool,
    hung_up: bool,
    closed: bool,
    waiters: WaiterList,
}

/// I/O descriptor endpoint
#[derive(Debug)]
pub struct Descriptor {
    fd: ObjectId,
    capacity: usize,
    state: Mutex<DescriptorState>,
}

impl Descriptor {
    pub fn new(fd: ObjectId, capacity: usize) -> Self {
        Self {
            fd,
            capacity: capacity.max(1),
            state: Mutex::new(DescriptorState {
                buffer: VecDeque::new(),
                error: false,
                hung_up: false,
                closed: false,
                waiters: WaiterList::new(),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.fd
    }

    fn events(&self, state: &DescriptorState) -> WaitEvents {
        if state.closed {
            return WaitEvents::INVALID;
        }
        let mut events = WaitEvents::empty();
        if !state.buffer.is_empty() {
            events |= WaitEvents::READ;
        }
        if !state.hung_up && state.buffer.len() < self.capacity {
            events |= WaitEvents::WRITE;
        }
        if state.error {
            events |= WaitEvents::ERROR;
        }
        if state.hung_up {
            events |= WaitEvents::DISCONNECTED;
        }
        events
    }

    fn notify(&self, state: &mut DescriptorState) -> usize {
        let events = self.events(state);
        state.waiters.notify(events)
    }

    /// Append bytes; returns how many fit
    pub fn write(&self, bytes: &[u8]) -> ObjectResult<usize> {
        let mut state = self.state.lock();
        if state.closed || state.hung_up {
            return Err(ObjectError::Closed);
        }
        let room = self.capacity - state.buffer.len();
        if room == 0 {
            return Err(ObjectError::WouldBlock);
        }
        let n = room.min(bytes.len());
        state.buffer.extend(&bytes[..n]);
        let woken = self.notify(&mut state);
        trace!(fd = self.fd, written = n, woken, "descriptor input");
        Ok(n)
    }

    /// Take up to `max` buffered bytes
    ///
    /// Empty after hang-up means end of stream.
    pub fn read(&self, max: usize) -> ObjectResult<Vec<u8>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(ObjectError::Closed);
        }
        if state.buffer.is_empty() {
            return if state.hung_up {
                Ok(Vec::new())
            } else {
                Err(ObjectError::WouldBlock)
            };
        }
        let n = max.min(state.buffer.len());
        let data: Vec<u8> = state.buffer.drain(..n).collect();
        self.notify(&mut state);
        Ok(data)
    }

    /// Latch an error condition
    pub fn set_error(&self) {
        let mut state = self.state.lock();
        state.error = true;
        self.notify(&mut state);
    }

    /// Peer hung up
    pub fn hang_up(&self) {
        let mut state = self.state.lock();
        if state.hung_up {
            return;
        }
        state.hung_up = true;
        let woken = self.notify(&mut state);
        debug!(fd = self.fd, woken, "descriptor hung up");
    }

    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        state.buffer.clear();
        self.notify(&mut state);
    }

    /// Buffered byte count
    pub fn available(&self) -> usize {
        self.state.lock().buffer.len()
    }
}

impl Waitable for Descriptor {
    fn object_type(&self) -> ObjectType {
        ObjectType::Descriptor
    }

    fn id(&self) -> ObjectId {
        self.fd
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
