/*!
 * Wait Queue Adapters
 *
 * # Design: Enum Dispatch Over Object Kinds
 *
 * The multiplexer sees every object through `WaitTarget`, one variant per
 * object kind, each backed by that kind's `Waitable` implementation. The
 * wait core never learns the internals of semaphores, ports, threads, or
 * descriptors, and the object subsystems share no base type.
 */

use super::traits::Waitable;
use super::types::{ObjectType, WaitEvents};
use super::waker::{Enrollment, TicketToken, Waker};
use crate::core::types::ObjectId;
use crate::objects::{Descriptor, Port, Semaphore, ThreadObject};
use std::fmt;
use std::sync::Arc;

/// Live reference to a waitable object
///
/// Holding a `WaitTarget` keeps the object alive.
#[derive(Clone)]
pub enum WaitTarget {
    Descriptor(Arc<Descriptor>),
    Semaphore(Arc<Semaphore>),
    Port(Arc<Port>),
    Thread(Arc<ThreadObject>),
}

macro_rules! dispatch {
    ($self:expr, $obj:ident => $body:expr) => {
        match $self {
            WaitTarget::Descriptor($obj) => $body,
            WaitTarget::Semaphore($obj) => $body,
            WaitTarget::Port($obj) => $body,
            WaitTarget::Thread($obj) => $body,
        }
    };
}

impl WaitTarget {
    #[inline]
    pub fn object_type(&self) -> ObjectType {
        dispatch!(self, obj => obj.object_type())
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        dispatch!(self, obj => obj.id())
    }

    /// Non-blocking readiness check, masked to `interest`
    #[inline]
    pub fn is_ready(&self, interest: WaitEvents) -> WaitEvents {
        dispatch!(self, obj => obj.poll_events()) & interest
    }

    /// Atomic re-check and enqueue
    #[inline]
    pub fn enroll(&self, interest: WaitEvents, waker: Waker) -> Enrollment {
        dispatch!(self, obj => obj.enroll(interest, waker))
    }

    /// Idempotent dequeue
    #[inline]
    pub fn disenroll(&self, token: TicketToken) -> bool {
        dispatch!(self, obj => obj.disenroll(token))
    }

    #[inline]
    pub fn waiter_count(&self) -> usize {
        dispatch!(self, obj => obj.waiter_count())
    }
}

impl fmt::Debug for WaitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WaitTarget({} {})", self.object_type(), self.id())
    }
}
