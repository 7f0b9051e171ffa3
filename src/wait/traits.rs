/*!
 * Wait Traits
 *
 * Seams between the multiplexer and the subsystems it coordinates:
 * - `Waitable`: the capability set every waitable object provides
 * - `WaitTargetResolver`: (type, id) to live object lookup
 * - `InterruptSource`: pending-signal check and abort registration
 */

use super::adapter::WaitTarget;
use super::types::{ObjectType, WaitEvents};
use super::waker::{AbortHandle, Enrollment, TicketToken, Waker};
use crate::core::errors::ObjectResult;
use crate::core::types::{ObjectId, Tid};

/// Capability set of a waitable kernel object
///
/// Implementations keep readiness state and their `WaiterList` under one
/// lock. `enroll` re-checks readiness and enqueues under that lock, and
/// every readiness-producing operation notifies under it too.
pub trait Waitable: Send + Sync {
    /// Object kind
    fn object_type(&self) -> ObjectType;

    /// Object identifier
    fn id(&self) -> ObjectId;

    /// Current readiness, unmasked (non-blocking)
    fn poll_events(&self) -> WaitEvents;

    /// Atomically re-check readiness and enqueue `waker` if not ready
    fn enroll(&self, interest: WaitEvents, waker: Waker) -> Enrollment;

    /// Remove an entry from the wait queue; safe to call repeatedly
    fn disenroll(&self, token: TicketToken) -> bool;

    /// Number of queued waiters (for diagnostics)
    fn waiter_count(&self) -> usize;
}

/// Resolves caller-supplied object references
///
/// The returned target holds a liveness reference on the object for as
/// long as it is kept.
pub trait WaitTargetResolver: Send + Sync {
    fn resolve(&self, object_type: ObjectType, id: ObjectId) -> ObjectResult<WaitTarget>;
}

/// Signal-delivery side of an interruptible wait
pub trait InterruptSource: Send + Sync {
    /// Check if the thread has an unblocked pending signal
    fn has_pending(&self, tid: Tid) -> bool;

    /// Record the abort handle of the thread's active wait
    fn register_wait(&self, tid: Tid, handle: AbortHandle);

    /// Forget the thread's active wait
    fn unregister_wait(&self, tid: Tid);
}

/// Interrupt source for contexts without signal delivery
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInterrupts;

impl InterruptSource for NoInterrupts {
    fn has_pending(&self, _tid: Tid) -> bool {
        false
    }

    fn register_wait(&self, _tid: Tid, _handle: AbortHandle) {}

    fn unregister_wait(&self, _tid: Tid) {}
}
