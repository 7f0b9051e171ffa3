/*!
 * Multiplexed Object Wait
 *
 * Block or poll on an array of heterogeneous kernel objects and wake when
 * any subset becomes ready, a timeout elapses, or the wait is interrupted.
 *
 * # Architecture
 *
 * - `traits`: capability set of waitable objects, resolver, interrupt source
 * - `adapter`: enum dispatch over object kinds
 * - `waker`: per-object wait queues and the session's shared notifier
 * - `timeout`: deadline computation and the blocked phase
 * - `session`: tickets and teardown of one call
 * - `multiplexer`: the caller-visible state machine
 */

pub mod adapter;
pub mod config;
pub mod multiplexer;
pub mod session;
pub mod timeout;
pub mod traits;
pub mod types;
pub mod waker;

// Re-export public API
pub use adapter::WaitTarget;
pub use config::WaitConfig;
pub use multiplexer::{Multiplexer, WaitContext};
pub use session::{InterruptGuard, WaitSession, WaitTicket};
pub use timeout::{BlockOutcome, Deadline, TimeoutController};
pub use traits::{InterruptSource, NoInterrupts, WaitTargetResolver, Waitable};
pub use types::{
    DescriptorStatus, ObjectType, Timeout, WaitDescriptor, WaitEvents, WaitFlags, WaitOutcome,
};
pub use waker::{AbortHandle, Enrollment, SessionNotifier, SessionState, TicketToken, WaiterList, Waker};
