/*!
 * Object Wait Kernel Library
 * Multiplexed waiting on heterogeneous kernel objects exposed as a library
 */

pub mod core;
pub mod monitoring;
pub mod objects;
pub mod signals;
pub mod syscalls;
pub mod wait;

// Re-exports
pub use crate::core::errors::{ObjectError, ObjectResult, WaitError, WaitResult};
pub use crate::core::sync::{StrategyType, SyncConfig};
pub use monitoring::{init_tracing, WaitStats, WaitStatsSnapshot};
pub use objects::{Descriptor, ObjectRegistry, Port, PortMessage, Semaphore, ThreadObject};
pub use signals::{Signal, SignalManager};
pub use syscalls::{ObjectWaitSyscalls, RawWaitInfo};
pub use wait::{
    Multiplexer, ObjectType, Timeout, WaitConfig, WaitContext, WaitDescriptor, WaitEvents,
    WaitFlags, WaitOutcome,
};
