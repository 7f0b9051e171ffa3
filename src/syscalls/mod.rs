/*!
 * System Calls
 * Syscall boundary of the multiplexed object wait
 */

pub mod executor;
pub mod types;

pub use executor::ObjectWaitSyscalls;
pub use types::{decode_flags, RawWaitInfo};
