/*!
 * Signals Module
 * Signal queuing per thread and interruption of blocked waits
 */

mod manager;
mod types;

pub use manager::SignalManager;
pub use types::{PendingSignal, Signal, SignalError, SignalResult, SignalStats};
