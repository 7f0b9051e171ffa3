/*!
 * Monitoring
 * Wait statistics and structured tracing
 */

mod stats;
mod tracer;

pub use stats::{WaitStats, WaitStatsSnapshot};
pub use tracer::{generate_trace_id, init_tracing, SyscallSpan};
