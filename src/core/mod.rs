/*!
 * Core Module
 * Fundamental kernel types, limits, clock, and error handling
 */

pub mod errors;
pub mod limits;
pub mod sync;
pub mod time;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use time::system_time;
pub use types::*;
