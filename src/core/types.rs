/*!
 * Core Types
 * Common types used across the kernel
 */

/// Thread ID type
pub type Tid = u32;

/// Kernel object ID (semaphore, port, thread, or descriptor number)
pub type ObjectId = i32;

/// Timestamp in microseconds since boot
pub type Timestamp = i64;
