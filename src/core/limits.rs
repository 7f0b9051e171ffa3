/*!
 * System Limits and Constants
 *
 * Centralized location for wait-subsystem limits and defaults.
 * - Performance-critical constants are marked with [PERF]
 * - ABI-visible values are marked with [ABI]
 */

use std::time::Duration;

// =============================================================================
// MULTIPLEXED WAIT LIMITS
// =============================================================================

/// Maximum descriptors accepted by a single multiplexed wait
/// [ABI] Larger requests fail with InvalidArgument
pub const MAX_WAIT_OBJECTS: usize = 512;

/// Timeout value meaning "never expire"
/// [ABI] Honoured regardless of the timeout flags
pub const INFINITE_TIMEOUT: i64 = i64::MAX;

// =============================================================================
// WAKE EVENT TUNING
// =============================================================================

/// Default spin duration before parking on the wake event
/// [PERF] Short enough to be invisible next to a context switch
pub const DEFAULT_WAKE_SPIN: Duration = Duration::from_micros(10);

/// Default maximum spin iterations before parking
pub const DEFAULT_WAKE_MAX_SPINS: u32 = 100;

/// Low-latency spin duration
pub const LOW_LATENCY_WAKE_SPIN: Duration = Duration::from_micros(50);

/// Low-latency maximum spin iterations
pub const LOW_LATENCY_WAKE_MAX_SPINS: u32 = 500;

// =============================================================================
// OBJECT LIMITS
// =============================================================================

/// Default message capacity of a port
pub const DEFAULT_PORT_CAPACITY: usize = 64;

/// Default buffer size of a descriptor endpoint (64KB)
pub const DEFAULT_DESCRIPTOR_BUFFER: usize = 64 * 1024;

/// Maximum pending signals per thread
pub const MAX_PENDING_SIGNALS: usize = 32;
