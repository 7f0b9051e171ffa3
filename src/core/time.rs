/*!
 * Kernel Clock
 *
 * Monotonic time base shared by every subsystem. Absolute timeouts are
 * expressed in microseconds on this clock.
 */

use super::types::Timestamp;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static BOOT: OnceLock<Instant> = OnceLock::new();

#[inline]
fn boot_instant() -> Instant {
    *BOOT.get_or_init(Instant::now)
}

/// Microseconds elapsed since the kernel clock was first read
#[inline]
pub fn system_time() -> Timestamp {
    Timestamp::try_from(boot_instant().elapsed().as_micros()).unwrap_or(Timestamp::MAX)
}

/// Convert a kernel timestamp into an `Instant`
///
/// Negative timestamps clamp to boot. Returns `None` when the value cannot be
/// represented (it lies so far in the future that it is effectively never).
pub fn instant_at(timestamp: Timestamp) -> Option<Instant> {
    let micros = u64::try_from(timestamp).unwrap_or(0);
    boot_instant().checked_add(Duration::from_micros(micros))
}
