/*!
 * Timeout & Cancellation Controller
 *
 * Turns the caller's flags and timeout value into a deadline, and runs the
 * blocked phase of a session: the wake event doubles as the timer, and the
 * first expiry raises the session's timeout flag exactly once.
 *
 * ## Timeout Classes
 *
 * - **Infinite**: no timeout flag, or the `INFINITE_TIMEOUT` value
 * - **Relative**: now + value (zero or negative polls)
 * - **Absolute**: kernel timestamp in microseconds since boot
 */

use super::types::{Timeout, WaitFlags};
use super::waker::{SessionNotifier, SessionState};
use crate::core::errors::{WaitError, WaitResult};
use crate::core::limits::INFINITE_TIMEOUT;
use crate::core::sync::WakeResult;
use crate::core::time::instant_at;
use std::time::{Duration, Instant};
use tracing::trace;

/// Absolute point at which a wait is abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Never expires
    Never,
    /// Expires at this instant
    At(Instant),
}

impl Deadline {
    #[inline]
    pub fn instant(&self) -> Option<Instant> {
        match self {
            Self::Never => None,
            Self::At(at) => Some(*at),
        }
    }

    /// Check if the deadline has passed at `now`
    #[inline]
    pub fn has_passed(&self, now: Instant) -> bool {
        matches!(self, Self::At(at) if now >= *at)
    }

    /// Remaining time before expiry (`None` for never)
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.instant().map(|at| at.saturating_duration_since(now))
    }
}

/// Why the blocked phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// At least one ticket latched events
    Ready,
    /// The abort channel fired
    Interrupted,
    /// The deadline passed
    TimedOut,
}

/// Deadline computation and blocked-phase driver
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutController;

impl TimeoutController {
    /// Resolve raw flags and timeout value into a `Timeout`
    pub fn timeout_from_raw(flags: WaitFlags, value: i64) -> WaitResult<Timeout> {
        let relative = flags.contains(WaitFlags::RELATIVE_TIMEOUT);
        let absolute = flags.contains(WaitFlags::ABSOLUTE_TIMEOUT);

        if relative && absolute {
            return Err(WaitError::invalid_argument(
                "relative and absolute timeout flags are exclusive",
            ));
        }
        if value == INFINITE_TIMEOUT {
            return Ok(Timeout::Infinite);
        }

        Ok(if relative {
            Timeout::Relative(Duration::from_micros(u64::try_from(value).unwrap_or(0)))
        } else if absolute {
            Timeout::Absolute(value)
        } else {
            Timeout::Infinite
        })
    }

    /// Compute the deadline for raw flags and timeout value
    pub fn arm(flags: WaitFlags, value: i64) -> WaitResult<Deadline> {
        let timeout = Self::timeout_from_raw(flags, value)?;
        Ok(Self::arm_timeout(timeout, Instant::now()))
    }

    /// Compute the deadline of `timeout` for a call starting at `now`
    pub fn arm_timeout(timeout: Timeout, now: Instant) -> Deadline {
        match timeout {
            Timeout::Infinite => Deadline::Never,
            Timeout::Relative(after) => now.checked_add(after).map_or(Deadline::Never, Deadline::At),
            Timeout::Absolute(at) => instant_at(at).map_or(Deadline::Never, Deadline::At),
        }
    }

    /// Block the calling thread until readiness, abort, or expiry
    ///
    /// Moves the session to `Blocked` first; the caller moves it on to
    /// `Draining` afterwards.
    pub(crate) fn block(notifier: &SessionNotifier, deadline: Deadline) -> BlockOutcome {
        notifier.advance(SessionState::Blocked);

        loop {
            if notifier.any_latched() {
                return BlockOutcome::Ready;
            }
            if notifier.is_interrupted() {
                return BlockOutcome::Interrupted;
            }
            if notifier.is_timed_out() {
                return BlockOutcome::TimedOut;
            }

            match notifier.event().wait_until(deadline.instant()) {
                WakeResult::Signaled => trace!("wait session woken"),
                WakeResult::TimedOut => {
                    notifier.expire();
                }
            }
        }
    }
}
