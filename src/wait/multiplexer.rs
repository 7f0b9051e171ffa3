/*!
 * Multiplexer
 *
 * Caller-visible multiplexed wait. A call walks
 * `Resolving → Enrolling → Blocked → Draining → Done`:
 *
 * - **Resolving**: look up every descriptor; failures mark only that slot
 * - **Enrolling**: poll each object, enqueue a ticket when not ready
 * - **Blocked**: park on the session's wake event unless something was
 *   already ready or the call is a poll
 * - **Draining**: disenroll every ticket, release object references,
 *   assemble per-descriptor results
 *
 * All concurrently ready descriptors are reported together unless the
 * caller asked for single-shot semantics.
 */

use super::adapter::WaitTarget;
use super::config::WaitConfig;
use super::session::{InterruptGuard, WaitSession};
use super::timeout::{BlockOutcome, TimeoutController};
use super::traits::{InterruptSource, WaitTargetResolver};
use super::types::{DescriptorStatus, Timeout, WaitDescriptor, WaitFlags, WaitOutcome};
use super::waker::{Enrollment, SessionState};
use crate::core::errors::{WaitError, WaitResult};
use crate::core::types::Tid;
use crate::monitoring::WaitStats;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, debug_span, trace};

/// Collaborators of one call
#[derive(Clone, Copy)]
pub struct WaitContext<'a> {
    /// Object table lookup
    pub resolver: &'a dyn WaitTargetResolver,
    /// Signal delivery for interruptible waits
    pub interrupts: &'a dyn InterruptSource,
    /// Calling thread
    pub tid: Tid,
}

impl<'a> WaitContext<'a> {
    pub fn new(resolver: &'a dyn WaitTargetResolver, interrupts: &'a dyn InterruptSource, tid: Tid) -> Self {
        Self {
            resolver,
            interrupts,
            tid,
        }
    }
}

/// Multiplexed object wait
#[derive(Debug, Clone)]
pub struct Multiplexer {
    config: WaitConfig,
    stats: Arc<WaitStats>,
}

impl Multiplexer {
    pub fn new(config: WaitConfig) -> Self {
        Self {
            config,
            stats: Arc::new(WaitStats::new()),
        }
    }

    #[inline]
    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> &Arc<WaitStats> {
        &self.stats
    }

    /// Wait until any descriptor is ready, the timeout passes, or an abort
    ///
    /// `result_events` and `status` of every descriptor are written in place.
    /// Returns the number of ready descriptors, or `TimedOut`.
    ///
    /// The timeout kind travels in `timeout` only; `flags` carrying
    /// `RELATIVE_TIMEOUT` or `ABSOLUTE_TIMEOUT` is rejected.
    pub fn wait_for_objects(
        &self,
        ctx: &WaitContext<'_>,
        descriptors: &mut [WaitDescriptor],
        flags: WaitFlags,
        timeout: Timeout,
    ) -> WaitResult<WaitOutcome> {
        if flags.intersects(WaitFlags::TIMEOUT_KINDS) {
            return Err(WaitError::invalid_argument(
                "timeout kind belongs in the timeout argument, not the flags",
            ));
        }
        self.check_count(descriptors.len())?;
        self.stats.record_call();

        let now = Instant::now();
        let deadline = TimeoutController::arm_timeout(timeout, now);
        let polling = deadline.has_passed(now);
        let single_shot = flags.contains(WaitFlags::SINGLE_SHOT);

        let mut session = WaitSession::new(descriptors.len(), deadline, &self.config.sync)?;
        let span = debug_span!(
            "wait_for_objects",
            session = %session.id(),
            tid = ctx.tid,
            count = descriptors.len()
        );
        let _enter = span.enter();

        // Resolving
        let targets = self.resolve(ctx, descriptors)?;
        let valid = targets.iter().filter(|t| t.is_some()).count();
        if valid == 0 {
            self.stats.record_no_valid_targets();
            debug!("no descriptor resolved");
            return Err(WaitError::NoValidTargets(descriptors.len()));
        }

        let _interrupt_guard = flags.contains(WaitFlags::INTERRUPTIBLE).then(|| {
            let guard = InterruptGuard::register(ctx.interrupts, ctx.tid, session.abort_handle());
            // Registered first, so a signal racing this check still aborts
            if ctx.interrupts.has_pending(ctx.tid) {
                session.abort_handle().abort();
            }
            guard
        });

        // Enrolling
        session.advance(SessionState::Enrolling);
        let mut immediate = false;
        for (index, target) in targets.into_iter().enumerate() {
            let Some(target) = target else { continue };
            if immediate && single_shot {
                break;
            }

            let interest = descriptors[index].reportable();
            let ready = target.is_ready(interest);
            if !ready.is_empty() {
                descriptors[index].result_events = ready;
                immediate = true;
                continue;
            }
            if immediate || polling {
                continue;
            }

            if let Enrollment::Ready(events) = session.enroll(index, target, interest)? {
                descriptors[index].result_events = events;
                immediate = true;
            }
        }

        // Blocked
        let outcome = if immediate {
            self.stats.record_immediate();
            BlockOutcome::Ready
        } else if polling {
            BlockOutcome::TimedOut
        } else {
            self.stats.record_blocked();
            trace!(
                tickets = session.tickets().len(),
                strategy = session.notifier().event().strategy_name(),
                remaining = ?deadline.remaining(Instant::now()),
                "blocking"
            );
            TimeoutController::block(session.notifier(), deadline)
        };

        // Draining
        session.advance(SessionState::Draining);
        for (index, events) in session.drain() {
            descriptors[index].result_events |= events;
        }

        if single_shot {
            if let Some(first) = descriptors.iter().position(WaitDescriptor::is_ready) {
                for d in descriptors.iter_mut().skip(first + 1) {
                    d.result_events = Default::default();
                }
            }
        }

        let ready = descriptors.iter().filter(|d| d.is_ready()).count();
        debug!(ready, outcome = ?outcome, "wait finished");

        if ready > 0 {
            self.stats.record_ready();
            Ok(WaitOutcome::Ready(ready))
        } else if session.notifier().is_interrupted() {
            self.stats.record_interrupted();
            Err(WaitError::Interrupted)
        } else {
            self.stats.record_timeout();
            Ok(WaitOutcome::TimedOut)
        }
    }

    /// Reject empty and oversized descriptor arrays
    pub(crate) fn check_count(&self, count: usize) -> WaitResult<()> {
        if count == 0 {
            return Err(WaitError::invalid_argument("no descriptors"));
        }
        if count > self.config.max_objects {
            return Err(WaitError::invalid_argument(format!(
                "{count} descriptors exceeds limit {}",
                self.config.max_objects
            )));
        }
        Ok(())
    }

    fn resolve(
        &self,
        ctx: &WaitContext<'_>,
        descriptors: &mut [WaitDescriptor],
    ) -> WaitResult<Vec<Option<WaitTarget>>> {
        let mut targets = Vec::new();
        targets.try_reserve_exact(descriptors.len()).map_err(|e| {
            WaitError::ResourceExhausted(format!("{} targets: {e}", descriptors.len()))
        })?;

        for descriptor in descriptors.iter_mut() {
            descriptor.reset_output();
            match ctx.resolver.resolve(descriptor.object_type, descriptor.object_id) {
                Ok(target) => {
                    descriptor.status = DescriptorStatus::Ok;
                    targets.push(Some(target));
                }
                Err(e) => {
                    debug!(
                        object_type = %descriptor.object_type,
                        object_id = descriptor.object_id,
                        error = %e,
                        "descriptor did not resolve"
                    );
                    descriptor.status = DescriptorStatus::InvalidObject;
                    self.stats.record_invalid_descriptor();
                    targets.push(None);
                }
            }
        }
        Ok(targets)
    }
}

impl Default for Multiplexer {
    fn default() -> Self {
        Self::new(WaitConfig::default())
    }
}
