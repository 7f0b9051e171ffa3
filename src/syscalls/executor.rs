/*!
 * Object Wait Syscalls
 *
 * Syscall-level entry points for the multiplexed wait: a typed form and
 * the raw form returning a count or a negative error code.
 */

use super::types::{decode_flags, RawWaitInfo};
use crate::core::errors::{WaitError, WaitResult};
use crate::core::types::Tid;
use crate::monitoring::{SyscallSpan, WaitStats};
use crate::objects::ObjectRegistry;
use crate::signals::SignalManager;
use crate::wait::{
    Multiplexer, TimeoutController, WaitConfig, WaitContext, WaitDescriptor, WaitFlags,
    WaitOutcome,
};
use std::sync::Arc;
use tracing::debug;

/// Wait syscall executor
#[derive(Clone)]
pub struct ObjectWaitSyscalls {
    registry: Arc<ObjectRegistry>,
    signals: SignalManager,
    multiplexer: Multiplexer,
}

impl ObjectWaitSyscalls {
    pub fn new(registry: Arc<ObjectRegistry>, signals: SignalManager, config: WaitConfig) -> Self {
        Self {
            registry,
            signals,
            multiplexer: Multiplexer::new(config),
        }
    }

    /// Build with a fresh registry and signal manager
    pub fn with_config(config: WaitConfig) -> Self {
        Self::new(Arc::new(ObjectRegistry::new()), SignalManager::new(), config)
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ObjectRegistry> {
        &self.registry
    }

    #[inline]
    pub fn signals(&self) -> &SignalManager {
        &self.signals
    }

    #[inline]
    pub fn stats(&self) -> &Arc<WaitStats> {
        self.multiplexer.stats()
    }

    /// Typed wait
    ///
    /// `timeout_us` is interpreted per the timeout flags; `INFINITE_TIMEOUT`
    /// never expires.
    pub fn wait_for_objects(
        &self,
        tid: Tid,
        descriptors: &mut [WaitDescriptor],
        flags: WaitFlags,
        timeout_us: i64,
    ) -> WaitResult<WaitOutcome> {
        let timeout = TimeoutController::timeout_from_raw(flags, timeout_us)?;
        let ctx = WaitContext::new(self.registry.as_ref(), &self.signals, tid);
        self.multiplexer.wait_for_objects(
            &ctx,
            descriptors,
            flags.difference(WaitFlags::TIMEOUT_KINDS),
            timeout,
        )
    }

    /// Raw wait over caller-layout entries
    ///
    /// Returns the ready count (0 on timeout) or a negative error code.
    pub fn sys_wait_for_objects(
        &self,
        tid: Tid,
        infos: &mut [RawWaitInfo],
        flags: u32,
        timeout_us: i64,
    ) -> isize {
        let span = SyscallSpan::new("wait_for_objects", tid);
        let _entered = span.enter();

        let result = self.raw_wait(tid, infos, flags, timeout_us);
        let ret = match result {
            Ok(outcome) => isize::try_from(outcome.ready_count()).unwrap_or(isize::MAX),
            Err(e) => {
                debug!(error = %e, "wait_for_objects failed");
                e.errno()
            }
        };
        span.record_return(ret);
        ret
    }

    fn raw_wait(
        &self,
        tid: Tid,
        infos: &mut [RawWaitInfo],
        flags: u32,
        timeout_us: i64,
    ) -> WaitResult<WaitOutcome> {
        let flags = decode_flags(flags)?;
        TimeoutController::timeout_from_raw(flags, timeout_us)?;
        self.multiplexer.check_count(infos.len())?;

        // `None` marks an entry whose object type is unknown
        let decoded = infos
            .iter()
            .map(RawWaitInfo::to_descriptor)
            .collect::<WaitResult<Vec<_>>>()?;
        let mut descriptors: Vec<WaitDescriptor> = decoded.iter().flatten().copied().collect();

        let unknown = infos.len() - descriptors.len();
        for _ in 0..unknown {
            self.stats().record_invalid_descriptor();
        }

        let result = if descriptors.is_empty() {
            self.stats().record_call();
            self.stats().record_no_valid_targets();
            debug!(count = infos.len(), "no entry has a known object type");
            Err(WaitError::NoValidTargets(infos.len()))
        } else {
            if unknown > 0 {
                debug!(unknown, "entries with unknown object type marked invalid");
            }
            self.wait_for_objects(tid, &mut descriptors, flags, timeout_us)
                .map_err(|e| match e {
                    WaitError::NoValidTargets(_) => WaitError::NoValidTargets(infos.len()),
                    other => other,
                })
        };

        // Per-entry results are meaningful even when the call fails
        let mut waited = descriptors.iter();
        for (info, entry) in infos.iter_mut().zip(&decoded) {
            match entry.as_ref().and_then(|_| waited.next()) {
                Some(descriptor) => info.store_result(descriptor),
                None => info.mark_invalid(),
            }
        }
        result
    }
}
