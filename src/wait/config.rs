/*!
 * Wait Configuration
 *
 * Limits and wake-event tuning for multiplexed waits.
 */

use crate::core::limits::MAX_WAIT_OBJECTS;
use crate::core::sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Configuration of the multiplexer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Maximum descriptors per call
    pub max_objects: usize,
    /// Wake event strategy
    pub sync: SyncConfig,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            max_objects: MAX_WAIT_OBJECTS,
            sync: SyncConfig::default(),
        }
    }
}

impl WaitConfig {
    /// Configuration for short, latency-sensitive waits
    pub fn low_latency() -> Self {
        Self {
            sync: SyncConfig::low_latency(),
            ..Self::default()
        }
    }

    /// Configuration for long waits
    pub fn long_wait() -> Self {
        Self {
            sync: SyncConfig::long_wait(),
            ..Self::default()
        }
    }

    /// Build from the environment, falling back to defaults
    ///
    /// Environment variables:
    /// - KERNEL_WAIT_MAX_OBJECTS: descriptor limit per call
    /// - KERNEL_WAIT_SPIN_US: spin phase before parking, in microseconds
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("KERNEL_WAIT_MAX_OBJECTS") {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => config.max_objects = n,
                _ => warn!(value = %raw, "Ignoring invalid KERNEL_WAIT_MAX_OBJECTS"),
            }
        }

        if let Ok(raw) = std::env::var("KERNEL_WAIT_SPIN_US") {
            match raw.parse::<u64>() {
                Ok(us) => config.sync.spin_duration = Duration::from_micros(us),
                Err(_) => warn!(value = %raw, "Ignoring invalid KERNEL_WAIT_SPIN_US"),
            }
        }

        config
    }

    /// Override the descriptor limit
    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = max_objects;
        self
    }
}
