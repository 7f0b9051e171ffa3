/*!
 * Synchronization Configuration
 *
 * Runtime configuration for wake-event strategy selection
 */

use crate::core::limits::{
    DEFAULT_WAKE_MAX_SPINS, DEFAULT_WAKE_SPIN, LOW_LATENCY_WAKE_MAX_SPINS, LOW_LATENCY_WAKE_SPIN,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Strategy type selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    /// Park on the condvar immediately
    Park,
    /// Spin briefly before parking (low-latency, higher CPU for short waits)
    SpinThenPark,
    /// Auto-select based on platform parallelism
    Auto,
}

/// Synchronization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Preferred strategy
    pub strategy: StrategyType,
    /// Spin duration before parking (for SpinThenPark)
    #[serde(with = "duration_micros")]
    pub spin_duration: Duration,
    /// Maximum spin iterations before giving up
    pub max_spins: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyType::Auto,
            spin_duration: DEFAULT_WAKE_SPIN,
            max_spins: DEFAULT_WAKE_MAX_SPINS,
        }
    }
}

impl SyncConfig {
    /// Configuration optimized for low-latency (< 1ms wait expected)
    pub const fn low_latency() -> Self {
        Self {
            strategy: StrategyType::SpinThenPark,
            spin_duration: LOW_LATENCY_WAKE_SPIN,
            max_spins: LOW_LATENCY_WAKE_MAX_SPINS,
        }
    }

    /// Configuration optimized for long waits (> 1ms expected)
    pub const fn long_wait() -> Self {
        Self {
            strategy: StrategyType::Park,
            spin_duration: Duration::ZERO,
            max_spins: 0,
        }
    }

    /// Select best strategy for the current machine
    ///
    /// Spinning only pays off when another core can run the producer.
    pub fn select_strategy(&self) -> StrategyType {
        match self.strategy {
            StrategyType::Auto => {
                let cores = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                if cores > 1 {
                    StrategyType::SpinThenPark
                } else {
                    StrategyType::Park
                }
            }
            other => other,
        }
    }
}

mod duration_micros {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_micros()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_micros)
    }
}
