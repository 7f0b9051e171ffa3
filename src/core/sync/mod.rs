/*!
 * Synchronization Primitives
 *
 * The private wake event a blocked waiter parks on, with a configurable
 * spin phase before parking:
 * - Park: straight to the condvar
 * - SpinThenPark: short adaptive spin, then the condvar
 *
 * Producers never block on the event: signalling is a flag store plus a
 * notify under a briefly-held lock.
 */

mod config;
mod event;

pub use config::{StrategyType, SyncConfig};
pub use event::{WakeEvent, WakeResult};
