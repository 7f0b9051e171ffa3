/*!
 * Waitable Kernel Objects
 *
 * Object subsystems whose readiness the multiplexer waits on. Each keeps
 * its readiness state and wait queue under a single lock and implements
 * `Waitable`.
 */

mod descriptor;
mod port;
mod registry;
mod semaphore;
mod thread;

pub use descriptor::Descriptor;
pub use port::{Port, PortMessage};
pub use registry::ObjectRegistry;
pub use semaphore::Semaphore;
pub use thread::ThreadObject;
