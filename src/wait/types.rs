/*!
 * Wait Types
 * Descriptors, event masks, flags, and outcomes of a multiplexed wait
 */

use crate::core::errors::{WaitError, WaitResult};
use crate::core::types::{ObjectId, Timestamp};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Kind of kernel object a descriptor refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum ObjectType {
    /// I/O descriptor endpoint
    Descriptor = 0,
    /// Counting semaphore
    Semaphore = 1,
    /// Message port
    Port = 2,
    /// Thread
    Thread = 3,
}

impl ObjectType {
    /// Convert from the ABI type code
    pub fn from_code(code: u16) -> WaitResult<Self> {
        match code {
            0 => Ok(Self::Descriptor),
            1 => Ok(Self::Semaphore),
            2 => Ok(Self::Port),
            3 => Ok(Self::Thread),
            other => Err(WaitError::invalid_argument(format!(
                "unknown object type {other}"
            ))),
        }
    }

    /// ABI type code
    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Events reported for this type even when not requested
    pub const fn implicit_events(self) -> WaitEvents {
        match self {
            Self::Descriptor => WaitEvents::INVALID
                .union(WaitEvents::ERROR)
                .union(WaitEvents::DISCONNECTED),
            Self::Semaphore | Self::Port | Self::Thread => WaitEvents::INVALID,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Descriptor => "descriptor",
            Self::Semaphore => "semaphore",
            Self::Port => "port",
            Self::Thread => "thread",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Readiness events
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct WaitEvents: u16 {
        /// Data readable / message queued / semaphore acquirable
        const READ = 0x0001;
        /// Room to write
        const WRITE = 0x0002;
        /// Error condition
        const ERROR = 0x0004;
        const PRIORITY_READ = 0x0008;
        const PRIORITY_WRITE = 0x0010;
        const HIGH_PRIORITY_READ = 0x0020;
        const HIGH_PRIORITY_WRITE = 0x0040;
        /// Peer hung up
        const DISCONNECTED = 0x0080;
        /// Object deleted or thread exited
        const INVALID = 0x1000;
    }
}

impl WaitEvents {
    /// Semaphore can be acquired
    pub const ACQUIRE_SEMAPHORE: Self = Self::READ;
}

bitflags! {
    /// Flags of a multiplexed wait call
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct WaitFlags: u32 {
        /// A pending or arriving signal aborts the wait
        const INTERRUPTIBLE = 0x0001;
        /// Timeout is relative to the call
        const RELATIVE_TIMEOUT = 0x0008;
        /// Timeout is an absolute kernel timestamp
        const ABSOLUTE_TIMEOUT = 0x0010;
        /// Report only the first descriptor found ready
        const SINGLE_SHOT = 0x0100;
    }
}

impl WaitFlags {
    /// Bits selecting how the raw timeout value is read
    pub const TIMEOUT_KINDS: Self = Self::RELATIVE_TIMEOUT.union(Self::ABSOLUTE_TIMEOUT);
}

/// Timeout of a wait, resolved from flags and the raw timeout value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Never expires
    Infinite,
    /// Expires this long after the call starts (zero polls)
    Relative(Duration),
    /// Expires at this kernel timestamp (microseconds since boot)
    Absolute(Timestamp),
}

impl Timeout {
    /// Non-blocking poll
    pub const POLL: Self = Self::Relative(Duration::ZERO);
}

/// Per-descriptor status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorStatus {
    /// Not yet processed
    #[default]
    Pending,
    /// Object resolved and waited on
    Ok,
    /// Object type/id did not resolve to a live object
    InvalidObject,
}

/// One entry of a multiplexed wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitDescriptor {
    pub object_type: ObjectType,
    pub object_id: ObjectId,
    /// Events the caller is interested in
    pub requested_events: WaitEvents,
    /// Events that fired (output)
    pub result_events: WaitEvents,
    /// Resolution status (output)
    pub status: DescriptorStatus,
}

impl WaitDescriptor {
    pub fn new(object_type: ObjectType, object_id: ObjectId, requested_events: WaitEvents) -> Self {
        Self {
            object_type,
            object_id,
            requested_events,
            result_events: WaitEvents::empty(),
            status: DescriptorStatus::Pending,
        }
    }

    pub fn semaphore(id: ObjectId) -> Self {
        Self::new(ObjectType::Semaphore, id, WaitEvents::ACQUIRE_SEMAPHORE)
    }

    pub fn port(id: ObjectId, events: WaitEvents) -> Self {
        Self::new(ObjectType::Port, id, events)
    }

    pub fn thread(id: ObjectId) -> Self {
        Self::new(ObjectType::Thread, id, WaitEvents::INVALID)
    }

    pub fn descriptor(id: ObjectId, events: WaitEvents) -> Self {
        Self::new(ObjectType::Descriptor, id, events)
    }

    /// Events that may be reported for this descriptor
    #[inline]
    pub fn reportable(&self) -> WaitEvents {
        self.requested_events | self.object_type.implicit_events()
    }

    /// Check if any event fired
    #[inline]
    pub fn is_ready(&self) -> bool {
        !self.result_events.is_empty()
    }

    pub(crate) fn reset_output(&mut self) {
        self.result_events = WaitEvents::empty();
        self.status = DescriptorStatus::Pending;
    }
}

/// Successful outcome of a multiplexed wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "count")]
pub enum WaitOutcome {
    /// This many descriptors have events set
    Ready(usize),
    /// The deadline passed with nothing ready
    TimedOut,
}

impl WaitOutcome {
    /// Number of ready descriptors (zero on timeout)
    #[inline]
    pub fn ready_count(&self) -> usize {
        match self {
            Self::Ready(n) => *n,
            Self::TimedOut => 0,
        }
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}
