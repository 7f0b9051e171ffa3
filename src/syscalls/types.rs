/*!
 * Syscall ABI Types
 * C-layout wait entries exchanged at the raw syscall boundary
 */

use crate::core::errors::{WaitError, WaitResult};
use crate::core::types::ObjectId;
use crate::wait::{DescriptorStatus, ObjectType, WaitDescriptor, WaitEvents, WaitFlags};
use serde::{Deserialize, Serialize};

/// One wait entry as laid out in caller memory
///
/// `events` carries the requested events in and the fired events out; an
/// entry whose object did not resolve comes back as `INVALID`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawWaitInfo {
    pub object: ObjectId,
    pub object_type: u16,
    pub events: u16,
}

impl RawWaitInfo {
    pub const fn new(object_type: ObjectType, object: ObjectId, events: WaitEvents) -> Self {
        Self {
            object,
            object_type: object_type.code(),
            events: events.bits(),
        }
    }

    /// Decode into a typed descriptor
    ///
    /// An unknown object type affects this entry alone and decodes to
    /// `None`; unknown event bits reject the whole call.
    pub fn to_descriptor(&self) -> WaitResult<Option<WaitDescriptor>> {
        let events = WaitEvents::from_bits(self.events).ok_or_else(|| {
            WaitError::invalid_argument(format!("unknown event bits {:#06x}", self.events))
        })?;
        Ok(ObjectType::from_code(self.object_type)
            .ok()
            .map(|object_type| WaitDescriptor::new(object_type, self.object, events)))
    }

    /// Write a finished descriptor's results back
    pub fn store_result(&mut self, descriptor: &WaitDescriptor) {
        self.events = match descriptor.status {
            DescriptorStatus::InvalidObject => WaitEvents::INVALID.bits(),
            _ => descriptor.result_events.bits(),
        };
    }

    /// Report the entry as referring to no live object
    #[inline]
    pub fn mark_invalid(&mut self) {
        self.events = WaitEvents::INVALID.bits();
    }
}

/// Decode raw flag bits, rejecting unknown ones
pub fn decode_flags(raw: u32) -> WaitResult<WaitFlags> {
    WaitFlags::from_bits(raw)
        .ok_or_else(|| WaitError::invalid_argument(format!("unknown flag bits {raw:#x}")))
}
