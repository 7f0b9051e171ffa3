/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::ObjectId;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for multiplexed wait operations
pub type WaitResult<T> = Result<T, WaitError>;

/// Result type for object operations
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Call-level errors of a multiplexed wait
///
/// Per-descriptor failures (an unresolvable object) are not errors at this
/// level; they are reported in the descriptor's own status slot.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum WaitError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(wait::invalid_argument),
        help("Check the descriptor count, object type codes, and flag bits.")
    )]
    InvalidArgument(String),

    #[error("Wait was interrupted")]
    #[diagnostic(
        code(wait::interrupted),
        help("A signal was delivered to the waiting thread. Retry the wait if appropriate.")
    )]
    Interrupted,

    #[error("None of the {0} descriptors refer to a live object")]
    #[diagnostic(
        code(wait::no_valid_targets),
        help("Every descriptor failed to resolve. Inspect per-descriptor status.")
    )]
    NoValidTargets(usize),

    #[error("Resource exhausted: {0}")]
    #[diagnostic(
        code(wait::resource_exhausted),
        help("Ticket allocation failed. Reduce the number of waited objects.")
    )]
    ResourceExhausted(String),
}

impl WaitError {
    /// Create an invalid argument error
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Negative errno-style code used at the raw syscall boundary
    pub const fn errno(&self) -> isize {
        match self {
            Self::InvalidArgument(_) => -22,
            Self::Interrupted => -4,
            Self::NoValidTargets(_) => -9,
            Self::ResourceExhausted(_) => -12,
        }
    }
}

/// Errors of the waitable object subsystems
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ObjectError {
    #[error("Object {0} not found")]
    #[diagnostic(
        code(object::not_found),
        help("The object may have been deleted or never existed.")
    )]
    NotFound(ObjectId),

    #[error("Operation would block")]
    #[diagnostic(code(object::would_block))]
    WouldBlock,

    #[error("Object is closed")]
    #[diagnostic(
        code(object::closed),
        help("The object was deleted, closed, or its owner exited.")
    )]
    Closed,

    #[error("Object is full")]
    #[diagnostic(code(object::full))]
    Full,

    #[error("Invalid argument: {0}")]
    #[diagnostic(code(object::invalid_argument))]
    InvalidArgument(String),
}
