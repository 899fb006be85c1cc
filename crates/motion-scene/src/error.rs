//! Error types for animation scheduling.

use thiserror::Error;

use crate::animator::AnimationHandle;

/// Result type for animator operations.
pub type Result<T> = std::result::Result<T, AnimationError>;

/// Errors raised by an [`Animator`](crate::Animator).
///
/// The scheduler never creates these itself: it passes them through from the
/// animator to the caller, or logs and drops them inside callbacks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Descriptor cannot be played (bad duration, empty keyframes, NaN values).
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(String),

    /// No running animation carries this handle.
    #[error("unknown animation handle {0}")]
    UnknownHandle(AnimationHandle),
}
