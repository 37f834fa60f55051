//! Error types for the image core.

use thiserror::Error;

use crate::image::ImageId;

/// Result type for fallible image operations.
pub type Result<T> = std::result::Result<T, GraphicsError>;

/// Errors produced by [`Graphics`](crate::graphics::Graphics) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// Host-side storage could not be reserved. Nothing was modified.
    #[error("allocation failed: {what}")]
    AllocationFailure { what: &'static str },

    /// The image handle does not refer to a live image.
    #[error("unknown image {0:?}")]
    UnknownImage(ImageId),
}

impl GraphicsError {
    #[inline]
    pub(crate) const fn alloc(what: &'static str) -> Self {
        Self::AllocationFailure { what }
    }

    /// Returns `true` for out-of-memory conditions.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::AllocationFailure { .. })
    }
}
