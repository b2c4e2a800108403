//! Error types for the adapter and the rendering backend boundary.
//!
//! Every error here is fatal for the lifecycle step that produced it: Create
//! and Init surface it to the host, which abandons this output path. Nothing
//! is retried internally.

use std::io;

/// Failures reported by a [`Backend`](crate::backend::Backend).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Terminal I/O failed while acquiring or configuring the output device.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The bitmap descriptor cannot be built for the requested geometry or masks.
    #[error("invalid bitmap descriptor: {reason}")]
    InvalidBitmap {
        /// What was wrong with the descriptor.
        reason: &'static str,
    },

    /// An operation needed the backend to be initialized first.
    #[error("backend is not initialized")]
    NotInitialized,
}

/// Failures surfaced to the host by the adapter lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum VoutError {
    /// Pixel memory could not be acquired.
    #[error("out of memory allocating {bytes} bytes of picture memory")]
    OutOfMemory {
        /// Size of the failed request (`usize::MAX` when the size itself overflowed).
        bytes: usize,
    },

    /// The rendering backend failed to start or to build the canvas.
    #[error("rendering backend unavailable: {0}")]
    BackendUnavailable(#[from] BackendError),

    /// Every picture slot is already taken.
    #[error("no free picture slot (capacity {capacity})")]
    NoSlotAvailable {
        /// Number of slots in the pool.
        capacity: usize,
    },
}

/// Shorthand for results carrying a [`VoutError`].
pub type Result<T, E = VoutError> = std::result::Result<T, E>;
