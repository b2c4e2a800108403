//! Video module: output format negotiation and picture memory.
//!
//! This module contains:
//! - [`VideoGeometry`]: the negotiated `RV32` layout (size, masks, stride)
//! - [`PictureBuffer`]: pixel memory the decoder writes into
//! - [`FrameBufferPool`]: the fixed set of picture slots

mod format;
mod picture;
mod pool;

pub use format::{
    stride_for, AspectRatio, Chroma, PixelMasks, RenderRequest, VideoGeometry, PIXEL_PITCH,
    ROW_ALIGN_PIXELS,
};
pub use picture::{PictureBuffer, PictureId, PictureKind, PictureStatus};
pub use pool::FrameBufferPool;
