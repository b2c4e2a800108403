//! Picture buffers handed to the decoder.

use super::format::{VideoGeometry, PIXEL_PITCH};

/// Lifecycle status of a picture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PictureStatus {
    /// Slot holds no memory and can be selected.
    #[default]
    Free,
    /// Slot was selected and its memory is being acquired.
    Reserved,
    /// Host has written a complete frame into the slot.
    Ready,
    /// Slot is registered for output and is released at teardown.
    Destroyed,
}

/// How the decoder fills a picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureKind {
    /// The decoder writes straight into the picture's memory.
    Direct,
}

/// Identifier of a slot in a [`FrameBufferPool`](super::FrameBufferPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PictureId(pub(crate) usize);

impl PictureId {
    /// Slot index inside the pool.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A block of pixel memory plus the bookkeeping the pipeline needs.
///
/// Rows are `pitch` bytes apart; only the first `visible_pitch` bytes of each
/// row carry pixels.
pub struct PictureBuffer {
    pixels: Vec<u8>,
    pitch: usize,
    visible_pitch: usize,
    lines: usize,
    status: PictureStatus,
    kind: PictureKind,
}

impl PictureBuffer {
    /// An empty, free slot.
    pub(crate) const fn free() -> Self {
        Self {
            pixels: Vec::new(),
            pitch: 0,
            visible_pitch: 0,
            lines: 0,
            status: PictureStatus::Free,
            kind: PictureKind::Direct,
        }
    }

    /// Attach pixel memory laid out for `geometry`.
    pub(crate) fn attach(&mut self, pixels: Vec<u8>, geometry: &VideoGeometry) {
        self.pixels = pixels;
        self.pitch = geometry.stride();
        self.visible_pitch = geometry.visible_pitch();
        self.lines = geometry.height() as usize;
        self.kind = PictureKind::Direct;
    }

    /// Drop the pixel memory and return the slot to `Free`.
    pub(crate) fn detach(&mut self) {
        *self = Self::free();
    }

    pub(crate) fn set_status(&mut self, status: PictureStatus) {
        self.status = status;
    }

    /// Current status.
    #[inline]
    pub const fn status(&self) -> PictureStatus {
        self.status
    }

    /// Fill mode.
    #[inline]
    pub const fn kind(&self) -> PictureKind {
        self.kind
    }

    /// Bytes between the starts of two rows.
    #[inline]
    pub const fn pitch(&self) -> usize {
        self.pitch
    }

    /// Bytes per row that carry visible pixels.
    #[inline]
    pub const fn visible_pitch(&self) -> usize {
        self.visible_pitch
    }

    /// Bytes per pixel.
    #[inline]
    pub const fn pixel_pitch(&self) -> usize {
        PIXEL_PITCH
    }

    /// Number of rows.
    #[inline]
    pub const fn lines(&self) -> usize {
        self.lines
    }

    /// Number of planes. Packed RGB has one.
    #[inline]
    pub const fn planes(&self) -> usize {
        1
    }

    /// Pixel memory.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable pixel memory, for the decoder to write into.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Mark the memory as holding a complete frame.
    pub fn mark_ready(&mut self) {
        self.status = PictureStatus::Ready;
    }

    /// Fill every visible pixel with the same packed value.
    pub fn fill(&mut self, pixel: u32) {
        let bytes = pixel.to_ne_bytes();
        let visible = self.visible_pitch;
        if self.pitch == 0 {
            return;
        }
        for row in self.pixels.chunks_exact_mut(self.pitch) {
            for px in row[..visible].chunks_exact_mut(PIXEL_PITCH) {
                px.copy_from_slice(&bytes);
            }
        }
    }

    /// Write one packed pixel. Out-of-range coordinates are ignored.
    pub fn put_pixel(&mut self, x: usize, y: usize, pixel: u32) {
        if x >= self.visible_pitch / PIXEL_PITCH || y >= self.lines {
            return;
        }
        let offset = y * self.pitch + x * PIXEL_PITCH;
        self.pixels[offset..offset + PIXEL_PITCH].copy_from_slice(&pixel.to_ne_bytes());
    }
}

impl std::fmt::Debug for PictureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PictureBuffer")
            .field("status", &self.status)
            .field("kind", &self.kind)
            .field("pitch", &self.pitch)
            .field("lines", &self.lines)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}
