//! Backend module: the boundary to the text-rendering backend.
//!
//! A backend is a process-wide resource: it is initialized once, holds a
//! global dithering setting and a single canvas, and owns terminal I/O. The
//! adapter talks to it only through [`Backend`].
//!
//! This module contains:
//! - [`Backend`]: the trait the adapter drives
//! - [`BitmapDescriptor`]: how pixel memory should be read by a blit
//! - [`RawEvent`]: input events as the backend reports them
//! - [`TerminalBackend`]: a crossterm implementation

mod events;
mod terminal;

pub use events::{CrosstermEvents, EventSource, ScriptedEvents};
pub use terminal::{TerminalBackend, TerminalOptions};

pub use crate::canvas::BlitArea;

use crate::config::DitherMode;
use crate::error::BackendError;
use crate::video::{PixelMasks, VideoGeometry, PIXEL_PITCH};
use bitflags::bitflags;

/// Operations the adapter needs from a text-rendering backend.
pub trait Backend {
    /// Acquire the output device. Called once, before anything else.
    fn init(&mut self) -> Result<(), BackendError>;

    /// Release the output device. Called once, last.
    fn end(&mut self);

    /// Set the library-wide dithering mode.
    fn set_dithering(&mut self, mode: DitherMode);

    /// Build a bitmap descriptor blits can read pixel memory through.
    fn create_bitmap(&mut self, descriptor: BitmapDescriptor) -> Result<BitmapId, BackendError>;

    /// Release a descriptor returned by [`Backend::create_bitmap`].
    fn free_bitmap(&mut self, bitmap: BitmapId);

    /// Canvas width in cells.
    fn width(&self) -> u16;

    /// Canvas height in cells.
    fn height(&self) -> u16;

    /// Blank the canvas.
    fn clear(&mut self);

    /// Dither `pixels`, laid out as `bitmap` describes, into `area` of the canvas.
    fn blit(&mut self, area: BlitArea, bitmap: BitmapId, pixels: &[u8]);

    /// Present the canvas on the output device.
    fn refresh(&mut self);

    /// Next buffered input event, without blocking.
    fn poll_event(&mut self) -> Option<RawEvent>;
}

/// Handle to a bitmap descriptor owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitmapId(pub usize);

/// Layout of the pixel memory a blit reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitmapDescriptor {
    /// Bits per pixel. Only 32 is supported.
    pub bits_per_pixel: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes between row starts.
    pub pitch: usize,
    /// Channel masks.
    pub masks: PixelMasks,
}

impl BitmapDescriptor {
    /// Descriptor matching a negotiated geometry.
    pub const fn for_geometry(geometry: &VideoGeometry) -> Self {
        Self {
            bits_per_pixel: geometry.chroma().bits_per_pixel(),
            width: geometry.width(),
            height: geometry.height(),
            pitch: geometry.stride(),
            masks: geometry.masks(),
        }
    }

    /// Check the descriptor can be read by a 32-bit blit.
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.bits_per_pixel != 32 {
            return Err(BackendError::InvalidBitmap {
                reason: "unsupported bits per pixel",
            });
        }
        if self.width == 0 || self.height == 0 {
            return Err(BackendError::InvalidBitmap {
                reason: "zero-sized bitmap",
            });
        }
        if self.pitch < PIXEL_PITCH * self.width as usize {
            return Err(BackendError::InvalidBitmap {
                reason: "pitch shorter than a row",
            });
        }
        if !self.masks.is_valid() {
            return Err(BackendError::InvalidBitmap {
                reason: "empty or overlapping color masks",
            });
        }
        Ok(())
    }
}

bitflags! {
    /// Kind of a raw backend event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RawEventFlags: u32 {
        /// A key went down.
        const KEY_PRESS = 0b0000_0001;
        /// A key went up.
        const KEY_RELEASE = 0b0000_0010;
        /// A mouse button went down.
        const MOUSE_PRESS = 0b0000_0100;
        /// A mouse button went up.
        const MOUSE_RELEASE = 0b0000_1000;
        /// The pointer moved.
        const MOUSE_MOTION = 0b0001_0000;
        /// The output device changed size.
        const RESIZE = 0b0010_0000;
    }
}

/// An input event as reported by a backend.
///
/// For key events the low 16 bits of `data` hold the key code. For resizes
/// `data` packs the new width (high half) and height (low half).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawEvent {
    /// Event kind.
    pub flags: RawEventFlags,
    /// Kind-specific payload.
    pub data: u32,
}

impl RawEvent {
    /// A key press of `code`.
    pub const fn key_press(code: u16) -> Self {
        Self {
            flags: RawEventFlags::KEY_PRESS,
            data: code as u32,
        }
    }

    /// A key release of `code`.
    pub const fn key_release(code: u16) -> Self {
        Self {
            flags: RawEventFlags::KEY_RELEASE,
            data: code as u32,
        }
    }

    /// A resize to `width` x `height` cells.
    pub const fn resize(width: u16, height: u16) -> Self {
        Self {
            flags: RawEventFlags::RESIZE,
            data: ((width as u32) << 16) | height as u32,
        }
    }

    /// Whether this is a key press.
    #[inline]
    pub const fn is_key_press(&self) -> bool {
        self.flags.contains(RawEventFlags::KEY_PRESS)
    }

    /// Key code carried by a key event.
    #[inline]
    pub const fn key_code(&self) -> u16 {
        (self.data & 0xffff) as u16
    }

    /// New size carried by a resize event.
    #[inline]
    pub const fn size(&self) -> (u16, u16) {
        ((self.data >> 16) as u16, (self.data & 0xffff) as u16)
    }
}
