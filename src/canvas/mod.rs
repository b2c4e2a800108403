//! Canvas module: the text-mode surface a terminal backend draws into.
//!
//! This module contains:
//! - [`Cell`]: one glyph with its colors
//! - [`Canvas`]: a grid of cells
//! - [`Rgb`]: true-color representation
//! - [`dither`]: pixel-to-glyph conversion
//! - [`diff`]: encoder for minimal ANSI sequences

mod cell;
mod grid;
pub mod diff;
pub mod dither;

pub use cell::{Cell, Rgb};
pub use dither::{BlitArea, ChannelDecoder, Ditherer, PixelSource, GLYPH_RAMP};
pub use grid::Canvas;
