//! Dither engine: map packed RGB pixels onto glyph cells.
//!
//! Each canvas cell samples the source pixel under its center, converts it to
//! luma, and picks a glyph from [`GLYPH_RAMP`]. The dithering mode decides how
//! the quantization threshold moves from cell to cell. The decoded color is
//! kept as the cell's foreground.

use super::{Canvas, Cell, Rgb};
use crate::config::DitherMode;
use crate::video::{PixelMasks, PIXEL_PITCH};

/// Glyphs from darkest to brightest.
pub const GLYPH_RAMP: &[u8] = b" .:-=+*#%@";

/// 4x4 Bayer threshold matrix.
const BAYER_4X4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Inclusive cell rectangle `(x1, y1)` to `(x2, y2)`.
///
/// Corners may lie outside the canvas; only the overlap is drawn, but the
/// source picture is stretched over the full rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlitArea {
    /// Left column.
    pub x1: i32,
    /// Top row.
    pub y1: i32,
    /// Right column (inclusive).
    pub x2: i32,
    /// Bottom row (inclusive).
    pub y2: i32,
}

impl BlitArea {
    /// Create an area from inclusive corners.
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The whole of a `width` x `height` canvas.
    pub const fn full(width: u16, height: u16) -> Self {
        Self::new(0, 0, width as i32 - 1, height as i32 - 1)
    }

    fn normalized(self) -> Self {
        Self::new(
            self.x1.min(self.x2),
            self.y1.min(self.y2),
            self.x1.max(self.x2),
            self.y1.max(self.y2),
        )
    }
}

/// Extracts 8-bit channels from a packed pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDecoder {
    masks: PixelMasks,
}

impl ChannelDecoder {
    /// Decoder for pixels laid out by `masks`.
    pub const fn new(masks: PixelMasks) -> Self {
        Self { masks }
    }

    /// Decode a packed pixel.
    #[inline]
    pub fn decode(&self, pixel: u32) -> Rgb {
        Rgb::new(
            channel(pixel, self.masks.red),
            channel(pixel, self.masks.green),
            channel(pixel, self.masks.blue),
        )
    }
}

#[inline]
fn channel(pixel: u32, mask: u32) -> u8 {
    if mask == 0 {
        return 0;
    }
    let max = u64::from(mask >> mask.trailing_zeros());
    let value = u64::from((pixel & mask) >> mask.trailing_zeros());
    u8::try_from(value * 255 / max).unwrap_or(u8::MAX)
}

/// A borrowed view of packed 32-bit pixel memory.
#[derive(Debug, Clone, Copy)]
pub struct PixelSource<'a> {
    /// Pixel memory, `pitch * height` bytes or more.
    pub pixels: &'a [u8],
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes between row starts.
    pub pitch: usize,
    /// Channel layout.
    pub decoder: ChannelDecoder,
}

impl PixelSource<'_> {
    /// Pixel at (x, y), or `None` if the memory is too short.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        let offset = y as usize * self.pitch + x as usize * PIXEL_PITCH;
        let bytes = self.pixels.get(offset..offset + PIXEL_PITCH)?;
        let packed = u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        Some(self.decoder.decode(packed))
    }
}

/// Simple LCG (Linear Congruential Generator), Numerical Recipes constants.
#[derive(Debug, Clone)]
struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    const fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    const fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state
    }
}

/// Stateful dithering pass.
#[derive(Debug, Clone)]
pub struct Ditherer {
    mode: DitherMode,
    rng: SimpleRng,
}

impl Ditherer {
    /// Create a ditherer for `mode`.
    pub const fn new(mode: DitherMode) -> Self {
        Self {
            mode,
            rng: SimpleRng::new(0x5eed),
        }
    }

    /// Current mode.
    pub const fn mode(&self) -> DitherMode {
        self.mode
    }

    /// Switch mode.
    pub const fn set_mode(&mut self, mode: DitherMode) {
        self.mode = mode;
    }

    /// Stretch `source` over `area` of `canvas`.
    pub fn blit(&mut self, canvas: &mut Canvas, area: BlitArea, source: &PixelSource<'_>) {
        if source.width == 0 || source.height == 0 || canvas.is_empty() {
            return;
        }
        let area = area.normalized();
        let area_w = i64::from(area.x2) - i64::from(area.x1) + 1;
        let area_h = i64::from(area.y2) - i64::from(area.y1) + 1;

        let x_start = area.x1.max(0);
        let y_start = area.y1.max(0);
        let x_end = area.x2.min(i32::from(canvas.width()) - 1);
        let y_end = area.y2.min(i32::from(canvas.height()) - 1);

        for cy in y_start..=y_end {
            let v = i64::from(cy - area.y1);
            let sy = sample_coord(v, area_h, source.height);
            for cx in x_start..=x_end {
                let u = i64::from(cx - area.x1);
                let sx = sample_coord(u, area_w, source.width);
                let Some(color) = source.pixel(sx, sy) else {
                    continue;
                };
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let (x, y) = (cx as u16, cy as u16);
                let glyph = self.glyph_for(color.luma(), x, y);
                canvas.set(x, y, Cell::new(glyph as char).with_fg(color));
            }
        }
    }

    /// Quantize a luma value to a ramp glyph.
    fn glyph_for(&mut self, luma: u8, x: u16, y: u16) -> u8 {
        // Threshold offset in 1/256ths of a ramp level, within [-128, 128).
        let offset: i32 = match self.mode {
            DitherMode::None => 0,
            DitherMode::Ordered => {
                let t = BAYER_4X4[usize::from(y & 3)][usize::from(x & 3)];
                i32::from(t) * 16 + 8 - 128
            }
            #[allow(clippy::cast_possible_wrap)]
            DitherMode::Random => (self.rng.next_u32() >> 24) as i32 - 128,
        };
        #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
        let levels = GLYPH_RAMP.len() as i32 - 1;
        let scaled = i32::from(luma) * levels * 256 / 255 + 128 + offset;
        let level = (scaled / 256).clamp(0, levels);
        #[allow(clippy::cast_sign_loss)]
        GLYPH_RAMP[level as usize]
    }
}

/// Source coordinate under the center of cell `index` of `cells`.
#[inline]
fn sample_coord(index: i64, cells: i64, size: u32) -> u32 {
    let pos = (2 * index + 1) * i64::from(size) / (2 * cells);
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let pos = pos.clamp(0, i64::from(size) - 1) as u32;
    pos
}
