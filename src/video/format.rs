//! Output format negotiation: chroma, pixel masks, and geometry.

/// Bytes per pixel of the only supported chroma.
pub const PIXEL_PITCH: usize = 4;

/// Rows are padded to a multiple of this many pixels.
pub const ROW_ALIGN_PIXELS: usize = 16;

/// Pixel layouts the adapter can negotiate.
///
/// Only packed 32-bit RGB is supported; there is no fallback format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chroma {
    /// 32-bit packed RGB, one pixel per native-endian `u32`.
    Rv32,
}

impl Chroma {
    /// FourCC tag of the chroma.
    pub const fn fourcc(self) -> [u8; 4] {
        match self {
            Self::Rv32 => *b"RV32",
        }
    }

    /// Bits per pixel.
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Rv32 => 32,
        }
    }
}

/// Bit masks locating each color channel inside a packed pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelMasks {
    /// Red channel mask.
    pub red: u32,
    /// Green channel mask.
    pub green: u32,
    /// Blue channel mask.
    pub blue: u32,
}

impl PixelMasks {
    /// Masks of the negotiated `RV32` layout.
    pub const RV32: Self = Self {
        red: 0x00ff_0000,
        green: 0x0000_ff00,
        blue: 0x0000_00ff,
    };

    /// Whether every mask is non-zero and no two masks share a bit.
    pub const fn is_valid(&self) -> bool {
        self.red != 0
            && self.green != 0
            && self.blue != 0
            && self.red & self.green == 0
            && self.red & self.blue == 0
            && self.green & self.blue == 0
    }

    /// Pack an 8-bit-per-channel color into a pixel laid out by these masks.
    pub const fn pack(&self, r: u8, g: u8, b: u8) -> u32 {
        place(r, self.red) | place(g, self.green) | place(b, self.blue)
    }
}

/// Spread an 8-bit channel value over `mask`, keeping its top bits.
const fn place(value: u8, mask: u32) -> u32 {
    let shift = mask.trailing_zeros();
    let bits = mask.count_ones();
    let scaled = if bits >= 8 {
        (value as u32) << (bits - 8)
    } else {
        (value as u32) >> (8 - bits)
    };
    (scaled << shift) & mask
}

/// Display aspect ratio as a `num:den` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AspectRatio {
    /// Numerator.
    pub num: u32,
    /// Denominator.
    pub den: u32,
}

impl AspectRatio {
    /// Create an aspect ratio.
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// Aspect ratio of a picture with square pixels, reduced.
    pub const fn square_pixels(width: u32, height: u32) -> Self {
        let divisor = gcd(width, height);
        if divisor == 0 {
            return Self::new(1, 1);
        }
        Self::new(width / divisor, height / divisor)
    }
}

const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Render geometry requested by the host at Init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderRequest {
    /// Picture width in pixels.
    pub width: u32,
    /// Picture height in pixels.
    pub height: u32,
    /// Display aspect ratio.
    pub aspect: AspectRatio,
}

impl RenderRequest {
    /// Request a geometry with square pixels.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            aspect: AspectRatio::square_pixels(width, height),
        }
    }

    /// Override the aspect ratio.
    #[must_use]
    pub const fn with_aspect(mut self, aspect: AspectRatio) -> Self {
        self.aspect = aspect;
        self
    }
}

/// Negotiated output geometry. Fixed from Init until the next Init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoGeometry {
    width: u32,
    height: u32,
    aspect: AspectRatio,
    chroma: Chroma,
    masks: PixelMasks,
    stride: usize,
}

impl VideoGeometry {
    /// Negotiate the `RV32` output for a host request.
    pub const fn rv32(request: RenderRequest) -> Self {
        Self {
            width: request.width,
            height: request.height,
            aspect: request.aspect,
            chroma: Chroma::Rv32,
            masks: PixelMasks::RV32,
            stride: stride_for(request.width),
        }
    }

    /// Width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels (number of lines).
    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Display aspect ratio.
    #[inline]
    pub const fn aspect(&self) -> AspectRatio {
        self.aspect
    }

    /// Pixel format tag.
    #[inline]
    pub const fn chroma(&self) -> Chroma {
        self.chroma
    }

    /// Channel masks.
    #[inline]
    pub const fn masks(&self) -> PixelMasks {
        self.masks
    }

    /// Bytes per row, padding included.
    #[inline]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Bytes per row that carry visible pixels.
    #[inline]
    pub const fn visible_pitch(&self) -> usize {
        PIXEL_PITCH * self.width as usize
    }

    /// Total bytes of one picture, or `None` if it does not fit in `usize`.
    #[inline]
    pub const fn byte_len(&self) -> Option<usize> {
        self.stride.checked_mul(self.height as usize)
    }
}

/// Row stride in bytes: `width` rounded up to 16 pixels, 4 bytes each.
pub const fn stride_for(width: u32) -> usize {
    let pixels = (width as usize).div_ceil(ROW_ALIGN_PIXELS) * ROW_ALIGN_PIXELS;
    PIXEL_PITCH * pixels
}
