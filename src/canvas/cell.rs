//! Cell: one character position on the text canvas.
//!
//! Glyphs come from a fixed ASCII ramp, so a cell stores a single byte plus
//! its two colors.

/// True-color RGB representation.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black (0, 0, 0)
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White (255, 255, 255)
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Default foreground (light grey)
    pub const DEFAULT_FG: Self = Self::new(192, 192, 192);
    /// Default background (black)
    pub const DEFAULT_BG: Self = Self::BLACK;

    /// Perceived brightness, 0-255 (Rec. 601 weights).
    #[inline]
    pub const fn luma(self) -> u8 {
        let y = 299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32;
        (y / 1000) as u8
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A single canvas cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    glyph: u8,
    fg: Rgb,
    bg: Rgb,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// A blank cell (space with default colors).
    pub const EMPTY: Self = Self {
        glyph: b' ',
        fg: Rgb::DEFAULT_FG,
        bg: Rgb::DEFAULT_BG,
    };

    /// Create a cell from a printable ASCII character.
    ///
    /// Non-printable or non-ASCII input is stored as `'?'`.
    #[inline]
    pub const fn new(c: char) -> Self {
        let glyph = if c.is_ascii_graphic() || c == ' ' {
            c as u8
        } else {
            b'?'
        };
        Self {
            glyph,
            fg: Rgb::DEFAULT_FG,
            bg: Rgb::DEFAULT_BG,
        }
    }

    /// The glyph as a `char`.
    #[inline]
    pub const fn glyph(&self) -> char {
        self.glyph as char
    }

    /// The glyph as its ASCII byte.
    #[inline]
    pub const fn glyph_byte(&self) -> u8 {
        self.glyph
    }

    /// Whether this cell shows nothing but background.
    #[inline]
    pub const fn is_blank(&self) -> bool {
        self.glyph == b' '
    }

    /// Get the foreground color.
    #[inline]
    pub const fn fg(&self) -> Rgb {
        self.fg
    }

    /// Get the background color.
    #[inline]
    pub const fn bg(&self) -> Rgb {
        self.bg
    }

    /// Set the foreground color (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, fg: Rgb) -> Self {
        self.fg = fg;
        self
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("glyph", &self.glyph())
            .field("fg", &self.fg)
            .field("bg", &self.bg)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_debug_is_hex() {
        assert_eq!(format!("{:?}", Rgb::new(255, 128, 0)), "#ff8000");
    }

    #[test]
    fn test_luma_extremes() {
        assert_eq!(Rgb::BLACK.luma(), 0);
        assert_eq!(Rgb::WHITE.luma(), 255);
        assert!(Rgb::new(0, 255, 0).luma() > Rgb::new(255, 0, 0).luma());
    }

    #[test]
    fn test_cell_glyphs() {
        assert_eq!(Cell::new('#').glyph(), '#');
        assert_eq!(Cell::new('日').glyph(), '?');
        assert!(Cell::EMPTY.is_blank());
        assert!(!Cell::new('@').is_blank());
    }

    #[test]
    fn test_cell_builder() {
        let cell = Cell::new('X').with_fg(Rgb::new(255, 0, 0));
        assert_eq!(cell.fg(), Rgb::new(255, 0, 0));
        assert_eq!(cell.bg(), Rgb::DEFAULT_BG);
        assert_eq!(Cell::default(), Cell::EMPTY);
    }
}
