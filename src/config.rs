//! Configuration: the dithering option and adapter settings.
//!
//! The host owns option parsing. This module only turns the raw option
//! string into a [`DitherMode`] and bundles the handful of knobs the adapter
//! reads at Create.

use std::convert::Infallible;
use std::str::FromStr;

/// Name of the dithering option in the host's configuration surface.
pub const DITHERING_OPTION: &str = "ascii-dithering";

/// Value the dithering option takes when the host has nothing set.
pub const DEFAULT_DITHERING: &str = "ordered";

/// Environment variable read by [`VoutConfig::from_env`] for the dithering mode.
pub const DITHERING_ENV: &str = "ASCII_VOUT_DITHERING";

/// Environment variable read by [`VoutConfig::from_env`] for the quit key.
pub const QUIT_KEY_ENV: &str = "ASCII_VOUT_QUIT_KEY";

/// How the backend spreads intensity error across character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DitherMode {
    /// Plain thresholding.
    None,
    /// 4x4 Bayer matrix.
    #[default]
    Ordered,
    /// Per-cell noise.
    Random,
}

impl DitherMode {
    /// Every mode, in option-list order.
    pub const ALL: [Self; 3] = [Self::None, Self::Ordered, Self::Random];

    /// Resolve an option value into a mode.
    ///
    /// `"none"` and `"random"` select their modes; anything else, including an
    /// unset option, falls back to [`DitherMode::Ordered`].
    pub fn resolve(value: Option<&str>) -> Self {
        match value {
            Some("none") => Self::None,
            Some("random") => Self::Random,
            _ => Self::Ordered,
        }
    }

    /// The option string selecting this mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ordered => "ordered",
            Self::Random => "random",
        }
    }

    /// Human-readable label for option listings.
    pub const fn description(self) -> &'static str {
        match self {
            Self::None => "No dithering",
            Self::Ordered => "Ordered dithering",
            Self::Random => "Random dithering",
        }
    }
}

impl FromStr for DitherMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::resolve(Some(s)))
    }
}

impl std::fmt::Display for DitherMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings read once when the adapter is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoutConfig {
    /// Raw value of the dithering option, if the host has one.
    pub dithering: Option<String>,
    /// Key that produces a quit request.
    pub quit_key: char,
    /// Number of picture slots. Init allocates and registers every slot as
    /// an output picture; the host picks which one to fill and render.
    pub pool_capacity: usize,
}

impl Default for VoutConfig {
    fn default() -> Self {
        Self {
            dithering: None,
            quit_key: 'q',
            pool_capacity: 1,
        }
    }
}

impl VoutConfig {
    /// Build a configuration from `ASCII_VOUT_DITHERING` and `ASCII_VOUT_QUIT_KEY`.
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            dithering: lookup(DITHERING_ENV).filter(|value| !value.is_empty()),
            quit_key: lookup(QUIT_KEY_ENV)
                .and_then(|value| value.chars().next())
                .unwrap_or(defaults.quit_key),
            ..defaults
        }
    }

    /// The dithering mode this configuration resolves to.
    pub fn dither_mode(&self) -> DitherMode {
        DitherMode::resolve(self.dithering.as_deref())
    }
}
