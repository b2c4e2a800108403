//! # ascii-vout
//!
//! A colour ASCII-art video output for media players.
//!
//! The host negotiates a geometry, writes decoded frames into `RV32` picture
//! memory the adapter hands out, and the adapter dithers each frame into a
//! grid of coloured glyphs on the terminal. Key presses on the terminal are
//! relayed back to the host as [`HostEvent`]s.
//!
//! ## Core Concepts
//!
//! - **Picture pool**: fixed slots of stride-aligned pixel memory, allocated at Init
//! - **Dithering**: pixels map to a brightness ramp of glyphs, with optional ordered or random noise
//! - **Double-buffered canvas**: only cells that changed since the last refresh are written
//! - **Event relay**: a closed key table turns terminal keys into host events
//!
//! ## Example
//!
//! ```rust,ignore
//! use ascii_vout::{AsciiVout, RenderRequest, TerminalBackend, VoutConfig};
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let mut vout = AsciiVout::create(TerminalBackend::stdout(), &VoutConfig::from_env(), tx)?;
//! vout.init(RenderRequest::new(320, 240))?;
//!
//! let id = vout.output_pictures()[0];
//! // ... decoder writes into vout.picture_mut(id) ...
//! vout.render(id);
//! vout.display();
//! vout.manage();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod backend;
pub mod canvas;
pub mod config;
pub mod error;
pub mod video;
pub mod vout;

// Re-exports for convenience
pub use backend::{Backend, RawEvent, ScriptedEvents, TerminalBackend, TerminalOptions};
pub use canvas::{Canvas, Cell, Ditherer, Rgb};
pub use config::{DitherMode, VoutConfig};
pub use error::{BackendError, Result, VoutError};
pub use video::{FrameBufferPool, PictureBuffer, PictureId, RenderRequest, VideoGeometry};
pub use vout::{AsciiVout, EventPump, HostEvent, KeyMap};
