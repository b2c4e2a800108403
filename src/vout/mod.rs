//! Video output: the adapter and the stages it runs per frame.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  picture id   ┌──────────────┐    blit     ┌──────────────┐
//! │  Host loop   │ ────────────▶ │  AsciiVout   │ ──────────▶ │   Backend    │
//! │              │               │              │             │  (terminal)  │
//! │              │ ◀──────────── │  EventPump   │ ◀────────── │              │
//! └──────────────┘   HostEvent   └──────────────┘  RawEvent   └──────────────┘
//! ```
//!
//! This module contains:
//! - [`AsciiVout`]: lifecycle entry points (create, init, render, display, manage, end, destroy)
//! - [`CanvasBridge`]: exclusive ownership of the backend and its canvas
//! - [`EventPump`]: key relay from the backend to the host channel

mod adapter;
mod bridge;
mod events;
mod stages;

pub use adapter::AsciiVout;
pub use bridge::{CanvasBridge, CanvasHandle};
pub use events::{EventPump, HostEvent, KeyMap, KeyModifiers};
pub use stages::{present, render};
