//! TerminalBackend: a crossterm-driven text-rendering backend.
//!
//! Owns two canvases: `next` is what blits draw into, `current` is what the
//! terminal shows. [`Backend::refresh`] encodes the difference, writes it in a
//! single call and copies `next` over `current`.

use super::events::{CrosstermEvents, EventSource};
use super::{Backend, BitmapDescriptor, BitmapId, BlitArea, RawEvent, RawEventFlags};
use crate::canvas::diff::{render_diff, render_full, DiffState};
use crate::canvas::{Canvas, ChannelDecoder, Ditherer, PixelSource};
use crate::config::DitherMode;
use crate::error::BackendError;
use crossterm::{
    cursor, queue,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout, Write};

/// How a [`TerminalBackend`] sets up its output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalOptions {
    /// Fixed canvas size in cells. `None` probes the terminal.
    pub size: Option<(u16, u16)>,
    /// Whether to switch the terminal to raw mode.
    pub raw_mode: bool,
    /// Whether to draw on the alternate screen.
    pub alternate_screen: bool,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            size: None,
            raw_mode: true,
            alternate_screen: true,
        }
    }
}

impl TerminalOptions {
    /// A fixed-size canvas that leaves terminal modes alone.
    pub const fn headless(width: u16, height: u16) -> Self {
        Self {
            size: Some((width, height)),
            raw_mode: false,
            alternate_screen: false,
        }
    }
}

/// A text-rendering backend writing ANSI sequences to `W`.
pub struct TerminalBackend<W: Write, E: EventSource> {
    writer: W,
    events: E,
    options: TerminalOptions,
    initialized: bool,
    raw_enabled: bool,
    alt_screen_active: bool,
    ditherer: Ditherer,
    bitmaps: Vec<Option<BitmapDescriptor>>,
    current: Canvas,
    next: Canvas,
    diff_state: DiffState,
    output: Vec<u8>,
    needs_full_redraw: bool,
    frames: u64,
}

impl TerminalBackend<Stdout, CrosstermEvents> {
    /// A backend on the process's terminal with default options.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), CrosstermEvents, TerminalOptions::default())
    }
}

impl<W: Write, E: EventSource> TerminalBackend<W, E> {
    /// Create a backend. Nothing touches the terminal until [`Backend::init`].
    pub fn new(writer: W, events: E, options: TerminalOptions) -> Self {
        Self {
            writer,
            events,
            options,
            initialized: false,
            raw_enabled: false,
            alt_screen_active: false,
            ditherer: Ditherer::new(DitherMode::default()),
            bitmaps: Vec::new(),
            current: Canvas::new(0, 0),
            next: Canvas::new(0, 0),
            diff_state: DiffState::new(),
            output: Vec::with_capacity(65536),
            needs_full_redraw: true,
            frames: 0,
        }
    }

    /// Whether `init` has run and `end` has not.
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Active dithering mode.
    pub const fn dither_mode(&self) -> DitherMode {
        self.ditherer.mode()
    }

    /// Canvas blits draw into.
    pub const fn canvas(&self) -> &Canvas {
        &self.next
    }

    /// Canvas as last presented.
    pub const fn presented(&self) -> &Canvas {
        &self.current
    }

    /// Number of bitmap descriptors currently alive.
    pub fn live_bitmaps(&self) -> usize {
        self.bitmaps.iter().filter(|slot| slot.is_some()).count()
    }

    /// Number of completed refreshes.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// The output writer.
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Mutable access to the output writer.
    pub const fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Resize both canvases and schedule a full redraw.
    fn resize(&mut self, width: u16, height: u16) {
        self.current.resize(width, height);
        self.next.resize(width, height);
        self.needs_full_redraw = true;
        tracing::debug!(width, height, "canvas resized");
    }

    fn enter(&mut self) -> io::Result<()> {
        if self.options.raw_mode {
            terminal::enable_raw_mode()?;
            self.raw_enabled = true;
        }
        if self.options.alternate_screen {
            // Marked before the write: a partial sequence still needs undoing.
            self.alt_screen_active = true;
            queue!(self.writer, EnterAlternateScreen)?;
        }
        queue!(self.writer, cursor::Hide)?;
        self.writer.flush()
    }

    /// Undo whatever `enter` set up. Raw mode is released even if the
    /// screen cannot be restored.
    fn leave(&mut self) -> io::Result<()> {
        let screen = self.restore_screen();
        let raw = if self.raw_enabled {
            self.raw_enabled = false;
            terminal::disable_raw_mode()
        } else {
            Ok(())
        };
        screen.and(raw)
    }

    fn restore_screen(&mut self) -> io::Result<()> {
        self.writer.write_all(b"\x1b[0m")?;
        queue!(self.writer, cursor::Show)?;
        if self.alt_screen_active {
            self.alt_screen_active = false;
            queue!(self.writer, LeaveAlternateScreen)?;
        }
        self.writer.flush()
    }

    fn flush_canvas(&mut self) -> io::Result<()> {
        self.output.clear();

        if self.needs_full_redraw {
            render_full(&self.next, &mut self.output);
            self.needs_full_redraw = false;
            self.diff_state.reset();
        } else {
            let result = render_diff(&self.current, &self.next, &mut self.output, &mut self.diff_state);
            tracing::trace!(
                cells = result.cells_changed,
                moves = result.cursor_moves,
                colors = result.color_changes,
                "canvas diff encoded"
            );
        }

        if !self.output.is_empty() {
            self.writer.write_all(&self.output)?;
        }
        self.writer.flush()?;
        self.current.copy_from(&self.next);
        Ok(())
    }
}

impl<W: Write, E: EventSource> Backend for TerminalBackend<W, E> {
    fn init(&mut self) -> Result<(), BackendError> {
        if self.initialized {
            return Ok(());
        }
        let (width, height) = match self.options.size {
            Some(size) => size,
            None => terminal::size()?,
        };
        if let Err(e) = self.enter() {
            if let Err(undo) = self.leave() {
                tracing::warn!(error = %undo, "restoring terminal after failed init failed");
            }
            return Err(e.into());
        }
        self.resize(width, height);
        self.initialized = true;
        tracing::info!(width, height, "terminal backend initialized");
        Ok(())
    }

    fn end(&mut self) {
        if !self.initialized {
            return;
        }
        if let Err(e) = self.leave() {
            tracing::warn!(error = %e, "restoring terminal failed");
        }
        self.initialized = false;
        tracing::info!(frames = self.frames, "terminal backend released");
    }

    fn set_dithering(&mut self, mode: DitherMode) {
        self.ditherer.set_mode(mode);
    }

    fn create_bitmap(&mut self, descriptor: BitmapDescriptor) -> Result<BitmapId, BackendError> {
        if !self.initialized {
            return Err(BackendError::NotInitialized);
        }
        descriptor.validate()?;
        let index = if let Some(free) = self.bitmaps.iter().position(Option::is_none) {
            self.bitmaps[free] = Some(descriptor);
            free
        } else {
            self.bitmaps.push(Some(descriptor));
            self.bitmaps.len() - 1
        };
        Ok(BitmapId(index))
    }

    fn free_bitmap(&mut self, bitmap: BitmapId) {
        match self.bitmaps.get_mut(bitmap.0) {
            Some(slot) if slot.is_some() => *slot = None,
            _ => tracing::warn!(bitmap = bitmap.0, "freeing unknown bitmap"),
        }
    }

    fn width(&self) -> u16 {
        self.next.width()
    }

    fn height(&self) -> u16 {
        self.next.height()
    }

    fn clear(&mut self) {
        self.next.clear();
    }

    fn blit(&mut self, area: BlitArea, bitmap: BitmapId, pixels: &[u8]) {
        let Some(Some(descriptor)) = self.bitmaps.get(bitmap.0) else {
            tracing::warn!(bitmap = bitmap.0, "blit through unknown bitmap");
            return;
        };
        let source = PixelSource {
            pixels,
            width: descriptor.width,
            height: descriptor.height,
            pitch: descriptor.pitch,
            decoder: ChannelDecoder::new(descriptor.masks),
        };
        self.ditherer.blit(&mut self.next, area, &source);
    }

    fn refresh(&mut self) {
        match self.flush_canvas() {
            Ok(()) => self.frames += 1,
            Err(e) => {
                // The terminal state is unknown now: repaint everything next time.
                self.needs_full_redraw = true;
                self.diff_state.reset();
                tracing::warn!(error = %e, "presenting canvas failed");
            }
        }
    }

    fn poll_event(&mut self) -> Option<RawEvent> {
        let event = self.events.next_event()?;
        if event.flags.contains(RawEventFlags::RESIZE) {
            let (width, height) = event.size();
            self.resize(width, height);
        }
        Some(event)
    }
}

impl<W: Write, E: EventSource> Drop for TerminalBackend<W, E> {
    fn drop(&mut self) {
        // Restore terminal state
        self.end();
    }
}

impl<W: Write, E: EventSource> std::fmt::Debug for TerminalBackend<W, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalBackend")
            .field("options", &self.options)
            .field("initialized", &self.initialized)
            .field("dither", &self.ditherer.mode())
            .field("canvas", &self.next)
            .field("live_bitmaps", &self.live_bitmaps())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
