//! AsciiVout: the video output adapter the host drives.
//!
//! Lifecycle, as called by the host's output loop:
//!
//! ```text
//! create ──▶ init ──▶ { host fills picture, render, display, manage }* ──▶ end ──▶ destroy
//! ```
//!
//! `init` may be called again after `end`. Dropping the adapter runs `end`
//! and releases the backend, so `destroy` is safe after any failure.

use super::bridge::{CanvasBridge, CanvasHandle};
use super::events::{EventPump, HostEvent, KeyMap};
use super::stages;
use crate::backend::Backend;
use crate::config::{DitherMode, VoutConfig};
use crate::error::Result;
use crate::video::{FrameBufferPool, PictureBuffer, PictureId, RenderRequest, VideoGeometry};
use crossbeam_channel::Sender;

/// Colour ASCII-art video output.
pub struct AsciiVout<B: Backend> {
    bridge: CanvasBridge<B>,
    pool: FrameBufferPool,
    canvas: Option<CanvasHandle>,
    keymap: KeyMap,
    input: Sender<HostEvent>,
}

impl<B: Backend> AsciiVout<B> {
    /// Acquire `backend` and set up adapter state.
    ///
    /// The dithering option is resolved here and applied to the backend once.
    /// Accepted key events are later sent on `input`.
    ///
    /// # Errors
    ///
    /// [`VoutError::BackendUnavailable`](crate::VoutError::BackendUnavailable)
    /// if the backend cannot be initialized.
    pub fn create(backend: B, config: &VoutConfig, input: Sender<HostEvent>) -> Result<Self> {
        let dither = config.dither_mode();
        let bridge = CanvasBridge::acquire(backend, dither).map_err(|e| {
            tracing::error!(error = %e, "cannot initialize rendering backend");
            e
        })?;
        tracing::info!(%dither, quit_key = %config.quit_key, "ascii video output created");
        Ok(Self {
            bridge,
            pool: FrameBufferPool::new(config.pool_capacity),
            canvas: None,
            keymap: KeyMap::new(config.quit_key),
            input,
        })
    }

    /// Negotiate `RV32` output for `request`, open the canvas and allocate
    /// one output picture per pool slot (one by default).
    ///
    /// All or nothing: on failure no canvas and no picture stay allocated.
    /// A previous initialization is ended first.
    ///
    /// # Errors
    ///
    /// [`VoutError::BackendUnavailable`](crate::VoutError::BackendUnavailable)
    /// if the canvas cannot be built,
    /// [`VoutError::OutOfMemory`](crate::VoutError::OutOfMemory) or
    /// [`VoutError::NoSlotAvailable`](crate::VoutError::NoSlotAvailable) if the
    /// picture cannot be allocated.
    pub fn init(&mut self, request: RenderRequest) -> Result<()> {
        if self.canvas.is_some() {
            self.end();
        }

        let geometry = VideoGeometry::rv32(request);
        let canvas = self.bridge.open(&geometry).map_err(|e| {
            tracing::error!(error = %e, "could not create canvas");
            e
        })?;

        for _ in 0..self.pool.capacity() {
            if let Err(e) = self.pool.allocate(&geometry) {
                tracing::error!(error = %e, "could not allocate output picture");
                self.bridge.close(canvas);
                self.pool.release();
                return Err(e);
            }
        }

        tracing::info!(
            width = geometry.width(),
            height = geometry.height(),
            stride = geometry.stride(),
            pictures = self.pool.output_pictures().len(),
            "ascii video output initialized"
        );
        self.canvas = Some(canvas);
        Ok(())
    }

    /// Release the canvas and the output pictures. Does nothing if not initialized.
    pub fn end(&mut self) {
        if let Some(canvas) = self.canvas.take() {
            self.bridge.close(canvas);
            tracing::debug!("ascii video output ended");
        }
        self.pool.release();
    }

    /// Tear everything down and release the backend.
    pub fn destroy(self) {
        tracing::info!("ascii video output destroyed");
        drop(self);
    }

    /// Negotiated geometry, while initialized.
    pub fn geometry(&self) -> Option<&VideoGeometry> {
        self.canvas.as_ref().map(CanvasHandle::geometry)
    }

    /// Whether `init` succeeded and `end` has not run since.
    pub const fn is_initialized(&self) -> bool {
        self.canvas.is_some()
    }

    /// The output-picture table.
    pub fn output_pictures(&self) -> &[PictureId] {
        self.pool.output_pictures()
    }

    /// Picture in slot `id`.
    pub fn picture(&self, id: PictureId) -> Option<&PictureBuffer> {
        self.pool.get(id)
    }

    /// Mutable picture in slot `id`, for the decoder to write into.
    pub fn picture_mut(&mut self, id: PictureId) -> Option<&mut PictureBuffer> {
        self.pool.get_mut(id)
    }

    /// Dither picture `id` into the canvas.
    ///
    /// Ignored (and logged) if the adapter is not initialized or `id` is unknown.
    pub fn render(&mut self, id: PictureId) {
        let (Some(canvas), Some(picture)) = (self.canvas.as_ref(), self.pool.get(id)) else {
            tracing::debug!(picture = id.index(), "render skipped: nothing to draw");
            return;
        };
        stages::render(&mut self.bridge, canvas, picture);
    }

    /// Present the rendered canvas.
    pub fn display(&mut self) {
        if let Some(canvas) = self.canvas.as_ref() {
            stages::present(&mut self.bridge, canvas);
        }
    }

    /// Lazily drain the backend's pending input, forwarding recognized keys.
    pub fn poll_events(&mut self) -> EventPump<'_, B> {
        EventPump::new(self.bridge.backend_mut(), &self.keymap, &self.input)
    }

    /// Drain all pending input. Returns how many events were forwarded.
    pub fn manage(&mut self) -> usize {
        self.poll_events().count()
    }

    /// Dithering mode resolved at creation.
    pub const fn dither_mode(&self) -> DitherMode {
        self.bridge.dither_mode()
    }

    /// Key table used for input relay.
    pub const fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Number of open canvases (0 or 1).
    pub const fn live_canvases(&self) -> usize {
        self.bridge.live_canvases()
    }

    /// The backend.
    pub const fn backend(&self) -> &B {
        self.bridge.backend()
    }
}

impl<B: Backend> Drop for AsciiVout<B> {
    fn drop(&mut self) {
        self.end();
    }
}

impl<B: Backend> std::fmt::Debug for AsciiVout<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsciiVout")
            .field("bridge", &self.bridge)
            .field("pool", &self.pool)
            .field("canvas", &self.canvas)
            .field("keymap", &self.keymap)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ScriptedEvents, TerminalBackend, TerminalOptions};
    use crate::video::{stride_for, PictureKind, PixelMasks};
    use crossbeam_channel::unbounded;

    type Headless = TerminalBackend<Vec<u8>, ScriptedEvents>;

    fn create(dithering: &str, script: ScriptedEvents) -> (AsciiVout<Headless>, crossbeam_channel::Receiver<HostEvent>) {
        let backend = TerminalBackend::new(Vec::new(), script, TerminalOptions::headless(32, 16));
        let config = VoutConfig {
            dithering: Some(dithering.to_string()),
            ..VoutConfig::default()
        };
        let (tx, rx) = unbounded();
        (AsciiVout::create(backend, &config, tx).unwrap(), rx)
    }

    #[test]
    fn test_create_resolves_dithering() {
        let (vout, _rx) = create("random", ScriptedEvents::new());
        assert_eq!(vout.dither_mode(), DitherMode::Random);
        assert_eq!(vout.backend().dither_mode(), DitherMode::Random);
        assert!(!vout.is_initialized());
    }

    #[test]
    fn test_init_registers_one_direct_picture() {
        let (mut vout, _rx) = create("ordered", ScriptedEvents::new());
        vout.init(RenderRequest::new(64, 32)).unwrap();

        assert_eq!(vout.output_pictures().len(), 1);
        let id = vout.output_pictures()[0];
        let picture = vout.picture(id).unwrap();
        assert_eq!(picture.kind(), PictureKind::Direct);
        assert_eq!(picture.pixels().len(), stride_for(64) * 32);
        assert_eq!(vout.geometry().unwrap().width(), 64);
        assert_eq!(vout.live_canvases(), 1);
    }

    #[test]
    fn test_render_display_cycle() {
        let (mut vout, _rx) = create("none", ScriptedEvents::new());
        vout.init(RenderRequest::new(64, 32)).unwrap();
        let id = vout.output_pictures()[0];

        let picture = vout.picture_mut(id).unwrap();
        picture.fill(PixelMasks::RV32.pack(0, 255, 0));
        picture.mark_ready();

        vout.render(id);
        vout.display();
        assert!(!vout.backend().presented().is_blank());
        assert_eq!(vout.backend().frames(), 1);
    }

    #[test]
    fn test_render_before_init_is_ignored() {
        let (mut vout, _rx) = create("none", ScriptedEvents::new());
        vout.render(PictureId(0));
        vout.display();
        assert_eq!(vout.backend().frames(), 0);
    }

    #[test]
    fn test_failed_init_leaves_nothing_behind() {
        let (mut vout, _rx) = create("ordered", ScriptedEvents::new());
        assert!(vout.init(RenderRequest::new(0, 0)).is_err());
        assert!(vout.output_pictures().is_empty());
        assert_eq!(vout.live_canvases(), 0);

        let err = vout.init(RenderRequest::new(u32::MAX, u32::MAX)).unwrap_err();
        assert!(matches!(err, crate::VoutError::OutOfMemory { .. }));
        assert_eq!(vout.live_canvases(), 0);
        assert_eq!(vout.backend().live_bitmaps(), 0);
        vout.destroy();
    }

    #[test]
    fn test_reinit_replaces_previous_output() {
        let (mut vout, _rx) = create("ordered", ScriptedEvents::new());
        vout.init(RenderRequest::new(64, 32)).unwrap();
        vout.init(RenderRequest::new(128, 64)).unwrap();
        assert_eq!(vout.live_canvases(), 1);
        assert_eq!(vout.backend().live_bitmaps(), 1);
        assert_eq!(vout.output_pictures().len(), 1);
        let id = vout.output_pictures()[0];
        assert_eq!(vout.picture(id).unwrap().pixels().len(), stride_for(128) * 64);
    }

    #[test]
    fn test_manage_relays_keys() {
        let (mut vout, rx) = create("ordered", ScriptedEvents::keys("aq b "));
        assert_eq!(vout.manage(), 2);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![HostEvent::Quit, HostEvent::PauseToggle]);
        assert_eq!(vout.manage(), 0);
    }

    #[test]
    fn test_init_fills_every_pool_slot() {
        let backend = TerminalBackend::new(Vec::new(), ScriptedEvents::new(), TerminalOptions::headless(8, 4));
        let config = VoutConfig {
            pool_capacity: 3,
            ..VoutConfig::default()
        };
        let (tx, _rx) = unbounded();
        let mut vout = AsciiVout::create(backend, &config, tx).unwrap();

        vout.init(RenderRequest::new(32, 16)).unwrap();
        let ids = vout.output_pictures().to_vec();
        assert_eq!(ids.iter().map(|id| id.index()).collect::<Vec<_>>(), vec![0, 1, 2]);
        for id in ids {
            assert_eq!(vout.picture(id).unwrap().pixels().len(), stride_for(32) * 16);
        }
        assert_eq!(vout.live_canvases(), 1);

        vout.end();
        assert!(vout.output_pictures().is_empty());
    }

    #[test]
    fn test_end_is_idempotent() {
        let (mut vout, _rx) = create("ordered", ScriptedEvents::new());
        vout.end();
        vout.init(RenderRequest::new(16, 16)).unwrap();
        vout.end();
        vout.end();
        assert!(!vout.is_initialized());
        assert!(vout.output_pictures().is_empty());
        assert_eq!(vout.backend().live_bitmaps(), 0);
    }
}
