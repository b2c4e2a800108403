//! CanvasBridge: exclusive owner of the rendering backend.
//!
//! The backend is process-wide state (one dithering setting, one canvas).
//! Acquiring a bridge initializes it; dropping the bridge ends it. Canvas
//! descriptors are opened against a negotiated geometry and must be closed
//! exactly once, which [`CanvasHandle`] enforces by not being `Clone`.

use crate::backend::{Backend, BitmapDescriptor, BitmapId};
use crate::config::DitherMode;
use crate::error::{Result, VoutError};
use crate::video::VideoGeometry;

/// An open canvas descriptor bound to one geometry.
#[derive(Debug, PartialEq, Eq)]
pub struct CanvasHandle {
    bitmap: BitmapId,
    geometry: VideoGeometry,
}

impl CanvasHandle {
    /// Backend descriptor behind this canvas.
    pub const fn bitmap(&self) -> BitmapId {
        self.bitmap
    }

    /// Geometry the descriptor was built from.
    pub const fn geometry(&self) -> &VideoGeometry {
        &self.geometry
    }
}

/// Owns the backend for the adapter's lifetime.
pub struct CanvasBridge<B: Backend> {
    backend: B,
    dither: DitherMode,
    live: usize,
}

impl<B: Backend> CanvasBridge<B> {
    /// Initialize `backend` and apply the dithering mode.
    ///
    /// # Errors
    ///
    /// [`VoutError::BackendUnavailable`] if the backend cannot start. The
    /// backend is dropped in that case.
    pub fn acquire(mut backend: B, dither: DitherMode) -> Result<Self> {
        backend.init()?;
        backend.set_dithering(dither);
        tracing::debug!(%dither, "backend acquired");
        Ok(Self {
            backend,
            dither,
            live: 0,
        })
    }

    /// Build a canvas descriptor for `geometry`.
    ///
    /// # Errors
    ///
    /// [`VoutError::BackendUnavailable`] if the backend rejects the geometry or
    /// masks. Nothing stays open on failure.
    pub fn open(&mut self, geometry: &VideoGeometry) -> Result<CanvasHandle> {
        let bitmap = self
            .backend
            .create_bitmap(BitmapDescriptor::for_geometry(geometry))
            .map_err(VoutError::BackendUnavailable)?;
        self.live += 1;
        tracing::debug!(
            bitmap = bitmap.0,
            width = geometry.width(),
            height = geometry.height(),
            stride = geometry.stride(),
            "canvas opened"
        );
        Ok(CanvasHandle {
            bitmap,
            geometry: *geometry,
        })
    }

    /// Release a canvas descriptor.
    pub fn close(&mut self, canvas: CanvasHandle) {
        self.backend.free_bitmap(canvas.bitmap);
        self.live = self.live.saturating_sub(1);
        tracing::debug!(bitmap = canvas.bitmap.0, "canvas closed");
    }

    /// Number of canvases opened and not yet closed.
    pub const fn live_canvases(&self) -> usize {
        self.live
    }

    /// Dithering mode applied at acquisition.
    pub const fn dither_mode(&self) -> DitherMode {
        self.dither
    }

    /// The backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: Backend> Drop for CanvasBridge<B> {
    fn drop(&mut self) {
        if self.live > 0 {
            tracing::warn!(live = self.live, "backend released with canvases still open");
        }
        self.backend.end();
        tracing::debug!("backend released");
    }
}

impl<B: Backend> std::fmt::Debug for CanvasBridge<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasBridge")
            .field("dither", &self.dither)
            .field("live", &self.live)
            .finish_non_exhaustive()
    }
}
