//! Render and display stages of the frame cycle.
//!
//! [`render`] computes the next frame into the canvas; [`present`] shows it.
//! Neither can fail at this level: the backend logs and absorbs its own I/O
//! errors.

use super::bridge::{CanvasBridge, CanvasHandle};
use crate::backend::{Backend, BlitArea};
use crate::video::PictureBuffer;

/// Clear the canvas and dither `picture` over all of it.
///
/// The host must have finished writing `picture` before this call.
pub fn render<B: Backend>(bridge: &mut CanvasBridge<B>, canvas: &CanvasHandle, picture: &PictureBuffer) {
    let backend = bridge.backend_mut();
    backend.clear();
    let area = BlitArea::full(backend.width(), backend.height());
    backend.blit(area, canvas.bitmap(), picture.pixels());
}

/// Flush the canvas to the output device.
pub fn present<B: Backend>(bridge: &mut CanvasBridge<B>, canvas: &CanvasHandle) {
    tracing::trace!(bitmap = canvas.bitmap().0, "presenting canvas");
    bridge.backend_mut().refresh();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ScriptedEvents, TerminalBackend, TerminalOptions};
    use crate::config::DitherMode;
    use crate::video::{FrameBufferPool, PixelMasks, RenderRequest, VideoGeometry};

    #[test]
    fn test_render_then_present() {
        let backend =
            TerminalBackend::new(Vec::new(), ScriptedEvents::new(), TerminalOptions::headless(16, 8));
        let mut bridge = CanvasBridge::acquire(backend, DitherMode::None).unwrap();
        let geometry = VideoGeometry::rv32(RenderRequest::new(32, 16));
        let canvas = bridge.open(&geometry).unwrap();

        let mut pool = FrameBufferPool::default();
        let id = pool.allocate(&geometry).unwrap();
        let picture = pool.get_mut(id).unwrap();
        picture.fill(PixelMasks::RV32.pack(255, 255, 255));

        render(&mut bridge, &canvas, pool.get(id).unwrap());
        assert!(bridge.backend().canvas().cells().iter().all(|c| c.glyph() == '@'));
        assert!(bridge.backend().presented().is_blank());

        present(&mut bridge, &canvas);
        assert_eq!(bridge.backend().frames(), 1);
        assert!(!bridge.backend().presented().is_blank());

        // Rendering a black frame clears what was there.
        pool.get_mut(id).unwrap().fill(0);
        render(&mut bridge, &canvas, pool.get(id).unwrap());
        assert!(bridge.backend().canvas().is_blank());

        bridge.close(canvas);
    }
}
