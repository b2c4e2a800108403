//! FrameBufferPool: fixed-capacity picture slots.
//!
//! Slots start `Free`. Allocation selects the first free slot, marks it
//! `Reserved` while memory is acquired, then registers it for output as
//! `Destroyed`: the picture lives until [`FrameBufferPool::release`] and is
//! reused in place every frame rather than recycled through `Free`.

use super::format::VideoGeometry;
use super::picture::{PictureBuffer, PictureId, PictureStatus};
use crate::error::{Result, VoutError};

/// A small fixed set of picture slots plus the output-picture table.
pub struct FrameBufferPool {
    slots: Vec<PictureBuffer>,
    output: Vec<PictureId>,
}

impl Default for FrameBufferPool {
    fn default() -> Self {
        Self::new(1)
    }
}

impl FrameBufferPool {
    /// Create a pool with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| PictureBuffer::free()).collect(),
            output: Vec::with_capacity(capacity),
        }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Pictures registered for output, in allocation order.
    #[inline]
    pub fn output_pictures(&self) -> &[PictureId] {
        &self.output
    }

    /// Picture in slot `id`.
    #[inline]
    pub fn get(&self, id: PictureId) -> Option<&PictureBuffer> {
        self.slots.get(id.0)
    }

    /// Mutable picture in slot `id`.
    #[inline]
    pub fn get_mut(&mut self, id: PictureId) -> Option<&mut PictureBuffer> {
        self.slots.get_mut(id.0)
    }

    /// Allocate a direct picture for `geometry` and register it for output.
    ///
    /// # Errors
    ///
    /// [`VoutError::NoSlotAvailable`] when every slot is taken,
    /// [`VoutError::OutOfMemory`] when the pixel memory cannot be acquired.
    pub fn allocate(&mut self, geometry: &VideoGeometry) -> Result<PictureId> {
        let Some(index) = self
            .slots
            .iter()
            .position(|slot| slot.status() == PictureStatus::Free)
        else {
            return Err(VoutError::NoSlotAvailable {
                capacity: self.capacity(),
            });
        };

        let slot = &mut self.slots[index];
        slot.set_status(PictureStatus::Reserved);

        let pixels = match alloc_pixels(geometry) {
            Ok(pixels) => pixels,
            Err(err) => {
                slot.detach();
                return Err(err);
            }
        };

        slot.attach(pixels, geometry);
        slot.set_status(PictureStatus::Destroyed);

        let id = PictureId(index);
        self.output.push(id);
        tracing::debug!(
            slot = index,
            bytes = slot.pixels().len(),
            pitch = slot.pitch(),
            "picture allocated"
        );
        Ok(id)
    }

    /// Free every allocated picture and clear the output table.
    ///
    /// Calling this on a pool with nothing allocated does nothing.
    pub fn release(&mut self) {
        if self.output.is_empty() {
            return;
        }
        for slot in &mut self.slots {
            slot.detach();
        }
        tracing::debug!(released = self.output.len(), "pictures released");
        self.output.clear();
    }
}

impl std::fmt::Debug for FrameBufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBufferPool")
            .field("capacity", &self.capacity())
            .field("output", &self.output)
            .finish()
    }
}

/// Zeroed pixel memory for one picture, without aborting on allocation failure.
fn alloc_pixels(geometry: &VideoGeometry) -> Result<Vec<u8>> {
    let bytes = geometry
        .byte_len()
        .ok_or(VoutError::OutOfMemory { bytes: usize::MAX })?;
    // A refused reservation is reported here; the zeroed allocation below
    // leaves pages uncommitted until the decoder writes them.
    Vec::<u8>::new()
        .try_reserve_exact(bytes)
        .map_err(|_| VoutError::OutOfMemory { bytes })?;
    Ok(vec![0u8; bytes])
}
