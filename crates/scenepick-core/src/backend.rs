//! The seam between view-slot bookkeeping and an actual GPU.

use crate::error::Result;
use crate::view::{ViewSlot, ViewState};

/// Handle to a render-target surface (color + depth) owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceHandle(pub u32);

/// Handle to a CPU-readable staging texture owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReadbackHandle(pub u32);

/// Handle to mesh geometry owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshHandle(pub u32);

/// Feature bits the picking pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Render targets can be copied into CPU-readable textures.
    pub texture_blit: bool,
    /// Read-back texels arrive as BGRA instead of RGBA.
    pub bgra_readback: bool,
}

/// A GPU that executes view slots.
///
/// Frames are numbered from 1. `submit` hands over the active slots of the
/// frame being recorded and returns that frame's number; the frame being
/// recorded afterwards is one higher. Completion is observed by polling
/// [`GpuBackend::completed_frame`], never by blocking.
pub trait GpuBackend {
    /// Reports optional features.
    fn capabilities(&self) -> Capabilities;

    /// Size of the default render target.
    fn backbuffer_size(&self) -> (u32, u32);

    /// Size of a surface, or `None` for an unknown handle.
    fn surface_size(&self, surface: SurfaceHandle) -> Option<(u32, u32)>;

    /// Creates an RGBA8 render target with a depth attachment.
    fn create_surface(&mut self, label: &str, width: u32, height: u32) -> Result<SurfaceHandle>;

    /// Creates a CPU-readable texture that surfaces can be blitted into.
    fn create_readback_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
    ) -> Result<ReadbackHandle>;

    /// Executes the active slots of the current frame in slot order.
    fn submit(&mut self, views: &[(ViewSlot, &ViewState)]) -> u64;

    /// Highest frame number whose GPU work has finished.
    fn completed_frame(&mut self) -> u64;

    /// Schedules an asynchronous read of `texture`.
    ///
    /// Returns the frame number at which the data becomes readable, or 0 if
    /// the read could not be scheduled.
    fn read_texture(&mut self, texture: ReadbackHandle) -> u64;

    /// Takes the texels of a completed read as tightly packed rows of
    /// 4-byte texels.
    fn take_texture_data(&mut self, texture: ReadbackHandle) -> TextureRead;

    /// Abandons a scheduled or unconsumed read so `texture` can be read again.
    fn cancel_read(&mut self, texture: ReadbackHandle);
}

/// Result of polling an asynchronous texture read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureRead {
    /// The data is not available yet.
    Pending,
    /// Tightly packed texels.
    Ready(Vec<u8>),
    /// The read was lost; nothing will arrive for it.
    Failed,
}
