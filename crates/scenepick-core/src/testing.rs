//! Minimal backend used by this crate's unit tests.

use std::collections::HashMap;

use crate::backend::{Capabilities, GpuBackend, ReadbackHandle, SurfaceHandle, TextureRead};
use crate::error::Result;
use crate::view::{ViewSlot, ViewState};

/// Records the names of the views submitted in each frame.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub frames: Vec<Vec<String>>,
    surfaces: HashMap<SurfaceHandle, (u32, u32)>,
}

impl GpuBackend for RecordingBackend {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            texture_blit: true,
            bgra_readback: false,
        }
    }

    fn backbuffer_size(&self) -> (u32, u32) {
        (640, 480)
    }

    fn surface_size(&self, surface: SurfaceHandle) -> Option<(u32, u32)> {
        self.surfaces.get(&surface).copied()
    }

    fn create_surface(&mut self, _label: &str, width: u32, height: u32) -> Result<SurfaceHandle> {
        let handle = SurfaceHandle(u32::try_from(self.surfaces.len()).unwrap_or(u32::MAX));
        self.surfaces.insert(handle, (width, height));
        Ok(handle)
    }

    fn create_readback_texture(
        &mut self,
        _label: &str,
        _width: u32,
        _height: u32,
    ) -> Result<ReadbackHandle> {
        Ok(ReadbackHandle(0))
    }

    fn submit(&mut self, views: &[(ViewSlot, &ViewState)]) -> u64 {
        self.frames
            .push(views.iter().map(|(_, view)| view.name.clone()).collect());
        self.frames.len() as u64
    }

    fn completed_frame(&mut self) -> u64 {
        self.frames.len() as u64
    }

    fn read_texture(&mut self, _texture: ReadbackHandle) -> u64 {
        0
    }

    fn take_texture_data(&mut self, _texture: ReadbackHandle) -> TextureRead {
        TextureRead::Pending
    }

    fn cancel_read(&mut self, _texture: ReadbackHandle) {}
}
