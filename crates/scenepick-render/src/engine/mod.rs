//! The wgpu implementation of [`GpuBackend`].

mod pipeline;
mod submit;
mod targets;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::Vec3;
use scenepick_core::{
    Capabilities, GpuBackend, MeshHandle, PickError, ReadbackHandle, SurfaceHandle, TextureRead,
    ViewSlot, ViewState,
};

use crate::error::{RenderError, RenderResult};
use crate::mesh::GpuMesh;

pub use pipeline::{DrawUniforms, IdentityPipeline};
pub use targets::{
    padded_bytes_per_row, unpad_rows, MapStatus, ReadState, ReadbackTexture, RenderTarget,
};

/// Color format of identity surfaces and the offscreen backbuffer.
pub const IDENTITY_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Depth/stencil format of every render target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Headless wgpu renderer executing view slots.
pub struct WgpuBackend {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    backbuffer: RenderTarget,
    surfaces: Vec<RenderTarget>,
    readbacks: Vec<ReadbackTexture>,
    meshes: Vec<GpuMesh>,
    identity: IdentityPipeline,
    capabilities: Capabilities,
    submitted: u64,
    completed: Arc<AtomicU64>,
}

impl WgpuBackend {
    /// Creates a backend without a window. The backbuffer is an offscreen
    /// `width × height` target.
    pub async fn new_headless(width: u32, height: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::TextureCreationFailed(format!(
                "backbuffer size {width}x{height} is empty"
            )));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("scenepick device (headless)"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let capabilities = query_capabilities(&adapter);
        log::info!(
            "headless backend on {} (blit: {}, bgra readback: {})",
            adapter.get_info().name,
            capabilities.texture_blit,
            capabilities.bgra_readback
        );

        let backbuffer = RenderTarget::new(&device, "backbuffer", width, height);
        let identity = IdentityPipeline::new(&device);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            backbuffer,
            surfaces: Vec::new(),
            readbacks: Vec::new(),
            meshes: Vec::new(),
            identity,
            capabilities,
            submitted: 0,
            completed: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Uploads a triangle list that draw calls can reference.
    pub fn upload_mesh(&mut self, positions: &[Vec3], indices: &[u32]) -> RenderResult<MeshHandle> {
        let id = u32::try_from(self.meshes.len())
            .map_err(|_| RenderError::InvalidMesh("too many meshes".to_string()))?;
        let mesh = GpuMesh::new(&self.device, &format!("mesh {id}"), positions, indices)?;
        self.meshes.push(mesh);
        Ok(MeshHandle(id))
    }

    /// Number of uploaded meshes.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    fn check_extent(&self, label: &str, width: u32, height: u32) -> scenepick_core::Result<()> {
        let max = self.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RenderError::TextureCreationFailed(format!(
                "{label}: size {width}x{height} outside 1..={max}"
            ))
            .into());
        }
        Ok(())
    }
}

fn query_capabilities(adapter: &wgpu::Adapter) -> Capabilities {
    let features = adapter.get_texture_format_features(IDENTITY_FORMAT);
    Capabilities {
        texture_blit: features
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC),
        bgra_readback: format_swaps_red_blue(IDENTITY_FORMAT),
    }
}

/// Whether texels of `format` arrive with red and blue exchanged.
pub fn format_swaps_red_blue(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    )
}

impl GpuBackend for WgpuBackend {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn backbuffer_size(&self) -> (u32, u32) {
        (self.backbuffer.width, self.backbuffer.height)
    }

    fn surface_size(&self, surface: SurfaceHandle) -> Option<(u32, u32)> {
        self.surfaces
            .get(surface.0 as usize)
            .map(|target| (target.width, target.height))
    }

    fn create_surface(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
    ) -> scenepick_core::Result<SurfaceHandle> {
        self.check_extent(label, width, height)?;
        let id = u32::try_from(self.surfaces.len())
            .map_err(|_| PickError::Backend("too many surfaces".to_string()))?;
        self.surfaces
            .push(RenderTarget::new(&self.device, label, width, height));
        log::debug!("created surface {id} '{label}' ({width}x{height})");
        Ok(SurfaceHandle(id))
    }

    fn create_readback_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
    ) -> scenepick_core::Result<ReadbackHandle> {
        self.check_extent(label, width, height)?;
        let id = u32::try_from(self.readbacks.len())
            .map_err(|_| PickError::Backend("too many readback textures".to_string()))?;
        self.readbacks
            .push(ReadbackTexture::new(&self.device, label, width, height));
        log::debug!("created readback texture {id} '{label}' ({width}x{height})");
        Ok(ReadbackHandle(id))
    }

    fn submit(&mut self, views: &[(ViewSlot, &ViewState)]) -> u64 {
        self.encode_frame(views)
    }

    fn completed_frame(&mut self) -> u64 {
        if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
            log::warn!("device poll failed: {e}");
        }
        self.completed.load(Ordering::Acquire)
    }

    fn read_texture(&mut self, texture: ReadbackHandle) -> u64 {
        let frame = self.submitted + 1;
        if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
            log::warn!("device poll failed: {e}");
        }
        let Some(readback) = self.readbacks.get_mut(texture.0 as usize) else {
            log::warn!("read of unknown readback texture {}", texture.0);
            return 0;
        };
        if readback.has_stale_mapping() {
            log::debug!("discarding unconsumed read of texture {}", texture.0);
            readback.discard();
        }
        if readback.is_busy() {
            log::debug!("readback texture {} is still mapped", texture.0);
            return 0;
        }
        readback.state = ReadState::Scheduled(frame);
        frame
    }

    fn take_texture_data(&mut self, texture: ReadbackHandle) -> TextureRead {
        match self.readbacks.get_mut(texture.0 as usize) {
            Some(readback) => readback.take_data(),
            None => TextureRead::Failed,
        }
    }

    fn cancel_read(&mut self, texture: ReadbackHandle) {
        if let Some(readback) = self.readbacks.get_mut(texture.0 as usize) {
            readback.discard();
        }
    }
}
