//! Render targets and CPU-readable staging textures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use scenepick_core::TextureRead;

use super::{DEPTH_FORMAT, IDENTITY_FORMAT};

/// Bytes per RGBA8 texel.
pub const BYTES_PER_TEXEL: u32 = 4;

/// A color + depth/stencil render target.
pub struct RenderTarget {
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    /// Creates a target. The color texture can be copied from.
    pub fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        // Rgba8Unorm stores id channels exactly
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label} color")),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: IDENTITY_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label} depth")),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            color,
            color_view,
            depth,
            depth_view,
            width,
            height,
        }
    }
}

/// Progress of an asynchronous read of a staging texture.
#[derive(Debug, Default)]
pub enum ReadState {
    /// Nothing requested.
    #[default]
    Idle,
    /// Read requested; mapping starts when this frame is submitted.
    Scheduled(u64),
    /// `map_async` issued; the status flips when the callback runs.
    Mapping(Arc<MapStatus>),
}

/// Written by the `map_async` callback, read by the render thread.
#[derive(Debug, Default)]
pub struct MapStatus {
    pub done: AtomicBool,
    pub ok: AtomicBool,
}

/// A staging buffer that surfaces are blitted into and the CPU maps.
pub struct ReadbackTexture {
    pub buffer: wgpu::Buffer,
    pub width: u32,
    pub height: u32,
    pub padded_bytes_per_row: u32,
    pub state: ReadState,
}

impl ReadbackTexture {
    /// Creates a staging buffer large enough for `width × height` texels with
    /// rows padded to the copy alignment.
    pub fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let padded_bytes_per_row = padded_bytes_per_row(width);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: u64::from(padded_bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            width,
            height,
            padded_bytes_per_row,
            state: ReadState::Idle,
        }
    }

    /// Whether the buffer is mapped or about to be. Copies into it would fail.
    pub fn is_busy(&self) -> bool {
        matches!(self.state, ReadState::Mapping(_))
    }

    /// Starts mapping if a read was scheduled for `frame` or earlier.
    pub fn begin_map(&mut self, frame: u64) {
        let ReadState::Scheduled(scheduled) = self.state else {
            return;
        };
        if scheduled > frame {
            return;
        }
        let status = Arc::new(MapStatus::default());
        let callback_status = Arc::clone(&status);
        self.buffer
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                callback_status.ok.store(result.is_ok(), Ordering::Release);
                callback_status.done.store(true, Ordering::Release);
            });
        self.state = ReadState::Mapping(status);
    }

    /// Copies out and unmaps the texels once mapping finished.
    pub fn take_data(&mut self) -> TextureRead {
        let ReadState::Mapping(status) = &self.state else {
            return TextureRead::Pending;
        };
        if !status.done.load(Ordering::Acquire) {
            return TextureRead::Pending;
        }
        let ok = status.ok.load(Ordering::Acquire);
        self.state = ReadState::Idle;
        if !ok {
            log::warn!("staging buffer mapping failed, dropping read-back");
            return TextureRead::Failed;
        }

        let data = {
            let mapped = self.buffer.slice(..).get_mapped_range();
            unpad_rows(&mapped, self.width, self.height, self.padded_bytes_per_row)
        };
        self.buffer.unmap();
        TextureRead::Ready(data)
    }

    /// Whether a mapping has finished but its data was never taken.
    pub fn has_stale_mapping(&self) -> bool {
        matches!(&self.state, ReadState::Mapping(status) if status.done.load(Ordering::Acquire))
    }

    /// Drops a scheduled read or a mapping, pending or finished, and returns
    /// to `Idle`.
    pub fn discard(&mut self) {
        if let ReadState::Mapping(status) = &self.state {
            let done = status.done.load(Ordering::Acquire);
            let ok = status.ok.load(Ordering::Acquire);
            // Unmapping aborts a pending map; a failed map left nothing mapped.
            if !done || ok {
                self.buffer.unmap();
            }
        }
        self.state = ReadState::Idle;
    }
}

/// Row pitch for a texture-to-buffer copy of `width` RGBA8 texels.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_TEXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Strips copy padding, returning tightly packed rows.
pub fn unpad_rows(data: &[u8], width: u32, height: u32, padded_bytes_per_row: u32) -> Vec<u8> {
    let row_bytes = (width * BYTES_PER_TEXEL) as usize;
    let pitch = padded_bytes_per_row as usize;
    let mut out = Vec::with_capacity(row_bytes * height as usize);
    for row in data.chunks(pitch).take(height as usize) {
        out.extend_from_slice(&row[..row_bytes.min(row.len())]);
    }
    out
}
