//! Mesh geometry uploaded for identity rendering.

use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::error::{RenderError, RenderResult};

/// Vertex layout of identity meshes: position only.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
}

impl MeshVertex {
    /// Vertex buffer layout matching `identity.wgsl`.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        }],
    };
}

/// Indexed triangle list living on the GPU.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    /// Uploads a triangle list after checking the indices.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        positions: &[Vec3],
        indices: &[u32],
    ) -> RenderResult<Self> {
        validate_triangles(positions.len(), indices)?;
        let vertices: Vec<MeshVertex> = positions
            .iter()
            .map(|p| MeshVertex {
                position: p.to_array(),
            })
            .collect();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertices")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} indices")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let index_count = u32::try_from(indices.len())
            .map_err(|_| RenderError::InvalidMesh(format!("{label}: too many indices")))?;

        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count,
        })
    }
}

fn validate_triangles(vertex_count: usize, indices: &[u32]) -> RenderResult<()> {
    if vertex_count == 0 || indices.is_empty() {
        return Err(RenderError::InvalidMesh("mesh is empty".to_string()));
    }
    if indices.len() % 3 != 0 {
        return Err(RenderError::InvalidMesh(format!(
            "index count {} is not a multiple of 3",
            indices.len()
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(RenderError::InvalidMesh(format!(
            "index {bad} out of range for {vertex_count} vertices"
        )));
    }
    Ok(())
}
