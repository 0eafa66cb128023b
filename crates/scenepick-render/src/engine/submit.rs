//! Encodes the active view slots of one frame into a command buffer.

use scenepick_core::{ClearFlags, ClearSpec, Rect, ViewSlot, ViewState};
use wgpu::util::DeviceExt;

use super::pipeline::DrawUniforms;
use super::targets::RenderTarget;
use super::WgpuBackend;
use crate::mesh::GpuMesh;

impl WgpuBackend {
    /// Records and submits every view, then schedules pending reads.
    pub(super) fn encode_frame(&mut self, views: &[(ViewSlot, &ViewState)]) -> u64 {
        let frame = self.submitted + 1;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scenepick frame encoder"),
            });

        for &(slot, view) in views {
            self.encode_view(&mut encoder, slot, view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.submitted = frame;

        let completed = std::sync::Arc::clone(&self.completed);
        self.queue.on_submitted_work_done(move || {
            completed.fetch_max(frame, std::sync::atomic::Ordering::AcqRel);
        });

        for readback in &mut self.readbacks {
            readback.begin_map(frame);
        }
        frame
    }

    fn encode_view(&self, encoder: &mut wgpu::CommandEncoder, slot: ViewSlot, view: &ViewState) {
        let target = match view.target {
            Some(handle) => match self.surfaces.get(handle.0 as usize) {
                Some(target) => target,
                None => {
                    log::warn!("{slot} ({}) targets unknown surface {}", view.name, handle.0);
                    return;
                }
            },
            None => &self.backbuffer,
        };

        let view_proj = view.proj * view.view;
        let prepared: Vec<(wgpu::BindGroup, &GpuMesh)> = view
            .draws
            .iter()
            .filter_map(|draw| {
                let Some(mesh) = self.meshes.get(draw.mesh.0 as usize) else {
                    log::warn!("{slot} ({}) draws unknown mesh {}", view.name, draw.mesh.0);
                    return None;
                };
                let uniforms = DrawUniforms::new(view_proj * draw.world_transform, draw.color);
                let buffer = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("identity draw uniforms"),
                        contents: bytemuck::cast_slice(&[uniforms]),
                        usage: wgpu::BufferUsages::UNIFORM,
                    });
                let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("identity draw bind group"),
                    layout: &self.identity.bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                Some((bind_group, mesh))
            })
            .collect();

        if view.touched || !prepared.is_empty() {
            self.encode_draws(encoder, target, view, &prepared);
        }

        for blit in &view.blits {
            let Some(src) = self.surfaces.get(blit.src.0 as usize) else {
                log::warn!("{slot} blits from unknown surface {}", blit.src.0);
                continue;
            };
            let Some(dst) = self.readbacks.get(blit.dst.0 as usize) else {
                log::warn!("{slot} blits into unknown readback texture {}", blit.dst.0);
                continue;
            };
            if dst.is_busy() {
                log::warn!("{slot} skipped blit into mapped readback texture {}", blit.dst.0);
                continue;
            }
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    texture: &src.color,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &dst.buffer,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(dst.padded_bytes_per_row),
                        rows_per_image: Some(dst.height),
                    },
                },
                wgpu::Extent3d {
                    width: src.width.min(dst.width),
                    height: src.height.min(dst.height),
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    fn encode_draws(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &RenderTarget,
        view: &ViewState,
        prepared: &[(wgpu::BindGroup, &GpuMesh)],
    ) {
        let clear = view.clear;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&view.name),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load_op(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load_op(clear),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: stencil_load_op(clear),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            ..Default::default()
        });

        let viewport = clamp_rect(view.viewport, target.width, target.height);
        let scissor = clamp_rect(view.scissor.or(view.viewport), target.width, target.height);
        if viewport.area() == 0 || scissor.area() == 0 {
            return;
        }
        pass.set_viewport(
            f32::from(viewport.x),
            f32::from(viewport.y),
            f32::from(viewport.width),
            f32::from(viewport.height),
            0.0,
            1.0,
        );
        pass.set_scissor_rect(
            u32::from(scissor.x),
            u32::from(scissor.y),
            u32::from(scissor.width),
            u32::from(scissor.height),
        );

        pass.set_pipeline(&self.identity.pipeline);
        for (bind_group, mesh) in prepared {
            pass.set_bind_group(0, bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

fn color_load_op(clear: Option<ClearSpec>) -> wgpu::LoadOp<wgpu::Color> {
    match clear {
        Some(spec) if spec.flags.contains(ClearFlags::COLOR) => {
            let c = spec.color();
            wgpu::LoadOp::Clear(wgpu::Color {
                r: f64::from(c.x),
                g: f64::from(c.y),
                b: f64::from(c.z),
                a: f64::from(c.w),
            })
        }
        _ => wgpu::LoadOp::Load,
    }
}

fn depth_load_op(clear: Option<ClearSpec>) -> wgpu::LoadOp<f32> {
    match clear {
        Some(spec) if spec.flags.contains(ClearFlags::DEPTH) => wgpu::LoadOp::Clear(spec.depth),
        _ => wgpu::LoadOp::Load,
    }
}

fn stencil_load_op(clear: Option<ClearSpec>) -> wgpu::LoadOp<u32> {
    match clear {
        Some(spec) if spec.flags.contains(ClearFlags::STENCIL) => {
            wgpu::LoadOp::Clear(u32::from(spec.stencil))
        }
        _ => wgpu::LoadOp::Load,
    }
}

/// Clips a rectangle to the target, defaulting to the whole target.
fn clamp_rect(rect: Option<Rect>, width: u32, height: u32) -> Rect {
    let full = Rect::from_size(width, height);
    let Some(rect) = rect else {
        return full;
    };
    let x = rect.x.min(full.width);
    let y = rect.y.min(full.height);
    Rect {
        x,
        y,
        width: rect.width.min(full.width - x),
        height: rect.height.min(full.height - y),
    }
}
