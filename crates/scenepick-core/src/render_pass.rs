//! Render pass descriptors bound to view slots.

use glam::Mat4;

use crate::backend::{GpuBackend, ReadbackHandle, SurfaceHandle};
use crate::context::RenderContext;
use crate::view::{Blit, ClearFlags, ClearSpec, DrawCall, Rect, ViewSlot};

/// A named pass occupying one view slot for the current frame.
///
/// Creating the pass allocates the slot. Everything else is configuration
/// written into the slot's state; the pass owns no GPU memory.
pub struct RenderPass<'a, B: GpuBackend> {
    ctx: &'a mut RenderContext<B>,
    slot: ViewSlot,
}

impl<'a, B: GpuBackend> RenderPass<'a, B> {
    /// Allocates a slot and labels it with `name`.
    pub fn new(ctx: &'a mut RenderContext<B>, name: &str) -> Self {
        let slot = ctx.allocate_slot();
        let view = ctx.view_mut(slot);
        view.name.clear();
        view.name.push_str(name);
        Self { ctx, slot }
    }

    /// The slot this pass renders into.
    pub fn slot(&self) -> ViewSlot {
        self.slot
    }

    /// The label given at construction.
    pub fn name(&self) -> &str {
        &self.ctx.view(self.slot).name
    }

    /// Targets `surface`, with viewport and scissor covering all of it.
    ///
    /// The slot is touched so the pass runs even without draw calls. An
    /// unknown surface leaves the pass untouched.
    pub fn bind(&mut self, surface: SurfaceHandle) {
        let Some((width, height)) = self.ctx.backend().surface_size(surface) else {
            log::debug!("{}: bind to unknown surface {surface:?} ignored", self.slot);
            return;
        };
        let rect = Rect::from_size(width, height);
        let view = self.ctx.view_mut(self.slot);
        view.viewport = Some(rect);
        view.scissor = Some(rect);
        view.target = Some(surface);
        view.touched = true;
    }

    /// Targets the back buffer with a full-size viewport.
    pub fn bind_backbuffer(&mut self) {
        let (width, height) = self.ctx.backend().backbuffer_size();
        let rect = Rect::from_size(width, height);
        let view = self.ctx.view_mut(self.slot);
        view.viewport = Some(rect);
        view.scissor = Some(rect);
        view.target = None;
        view.touched = true;
    }

    /// Configures the clear operation. `rgba` is packed `0xRRGGBBAA`.
    pub fn clear(&mut self, flags: ClearFlags, rgba: u32, depth: f32, stencil: u8) {
        self.ctx.view_mut(self.slot).clear = Some(ClearSpec {
            flags,
            rgba,
            depth,
            stencil,
        });
    }

    /// Clears color, depth and stencil to opaque black, 1.0 and 0.
    pub fn clear_default(&mut self) {
        self.ctx.view_mut(self.slot).clear = Some(ClearSpec::default());
    }

    /// Sets the transforms used by subsequent draws.
    pub fn set_view_proj(&mut self, view: Mat4, proj: Mat4) {
        let state = self.ctx.view_mut(self.slot);
        state.view = view;
        state.proj = proj;
    }

    /// Records a draw call.
    pub fn submit(&mut self, draw: DrawCall) {
        self.ctx.view_mut(self.slot).draws.push(draw);
    }

    /// Records a copy of `src` into the CPU-readable texture `dst`.
    pub fn blit(&mut self, dst: ReadbackHandle, src: SurfaceHandle) {
        self.ctx.view_mut(self.slot).blits.push(Blit { src, dst });
    }

    /// The context this pass belongs to.
    pub fn context(&mut self) -> &mut RenderContext<B> {
        &mut *self.ctx
    }
}
