//! The per-tick picking driver.

use scenepick_core::{
    GpuBackend, PickOptions, ReadbackHandle, RenderContext, Result, SelectionOutcome,
    SelectionSink, SurfaceHandle,
};

use crate::readback::{ReadbackMachine, ReadbackState};
use crate::request::{pick_camera, render_identity_pass};
use crate::scene::{EditorInput, PickScene};

/// Screen-space object picking through a GPU identity buffer.
///
/// The owning frame loop calls [`PickingSystem::tick`] once per frame and
/// then submits the frame with [`RenderContext::frame`]. A click renders the
/// objects under the cursor into a small identity buffer; a few ticks later
/// the buffer has been read back and the selection is handed to the sink.
///
/// # Example
/// ```no_run
/// use scenepick::*;
///
/// # fn run(scene: &dyn PickScene, input: &dyn EditorInput, sink: &mut dyn SelectionSink) -> scenepick::Result<()> {
/// let mut ctx = create_headless_context(800, 600)?;
/// let mut picking = PickingSystem::new(&mut ctx, PickOptions::default())?;
/// loop {
///     picking.tick(&mut ctx, input, scene, sink);
///     ctx.frame();
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct PickingSystem {
    options: PickOptions,
    surface: SurfaceHandle,
    staging: ReadbackHandle,
    readback: ReadbackMachine,
}

impl PickingSystem {
    /// Validates `options` and creates the identity buffer and its staging
    /// texture on the context's backend.
    pub fn new<B: GpuBackend>(ctx: &mut RenderContext<B>, options: PickOptions) -> Result<Self> {
        options.validate()?;
        let dim = options.identity_buffer_dim;
        let backend = ctx.backend_mut();
        let surface = backend.create_surface("picking identity buffer", dim, dim)?;
        let staging = backend.create_readback_texture("picking staging", dim, dim)?;
        log::info!("picking initialized with a {dim}x{dim} identity buffer");

        Ok(Self {
            options,
            surface,
            staging,
            readback: ReadbackMachine::new(surface, staging),
        })
    }

    /// Runs one frame of picking.
    ///
    /// A pick in flight advances first, so a freshly rendered identity buffer
    /// is copied out on the following tick. Then a new click is considered.
    /// A decided outcome is forwarded to `sink` and also returned.
    pub fn tick<B, I, S, K>(
        &mut self,
        ctx: &mut RenderContext<B>,
        input: &I,
        scene: &S,
        sink: &mut K,
    ) -> Option<SelectionOutcome>
    where
        B: GpuBackend,
        I: EditorInput + ?Sized,
        S: PickScene + ?Sized,
        K: SelectionSink + ?Sized,
    {
        let outcome = self.readback.advance(ctx, scene);
        if let Some(outcome) = outcome {
            outcome.apply(sink);
        }

        if input.primary_pressed() {
            self.handle_click(ctx, input, scene);
        }
        outcome
    }

    fn handle_click<B, I, S>(&mut self, ctx: &mut RenderContext<B>, input: &I, scene: &S)
    where
        B: GpuBackend,
        I: EditorInput + ?Sized,
        S: PickScene + ?Sized,
    {
        if self.readback.is_disabled() {
            return;
        }
        let Some(camera) = scene.active_camera() else {
            log::trace!("click ignored: no active camera");
            return;
        };
        if input.gizmo_claims_click() {
            log::trace!("click ignored: owned by the gizmo");
            return;
        }
        if !self.readback.is_idle() {
            log::debug!(
                "click dropped: pick still in flight ({:?})",
                self.readback.state()
            );
            return;
        }

        let cursor = input.cursor_position();
        let Some(pick) = pick_camera(camera, cursor, scene.viewport_size(), &self.options) else {
            log::trace!("click ignored: cursor {cursor} does not unproject");
            return;
        };
        let drawn = render_identity_pass(ctx, self.surface, &pick, scene, &self.options);
        log::debug!("pick at {cursor}: {drawn} objects in the pick frustum");
        self.readback.arm();
    }

    /// Invalidates every configured pass and abandons a pick in flight.
    /// Call on resize and shutdown.
    pub fn reset<B: GpuBackend>(&mut self, ctx: &mut RenderContext<B>) {
        self.readback.reset(ctx.backend_mut());
        ctx.reset_all();
    }

    pub fn state(&self) -> ReadbackState {
        self.readback.state()
    }

    /// False once the backend turned out unable to read the buffer back.
    pub fn is_enabled(&self) -> bool {
        !self.readback.is_disabled()
    }

    pub fn options(&self) -> &PickOptions {
        &self.options
    }

    /// The identity buffer surface.
    pub fn identity_surface(&self) -> SurfaceHandle {
        self.surface
    }

    /// The staging texture the identity buffer is copied into.
    pub fn staging_texture(&self) -> ReadbackHandle {
        self.staging
    }
}
