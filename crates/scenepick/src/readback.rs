//! The multi-frame path from identity buffer to selection decision.
//!
//! After the identity pass has been submitted the buffer is copied into a
//! CPU-readable texture, the copy's frame is awaited by polling, and the
//! texels are reduced to a [`SelectionOutcome`]. Each step happens on a
//! separate tick; nothing here blocks.

use scenepick_core::{
    GpuBackend, PixelHistogram, ReadbackHandle, RenderContext, RenderPass, SelectionOutcome,
    SurfaceHandle, TextureRead,
};

use crate::scene::PickScene;

/// Debug label of the pass that copies the identity buffer out.
pub const BLIT_PASS_NAME: &str = "picking_buffer_blit";

/// Where the current pick cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadbackState {
    /// No pick in flight.
    #[default]
    Idle,
    /// The identity buffer was rendered; the copy is recorded next tick.
    BlitRequested,
    /// Waiting for the GPU to finish `frame`.
    AwaitingFence { frame: u64 },
    /// Texels are available and about to be decoded.
    Ready,
}

/// Drives one pick at a time from blit to decode.
#[derive(Debug)]
pub struct ReadbackMachine {
    state: ReadbackState,
    disabled: bool,
    surface: SurfaceHandle,
    staging: ReadbackHandle,
}

impl ReadbackMachine {
    /// Creates an idle machine reading `surface` through `staging`.
    pub fn new(surface: SurfaceHandle, staging: ReadbackHandle) -> Self {
        Self {
            state: ReadbackState::Idle,
            disabled: false,
            surface,
            staging,
        }
    }

    pub fn state(&self) -> ReadbackState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ReadbackState::Idle
    }

    /// Whether picking was switched off because the backend cannot blit.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Starts a cycle after the identity buffer was rendered.
    ///
    /// Returns `false` if a cycle is already in flight or picking is disabled.
    pub fn arm(&mut self) -> bool {
        if self.disabled || !self.is_idle() {
            return false;
        }
        self.state = ReadbackState::BlitRequested;
        true
    }

    /// Drops any cycle in flight, releasing its read on the backend.
    pub fn reset<B: GpuBackend>(&mut self, backend: &mut B) {
        if let ReadbackState::AwaitingFence { frame } = self.state {
            log::debug!("abandoning read-back awaiting frame {frame}");
            backend.cancel_read(self.staging);
        }
        self.state = ReadbackState::Idle;
    }

    /// Advances by at most one step. Returns the outcome on the tick the
    /// texels are decoded.
    pub fn advance<B, S>(&mut self, ctx: &mut RenderContext<B>, scene: &S) -> Option<SelectionOutcome>
    where
        B: GpuBackend,
        S: PickScene + ?Sized,
    {
        match self.state {
            ReadbackState::Idle => None,
            ReadbackState::BlitRequested => {
                self.request_blit(ctx);
                None
            }
            ReadbackState::AwaitingFence { frame } => {
                let completed = ctx.backend_mut().completed_frame();
                if completed < frame {
                    return None;
                }
                // The fence can pass before the mapping callback has run.
                let pixels = match ctx.backend_mut().take_texture_data(self.staging) {
                    TextureRead::Pending => return None,
                    TextureRead::Ready(pixels) => pixels,
                    TextureRead::Failed => {
                        log::warn!("identity buffer read-back failed, pick dropped");
                        self.state = ReadbackState::Idle;
                        return None;
                    }
                };
                self.state = ReadbackState::Ready;

                let swap_red_blue = ctx.backend().capabilities().bgra_readback;
                let histogram = PixelHistogram::from_rgba(&pixels, swap_red_blue);
                let outcome = SelectionOutcome::from_histogram(&histogram, |index| {
                    scene.is_live(index)
                });
                log::debug!(
                    "pick decoded after frame {frame}: {} ids, {outcome:?}",
                    histogram.len()
                );
                self.state = ReadbackState::Idle;
                Some(outcome)
            }
            // Ready only lasts within the decode above; never seen here.
            ReadbackState::Ready => {
                self.state = ReadbackState::Idle;
                None
            }
        }
    }

    fn request_blit<B: GpuBackend>(&mut self, ctx: &mut RenderContext<B>) {
        if !ctx.backend().capabilities().texture_blit {
            if !self.disabled {
                log::warn!("backend cannot copy render targets to the CPU, GPU picking disabled");
            }
            self.disabled = true;
            self.state = ReadbackState::Idle;
            return;
        }

        let mut pass = RenderPass::new(ctx, BLIT_PASS_NAME);
        pass.blit(self.staging, self.surface);
        let frame = pass.context().backend_mut().read_texture(self.staging);
        if frame == 0 {
            log::warn!("identity buffer read-back could not be scheduled");
            self.state = ReadbackState::Idle;
            return;
        }
        self.state = ReadbackState::AwaitingFence { frame };
    }
}
