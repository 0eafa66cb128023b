//! The rendering context: one backend, one view table, one slot allocator.

use crate::allocator::ViewSlotAllocator;
use crate::backend::GpuBackend;
use crate::view::{ViewSlot, ViewState, MAX_VIEWS};

/// Owns the backend together with the frame's view slots.
///
/// There is exactly one allocator per context and it lives as long as the
/// context. All access goes through `&mut self`, so the single render thread
/// that owns the context is the only one touching slot state.
pub struct RenderContext<B> {
    backend: B,
    allocator: ViewSlotAllocator,
    views: Vec<ViewState>,
    last_submitted: u64,
}

impl<B: GpuBackend> RenderContext<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            allocator: ViewSlotAllocator::new(),
            views: vec![ViewState::default(); MAX_VIEWS],
            last_submitted: 0,
        }
    }

    /// Shared access to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Exclusive access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consumes the context, returning the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Issues a fresh view slot, submitting the frame first if every slot is taken.
    pub fn allocate_slot(&mut self) -> ViewSlot {
        let Self {
            backend,
            allocator,
            views,
            last_submitted,
        } = self;
        allocator.allocate(|| {
            *last_submitted = submit_views(backend, views);
        })
    }

    /// The most recently issued view slot.
    pub fn last_issued(&self) -> ViewSlot {
        self.allocator.last_issued()
    }

    /// Number of frames forced by slot exhaustion.
    pub fn flush_count(&self) -> u64 {
        self.allocator.flush_count()
    }

    /// Number of the most recently submitted frame (0 before the first).
    pub fn last_submitted_frame(&self) -> u64 {
        self.last_submitted
    }

    /// State of a view slot.
    pub fn view(&self, slot: ViewSlot) -> &ViewState {
        &self.views[slot.index()]
    }

    pub(crate) fn view_mut(&mut self, slot: ViewSlot) -> &mut ViewState {
        &mut self.views[slot.index()]
    }

    /// Submits every active view slot and starts a new frame.
    ///
    /// Slot configuration survives; the allocation counter is not reset.
    pub fn frame(&mut self) -> u64 {
        self.last_submitted = submit_views(&mut self.backend, &mut self.views);
        self.last_submitted
    }

    /// Invalidates every configured pass, including those from before a
    /// wraparound, and restarts slot allocation at 0. Used on resize and
    /// shutdown.
    pub fn reset_all(&mut self) {
        for view in &mut self.views {
            view.reset();
        }
        self.allocator.reset();
        log::debug!("reset all {MAX_VIEWS} view slots");
    }
}

fn submit_views<B: GpuBackend>(backend: &mut B, views: &mut [ViewState]) -> u64 {
    let active: Vec<(ViewSlot, &ViewState)> = views
        .iter()
        .enumerate()
        .filter(|(_, view)| view.is_active())
        .filter_map(|(i, view)| u8::try_from(i).ok().map(|i| (ViewSlot(i), view)))
        .collect();
    let frame = backend.submit(&active);
    log::trace!("submitted frame {frame} with {} views", active.len());
    for view in views.iter_mut() {
        view.end_frame();
    }
    frame
}
