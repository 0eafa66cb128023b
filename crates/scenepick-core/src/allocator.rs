//! Sequential view-slot allocation.

use crate::view::{ViewSlot, MAX_VIEWS};

/// Issues view slots `0, 1, 2, …, 255` and wraps.
///
/// Wrapping is only safe once everything recorded into the old slots has
/// been handed to the GPU, so the caller-supplied flush runs right before
/// slot 0 is issued again.
#[derive(Debug, Default)]
pub struct ViewSlotAllocator {
    next: u16,
    last: ViewSlot,
    flushes: u64,
}

impl ViewSlotAllocator {
    /// Creates an allocator whose first slot is 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next slot, calling `flush` first if all 256 are used.
    pub fn allocate(&mut self, flush: impl FnOnce()) -> ViewSlot {
        if usize::from(self.next) >= MAX_VIEWS {
            log::debug!("all {MAX_VIEWS} view slots used, flushing frame");
            flush();
            self.flushes += 1;
            self.next = 0;
        }
        // next < MAX_VIEWS == 256 here
        let slot = ViewSlot(u8::try_from(self.next).unwrap_or(u8::MAX));
        self.next += 1;
        self.last = slot;
        slot
    }

    /// The most recently issued slot.
    #[must_use]
    pub fn last_issued(&self) -> ViewSlot {
        self.last
    }

    /// Number of slots issued since the last reset or wrap.
    #[must_use]
    pub fn issued(&self) -> usize {
        usize::from(self.next)
    }

    /// Number of times exhaustion forced a flush.
    #[must_use]
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    /// Restarts the sequence at 0.
    pub fn reset(&mut self) {
        self.next = 0;
        self.last = ViewSlot(0);
    }
}
