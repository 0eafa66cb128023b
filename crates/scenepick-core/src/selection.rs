//! Selection decisions produced by a pick.

use crate::color_id::ColorId;
use crate::histogram::PixelHistogram;

/// What a completed pick asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Select the object with this index.
    Select(u32),
    /// Clear the selection.
    Deselect,
}

impl SelectionOutcome {
    /// Decides the outcome for a histogram.
    ///
    /// Only background → `Deselect`. Otherwise the winning color's index is
    /// selected if `is_live` accepts it; an index whose object vanished
    /// between render and decode also yields `Deselect`.
    pub fn from_histogram(histogram: &PixelHistogram, is_live: impl Fn(u32) -> bool) -> Self {
        let Some(index) = histogram.winner().and_then(ColorId::index) else {
            return Self::Deselect;
        };
        if is_live(index) {
            Self::Select(index)
        } else {
            log::debug!("picked object {index} is no longer live, deselecting");
            Self::Deselect
        }
    }

    /// Forwards the outcome to a selection sink.
    pub fn apply(self, sink: &mut (impl SelectionSink + ?Sized)) {
        match self {
            Self::Select(index) => sink.select(index),
            Self::Deselect => sink.clear_selection(),
        }
    }
}

/// Receives selection decisions. Implemented by the editor's selection state.
pub trait SelectionSink {
    /// Selects the object with `index`.
    fn select(&mut self, index: u32);

    /// Clears the current selection.
    fn clear_selection(&mut self);
}
