//! Majority-color decoding of a read-back identity buffer.

use std::collections::BTreeMap;

use crate::color_id::ColorId;

/// Texel count per identity color.
///
/// Keys are kept in ascending [`ColorId`] order, which makes
/// [`PixelHistogram::winner`] deterministic: among colors sharing the
/// maximum count, the lowest id wins. The background never appears.
#[derive(Debug, Clone, Default)]
pub struct PixelHistogram {
    counts: BTreeMap<ColorId, u32>,
    max_count: u32,
}

impl PixelHistogram {
    /// Creates an empty histogram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every 4-byte texel of an RGBA8 buffer. Alpha is ignored.
    ///
    /// With `swap_red_blue` the texels are read as BGRA. A trailing partial
    /// texel is ignored.
    #[must_use]
    pub fn from_rgba(pixels: &[u8], swap_red_blue: bool) -> Self {
        let mut histogram = Self::new();
        for texel in pixels.chunks_exact(4) {
            let (r, g, b) = if swap_red_blue {
                (texel[2], texel[1], texel[0])
            } else {
                (texel[0], texel[1], texel[2])
            };
            histogram.record(ColorId::from_rgb(r, g, b));
        }
        histogram
    }

    /// Adds one texel. Background texels are skipped.
    pub fn record(&mut self, id: ColorId) {
        if id.is_background() {
            return;
        }
        let count = self.counts.entry(id).or_insert(0);
        *count += 1;
        self.max_count = self.max_count.max(*count);
    }

    /// Number of texels recorded for `id`.
    #[must_use]
    pub fn count(&self, id: ColorId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Number of distinct colors seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether only background was seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The most frequent color; ties go to the lowest id.
    #[must_use]
    pub fn winner(&self) -> Option<ColorId> {
        if self.max_count == 0 {
            return None;
        }
        self.counts
            .iter()
            .find(|(_, count)| **count == self.max_count)
            .map(|(&id, _)| id)
    }
}
