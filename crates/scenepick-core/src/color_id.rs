//! Color encoding of object identity.
//!
//! An object index is packed into 24 bits of RGB:
//! - R contains bits 0-7
//! - G contains bits 8-15
//! - B contains bits 16-23
//!
//! `(0, 0, 0)` is the background: the identity pass clears to opaque black,
//! so "nothing rendered here" and "no object" are the same color. Index 0
//! therefore has no color and cannot be picked.

use std::fmt;

use glam::Vec4;

/// Largest index representable as a color.
pub const MAX_COLOR_INDEX: u32 = 0x00FF_FFFF;

/// A 24-bit identity color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ColorId(u32);

impl ColorId {
    /// The reserved background color.
    pub const BACKGROUND: Self = Self(0);

    /// Color for an object index, or `None` for 0 and indices above 24 bits.
    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        (index != 0 && index <= MAX_COLOR_INDEX).then_some(Self(index))
    }

    /// Color from read-back channel bytes.
    #[must_use]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(color_to_index(r, g, b))
    }

    /// Channel bytes `[r, g, b]`.
    #[must_use]
    pub fn rgb(self) -> [u8; 3] {
        index_to_color(self.0)
    }

    /// The packed 24-bit value.
    #[must_use]
    pub fn packed(self) -> u32 {
        self.0
    }

    /// Whether this is the background sentinel.
    #[must_use]
    pub fn is_background(self) -> bool {
        self.0 == 0
    }

    /// The object index, or `None` for the background.
    #[must_use]
    pub fn index(self) -> Option<u32> {
        (!self.is_background()).then_some(self.0)
    }

    /// Fragment color for the identity shader: each channel divided by 255,
    /// alpha 1.
    #[must_use]
    pub fn to_unorm(self) -> Vec4 {
        let [r, g, b] = self.rgb();
        Vec4::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        )
    }
}

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Encodes the low 24 bits of an index as `[r, g, b]`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn index_to_color(index: u32) -> [u8; 3] {
    [
        (index & 0xFF) as u8,
        ((index >> 8) & 0xFF) as u8,
        ((index >> 16) & 0xFF) as u8,
    ]
}

/// Decodes `[r, g, b]` back to an index.
#[must_use]
pub fn color_to_index(r: u8, g: u8, b: u8) -> u32 {
    u32::from(r) | (u32::from(g) << 8) | (u32::from(b) << 16)
}
