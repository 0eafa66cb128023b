//! View slots and the per-slot pass state they configure.
//!
//! A view slot is a numbered execution channel inside a frame. Render passes
//! write their viewport, target, transforms and clear behaviour into the
//! slot's [`ViewState`]; the backend executes the touched slots in ascending
//! order when the frame is submitted.

use std::fmt;

use bitflags::bitflags;
use glam::{Mat4, Vec4};

use crate::backend::{MeshHandle, ReadbackHandle, SurfaceHandle};

/// Number of view slots available in one frame.
pub const MAX_VIEWS: usize = 256;

/// Identifier of one render pass within a frame, in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ViewSlot(pub u8);

impl ViewSlot {
    /// Returns the slot as an index into a view table.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for ViewSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// A pixel rectangle, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    /// Rectangle covering a whole `width × height` surface.
    ///
    /// Extents beyond `u16::MAX` are clamped.
    #[must_use]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: u16::try_from(width).unwrap_or(u16::MAX),
            height: u16::try_from(height).unwrap_or(u16::MAX),
        }
    }

    /// Number of pixels covered.
    #[must_use]
    pub fn area(&self) -> u32 {
        u32::from(self.width) * u32::from(self.height)
    }
}

bitflags! {
    /// Which attachments a pass clears before drawing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u16 {
        const COLOR = 0x0001;
        const DEPTH = 0x0002;
        const STENCIL = 0x0004;
    }
}

/// Opaque black, packed `0xRRGGBBAA`. Equal to the background color id.
pub const CLEAR_RGBA_BLACK: u32 = 0x0000_00ff;

/// Clear operation configured for a view slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearSpec {
    pub flags: ClearFlags,
    /// Clear color packed as `0xRRGGBBAA`.
    pub rgba: u32,
    pub depth: f32,
    pub stencil: u8,
}

impl Default for ClearSpec {
    fn default() -> Self {
        Self {
            flags: ClearFlags::all(),
            rgba: CLEAR_RGBA_BLACK,
            depth: 1.0,
            stencil: 0,
        }
    }
}

impl ClearSpec {
    /// Clear color unpacked to `[r, g, b, a]` bytes.
    #[must_use]
    pub fn rgba_bytes(&self) -> [u8; 4] {
        self.rgba.to_be_bytes()
    }

    /// Clear color as normalized floats.
    #[must_use]
    pub fn color(&self) -> Vec4 {
        let [r, g, b, a] = self.rgba_bytes();
        Vec4::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }
}

/// Per-draw parameters handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshHandle,
    pub world_transform: Mat4,
    /// Constant fragment color, channels in `0..=1`.
    pub color: Vec4,
}

/// GPU-side copy from a render target into a CPU-readable texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blit {
    pub src: SurfaceHandle,
    pub dst: ReadbackHandle,
}

/// Everything configured for one view slot.
///
/// Configuration (name, rectangles, target, transforms, clear) persists across
/// frames until the slot is reset. Draws, blits and the touched flag only
/// live until the next frame submission.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub name: String,
    pub viewport: Option<Rect>,
    pub scissor: Option<Rect>,
    /// Render target. `None` renders into the back buffer.
    pub target: Option<SurfaceHandle>,
    pub view: Mat4,
    pub proj: Mat4,
    pub clear: Option<ClearSpec>,
    pub touched: bool,
    pub draws: Vec<DrawCall>,
    pub blits: Vec<Blit>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            name: String::new(),
            viewport: None,
            scissor: None,
            target: None,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            clear: None,
            touched: false,
            draws: Vec::new(),
            blits: Vec::new(),
        }
    }
}

impl ViewState {
    /// Whether the slot has to run this frame.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.touched || !self.draws.is_empty() || !self.blits.is_empty()
    }

    /// Drops per-frame work while keeping the slot's configuration.
    pub fn end_frame(&mut self) {
        self.touched = false;
        self.draws.clear();
        self.blits.clear();
    }

    /// Restores the slot to its unconfigured state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
