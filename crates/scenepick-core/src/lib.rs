//! Core abstractions for scenepick-rs.
//!
//! This crate holds everything about GPU picking that does not depend on a
//! particular graphics API:
//! - [`RenderContext`] with its [`ViewSlotAllocator`] and per-slot [`ViewState`]
//! - [`RenderPass`] descriptors that configure one view slot
//! - the [`GpuBackend`] trait a renderer implements
//! - [`ColorId`] identity encoding and [`PixelHistogram`] decoding
//! - [`SelectionOutcome`] and the [`SelectionSink`] it is delivered to
//! - [`PickOptions`] configuration

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder-style accessors don't need must_use
#![allow(clippy::must_use_candidate)]

pub mod allocator;
pub mod backend;
pub mod color_id;
pub mod context;
pub mod error;
pub mod histogram;
pub mod options;
pub mod render_pass;
pub mod selection;
pub mod view;

#[cfg(test)]
mod testing;

pub use allocator::ViewSlotAllocator;
pub use backend::{
    Capabilities, GpuBackend, MeshHandle, ReadbackHandle, SurfaceHandle, TextureRead,
};
pub use color_id::{color_to_index, index_to_color, ColorId, MAX_COLOR_INDEX};
pub use context::RenderContext;
pub use error::{PickError, Result};
pub use histogram::PixelHistogram;
pub use options::{PickOptions, IDENTITY_BUFFER_DIM};
pub use render_pass::RenderPass;
pub use selection::{SelectionOutcome, SelectionSink};
pub use view::{
    Blit, ClearFlags, ClearSpec, DrawCall, Rect, ViewSlot, ViewState, CLEAR_RGBA_BLACK, MAX_VIEWS,
};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
