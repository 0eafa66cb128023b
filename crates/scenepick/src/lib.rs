//! GPU identity-buffer object picking for interactive scene editors.
//!
//! A click renders the objects under the cursor through a narrow pick camera
//! into a tiny identity buffer, each object in a flat color encoding its
//! index. The buffer is read back asynchronously over the next frames and
//! the most frequent color decides the selection.
//!
//! # Quick Start
//!
//! ```no_run
//! use scenepick::*;
//!
//! fn main() -> scenepick::Result<()> {
//!     init_logging();
//!     let mut ctx = create_headless_context(800, 600)?;
//!     let picking = PickingSystem::new(&mut ctx, PickOptions::default())?;
//!     assert!(picking.is_enabled());
//!     Ok(())
//! }
//! ```
//!
//! The editor supplies [`EditorInput`], [`PickScene`] and [`SelectionSink`]
//! implementations and calls [`PickingSystem::tick`] once per frame before
//! [`RenderContext::frame`].

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod headless;
pub mod readback;
pub mod request;
pub mod scene;
pub mod system;

pub use headless::{create_headless_context, init_logging};
pub use readback::{ReadbackMachine, ReadbackState, BLIT_PASS_NAME};
pub use request::{pick_camera, render_identity_pass, FILL_PASS_NAME};
pub use scene::{EditorInput, PickScene, Renderable};
pub use system::PickingSystem;

pub use scenepick_core::{
    color_to_index, index_to_color, Capabilities, ClearFlags, ColorId, DrawCall, GpuBackend,
    MeshHandle, PickError, PickOptions, PixelHistogram, ReadbackHandle, RenderContext,
    RenderPass, Result, SelectionOutcome, SelectionSink, SurfaceHandle, TextureRead, ViewSlot,
    ViewState, MAX_COLOR_INDEX,
};
pub use scenepick_render::{Aabb, Camera, Frustum, ProjectionMode, WgpuBackend};

// Re-export glam types for convenience
pub use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};
