//! wgpu rendering backend for scenepick-rs.
//!
//! This crate provides:
//! - [`WgpuBackend`], a headless [`scenepick_core::GpuBackend`] that executes
//!   view slots with a flat-color identity pipeline
//! - [`Camera`] with unprojection used to build the pick camera
//! - [`Frustum`] culling against oriented bounding boxes

pub mod camera;
pub mod engine;
pub mod error;
pub mod frustum;
pub mod mesh;

pub use camera::{Camera, ProjectionMode};
pub use engine::{format_swaps_red_blue, WgpuBackend, DEPTH_FORMAT, IDENTITY_FORMAT};
pub use error::{RenderError, RenderResult};
pub use frustum::{Aabb, Frustum, FrustumPlane, Plane};
pub use mesh::{GpuMesh, MeshVertex};
