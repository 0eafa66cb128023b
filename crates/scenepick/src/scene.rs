//! Collaborator traits the picking system consumes from the editor.

use glam::{Mat4, UVec2, Vec2};
use scenepick_core::MeshHandle;
use scenepick_render::{Aabb, Camera};

/// Mouse and gizmo state for the current tick.
pub trait EditorInput {
    /// True on the tick the primary mouse button went down.
    fn primary_pressed(&self) -> bool;

    /// Cursor position in viewport pixels, origin top-left.
    fn cursor_position(&self) -> Vec2;

    /// True when a manipulation gizmo owns the click (hovered while
    /// something is selected).
    fn gizmo_claims_click(&self) -> bool;
}

/// An object that can be drawn into the identity buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    /// Object index; its color id is derived from this.
    pub index: u32,
    pub mesh: MeshHandle,
    /// Bounds of the mesh in local space.
    pub bounds: Aabb,
    pub world_transform: Mat4,
}

/// Read access to the editor scene.
pub trait PickScene {
    /// The camera the user is looking through, if any.
    fn active_camera(&self) -> Option<&Camera>;

    /// Size of the viewport the cursor position refers to.
    fn viewport_size(&self) -> UVec2;

    /// Visits every object eligible for picking.
    fn for_each_renderable(&self, f: &mut dyn FnMut(&Renderable));

    /// Whether `index` still names an existing object.
    fn is_live(&self, index: u32) -> bool;
}
