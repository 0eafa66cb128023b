//! Turning a click into an identity-buffer render.

use glam::{UVec2, Vec2};
use scenepick_core::{
    ClearFlags, ColorId, DrawCall, GpuBackend, PickOptions, RenderContext, RenderPass,
    SurfaceHandle, CLEAR_RGBA_BLACK,
};
use scenepick_render::Camera;

use crate::scene::PickScene;

/// Debug label of the pass that renders the identity buffer.
pub const FILL_PASS_NAME: &str = "picking_buffer_fill";

/// Builds the narrow camera looking down the ray under `cursor`.
///
/// The ray runs from the cursor's point on the near plane to its point on the
/// far plane of `camera`. Returns `None` if either cannot be unprojected.
pub fn pick_camera(
    camera: &Camera,
    cursor: Vec2,
    viewport: UVec2,
    options: &PickOptions,
) -> Option<Camera> {
    let viewport = viewport.as_vec2();
    let near = camera.viewport_to_world(cursor, viewport, 0.0)?;
    let far = camera.viewport_to_world(cursor, viewport, 1.0)?;
    if (far - near).length_squared() < 1e-12 {
        return None;
    }

    let mut pick = Camera::new(1.0);
    pick.near = camera.near;
    pick.far = camera.far;
    pick.set_fov_degrees(options.pick_fov_degrees);
    pick.look_at(near, far, options.pick_up);
    Some(pick)
}

/// Renders every renderable inside the pick frustum into `surface`, each
/// drawn in the flat color of its id.
///
/// The pass is cleared to the background color and runs even when nothing is
/// drawn. Returns the number of draw calls recorded.
pub fn render_identity_pass<B, S>(
    ctx: &mut RenderContext<B>,
    surface: SurfaceHandle,
    pick: &Camera,
    scene: &S,
    options: &PickOptions,
) -> usize
where
    B: GpuBackend,
    S: PickScene + ?Sized,
{
    let frustum = pick.frustum();
    let mut pass = RenderPass::new(ctx, FILL_PASS_NAME);
    pass.bind(surface);
    pass.clear(ClearFlags::COLOR | ClearFlags::DEPTH, CLEAR_RGBA_BLACK, 1.0, 0);
    pass.set_view_proj(pick.view_matrix(), pick.projection_matrix());

    let mut drawn = 0;
    scene.for_each_renderable(&mut |renderable| {
        if options.cull_with_frustum
            && !frustum.test_obb(&renderable.bounds, &renderable.world_transform)
        {
            return;
        }
        let Some(id) = ColorId::from_index(renderable.index) else {
            log::trace!("object {} has no color id, skipped", renderable.index);
            return;
        };
        pass.submit(DrawCall {
            mesh: renderable.mesh,
            world_transform: renderable.world_transform,
            color: id.to_unorm(),
        });
        drawn += 1;
    });
    log::trace!("{}: {drawn} draws", pass.slot());
    drawn
}
