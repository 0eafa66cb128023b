//! Camera and view management.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::frustum::Frustum;

/// Smallest accepted field of view, in radians. Pick cameras go down to a
/// fraction of a degree, so this is far below anything interactive.
pub const MIN_FOV: f32 = 1e-4;

/// Camera projection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    /// Perspective projection.
    #[default]
    Perspective,
    /// Orthographic projection.
    Orthographic,
}

/// A 3D camera for viewing the scene.
///
/// Projections use wgpu clip space: right-handed, NDC depth in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Projection mode.
    pub projection_mode: ProjectionMode,
    /// Orthographic half-height (used when `projection_mode` is Orthographic).
    pub ortho_scale: f32,
}

impl Camera {
    /// Creates a new camera with default settings.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
            projection_mode: ProjectionMode::Perspective,
            ortho_scale: 1.0,
        }
    }

    /// Places the camera at `eye` looking towards `at`.
    ///
    /// If `up` is (nearly) parallel to the view direction another world axis
    /// is used so the view matrix stays well defined.
    pub fn look_at(&mut self, eye: Vec3, at: Vec3, up: Vec3) {
        let dir = (at - eye).normalize_or_zero();
        let up = up.normalize_or_zero();
        self.up = if dir.cross(up).length_squared() > 1e-6 {
            up
        } else if dir.cross(Vec3::Z).length_squared() > 1e-6 {
            Vec3::Z
        } else {
            Vec3::X
        };
        self.position = eye;
        self.target = at;
    }

    /// Sets the aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection_mode {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_height = self.ortho_scale;
                let half_width = half_height * self.aspect_ratio;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the view frustum in world space.
    #[must_use]
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Un-projects a viewport position onto a depth plane.
    ///
    /// `cursor` is in pixels with the origin at the top-left of a viewport of
    /// size `viewport`; `ndc_depth` is 0 for the near plane and 1 for the far
    /// plane. Returns `None` when the viewport is empty or the camera state is
    /// degenerate.
    #[must_use]
    pub fn viewport_to_world(&self, cursor: Vec2, viewport: Vec2, ndc_depth: f32) -> Option<Vec3> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let ndc_x = (cursor.x / viewport.x) * 2.0 - 1.0;
        let ndc_y = 1.0 - (cursor.y / viewport.y) * 2.0;

        let inv_view_proj = self.view_projection_matrix().inverse();
        let clip = inv_view_proj * Vec4::new(ndc_x, ndc_y, ndc_depth, 1.0);
        if !clip.is_finite() || clip.w.abs() < 1e-6 {
            return None;
        }
        let world = clip.truncate() / clip.w;
        world.is_finite().then_some(world)
    }

    /// Projects a world point to viewport pixels (origin top-left).
    ///
    /// Returns `None` for points behind the camera.
    #[must_use]
    pub fn world_to_viewport(&self, point: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * point.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        ))
    }

    /// Sets the projection mode.
    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.projection_mode = mode;
    }

    /// Sets the orthographic scale.
    pub fn set_ortho_scale(&mut self, scale: f32) {
        self.ortho_scale = scale.max(0.01);
    }

    /// Sets the field of view in radians.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov.clamp(MIN_FOV, std::f32::consts::PI - 0.1);
    }

    /// Sets the near clipping plane.
    pub fn set_near(&mut self, near: f32) {
        self.near = near.max(0.001);
    }

    /// Sets the far clipping plane.
    pub fn set_far(&mut self, far: f32) {
        self.far = far.max(self.near + 0.1);
    }

    /// Returns FOV in degrees.
    #[must_use]
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    /// Sets FOV from degrees.
    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.set_fov(degrees.to_radians());
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
