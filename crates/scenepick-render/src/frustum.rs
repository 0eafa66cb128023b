//! View frustum and bounding-volume tests.

use glam::{Mat4, Vec3, Vec4};

/// Axis-aligned box in an object's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from two corners.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Smallest box containing every point, or `None` for no points.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// The eight corners.
    #[must_use]
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }
}

/// Index of each plane in [`Frustum::planes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumPlane {
    Left = 0,
    Right = 1,
    Bottom = 2,
    Top = 3,
    Near = 4,
    Far = 5,
}

/// A plane `normal · p + d = 0` with the normal pointing inside the frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    fn from_coefficients(v: Vec4) -> Self {
        let len = v.truncate().length();
        if len > 0.0 {
            Self {
                normal: v.truncate() / len,
                d: v.w / len,
            }
        } else {
            Self {
                normal: Vec3::ZERO,
                d: v.w,
            }
        }
    }

    /// Signed distance, positive on the inside.
    #[must_use]
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }
}

/// Six inward-facing planes bounding a camera's visible volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the planes from a view-projection matrix with `[0, 1]` depth.
    #[must_use]
    pub fn from_view_projection(m: &Mat4) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);
        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// One of the six planes.
    #[must_use]
    pub fn plane(&self, which: FrustumPlane) -> &Plane {
        &self.planes[which as usize]
    }

    /// Whether a world point lies inside.
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance(point) >= 0.0)
    }

    /// Conservative test of an oriented box: `bounds` in local space placed by
    /// `world`. Returns `false` only if the box is entirely outside one plane.
    #[must_use]
    pub fn test_obb(&self, bounds: &Aabb, world: &Mat4) -> bool {
        let corners = bounds.corners().map(|c| world.transform_point3(c));
        self.planes
            .iter()
            .all(|plane| corners.iter().any(|&c| plane.distance(c) >= 0.0))
    }
}
