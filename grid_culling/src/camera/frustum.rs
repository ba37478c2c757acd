/// Frustum: six world-space half-spaces for conservative box culling.
///
/// A plane `(n, d)` keeps the points with `n . p + d >= 0`; normals point
/// into the view volume and have unit length once built.
///
/// The camera rebuilds its frustum whenever its view or projection changes,
/// and the scene reads it once per frame.

use glam::{Mat4, Vec3, Vec4};
use crate::scene::AABB;

/// Outcome of testing a box against every plane.
///
/// CHC classifies each node once: an `Inside` node passes that verdict down
/// so its subtree is never tested again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// Every corner is behind one of the planes
    Outside,
    /// Every corner is in front of every plane
    Inside,
    /// Neither: straddles at least one plane (or sits near an edge)
    Partial,
}

pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Clip-space row and sign combined with row 3 for each plane, in
/// `PLANE_*` order.
const CLIP_ROWS: [(usize, f32); 6] = [
    (0, 1.0), (0, -1.0),
    (1, 1.0), (1, -1.0),
    (2, 1.0), (2, -1.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Indexed by the `PLANE_*` constants
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Wrap six inward-facing planes, rescaling each to a unit normal.
    /// A plane with a zero normal is left untouched.
    pub fn from_planes(planes: [Vec4; 6]) -> Self {
        Self {
            planes: planes.map(|plane| {
                let scale = plane.truncate().length();
                if scale > 0.0 { plane / scale } else { plane }
            }),
        }
    }

    /// Planes of the clip volume of `view_projection` (OpenGL depth range,
    /// `-w <= x, y, z <= w`).
    pub fn from_view_projection(view_projection: &Mat4) -> Self {
        let w_row = view_projection.row(3);
        Self::from_planes(CLIP_ROWS.map(|(row, sign)| w_row + view_projection.row(row) * sign))
    }

    /// False if a degenerate projection left NaN or infinite coefficients
    pub fn is_finite(&self) -> bool {
        self.planes.iter().all(|plane| plane.is_finite())
    }

    /// Signed distance of `point` to plane `plane` (positive in front).
    pub fn signed_distance(&self, plane: usize, point: Vec3) -> f32 {
        self.planes[plane].dot(point.extend(1.0))
    }

    /// Whether `aabb` is not provably outside.
    ///
    /// The box is rejected only if its eight corners are all behind the same
    /// plane, so boxes near the frustum's edges may be kept although
    /// invisible; a box reaching into the volume is never rejected.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| {
            let (_, farthest) = extreme_corners(plane, aabb);
            plane.dot(farthest.extend(1.0)) >= 0.0
        })
    }

    /// Three-way version of `intersects_aabb`.
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        let mut result = FrustumTest::Inside;
        for plane in &self.planes {
            let (nearest, farthest) = extreme_corners(plane, aabb);
            if plane.dot(farthest.extend(1.0)) < 0.0 {
                return FrustumTest::Outside;
            }
            if plane.dot(nearest.extend(1.0)) < 0.0 {
                result = FrustumTest::Partial;
            }
        }
        result
    }
}

/// Corners of `aabb` with the lowest and highest signed distance to `plane`.
/// If the highest one is behind the plane, all eight are.
fn extreme_corners(plane: &Vec4, aabb: &AABB) -> (Vec3, Vec3) {
    let along_normal = plane.truncate().cmpge(Vec3::ZERO);
    (
        Vec3::select(along_normal, aabb.min, aabb.max),
        Vec3::select(along_normal, aabb.max, aabb.min),
    )
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
