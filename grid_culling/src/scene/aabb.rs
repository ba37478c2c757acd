/// Axis-aligned bounding boxes for grid cells and quadtree nodes.

use glam::{Mat4, Vec3};

/// Axis-Aligned Bounding Box
///
/// Object bounds are stored in local space and moved to a grid cell
/// with `translated` at test/draw time; the stored box is never mutated.
/// Invariant: `min <= max` component-wise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Create a box from two corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(min.cmple(max).all(), "AABB min {:?} exceeds max {:?}", min, max);
        Self { min, max }
    }

    /// Unit cube spanning [0, 1] on every axis (the proxy mesh bounds).
    pub const UNIT: AABB = AABB { min: Vec3::ZERO, max: Vec3::ONE };

    /// Box moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> AABB {
        AABB { min: self.min + offset, max: self.max + offset }
    }

    /// Smallest box enclosing both.
    pub fn union(&self, other: &AABB) -> AABB {
        AABB { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// Center point.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners, bit 0 = X, bit 1 = Y, bit 2 = Z (0 = min, 1 = max).
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
        }
        corners
    }

    /// Test if this AABB fully contains another AABB.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Model matrix placing the unit-cube proxy mesh over this box.
    ///
    /// `translate(min) * scale(max - min)`: the proxy mesh spans [0, 1]^3.
    pub fn proxy_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.min) * Mat4::from_scale(self.extent())
    }
}
