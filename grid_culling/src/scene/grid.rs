/// Grid: mapping from integer cell coordinates to world space.
///
/// Every cell holds one instance of the scene object. Cell (i, j) sits at
/// world position (i, 0, -j) with unit spacing, so the grid extends along
/// +X and -Z from the origin.

use std::hash::{Hash, Hasher};
use glam::{Mat4, Vec3};
use super::aabb::AABB;

/// Integer coordinate of one grid cell.
///
/// Used as a set key (PVS, already-rendered bookkeeping), so equality and
/// hashing are spelled out over the two components.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridPosition {
    pub i: i32,
    pub j: i32,
}

impl GridPosition {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }
}

impl PartialEq for GridPosition {
    fn eq(&self, other: &Self) -> bool {
        self.i == other.i && self.j == other.j
    }
}

impl Eq for GridPosition {}

impl Hash for GridPosition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.i);
        state.write_i32(self.j);
    }
}

/// An n x n grid of instances of one object.
#[derive(Debug, Clone)]
pub struct Grid {
    size: u32,
    /// Object bounds in local space
    object_bounds: AABB,
}

impl Grid {
    pub fn new(size: u32, object_bounds: AABB) -> Self {
        Self { size, object_bounds }
    }

    /// Cells per side
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Total number of cells (n * n)
    pub fn cell_count(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }

    /// Object bounds in local space
    pub fn object_bounds(&self) -> &AABB {
        &self.object_bounds
    }

    /// Whether a coordinate lies inside the grid
    pub fn contains(&self, pos: GridPosition) -> bool {
        let n = self.size as i32;
        (0..n).contains(&pos.i) && (0..n).contains(&pos.j)
    }

    /// Dense index of a cell (`i * n + j`), used for per-cell flags and as
    /// the deterministic tie-breaker when sorting by distance.
    pub fn index_of(&self, pos: GridPosition) -> usize {
        debug_assert!(self.contains(pos), "{:?} outside a {}x{} grid", pos, self.size, self.size);
        pos.i as usize * self.size as usize + pos.j as usize
    }

    /// Inverse of `index_of`
    pub fn position_at(&self, index: usize) -> GridPosition {
        let n = self.size as usize;
        GridPosition::new((index / n) as i32, (index % n) as i32)
    }

    /// All cells, `i` major (index order)
    pub fn positions(&self) -> impl Iterator<Item = GridPosition> + '_ {
        (0..self.cell_count()).map(|index| self.position_at(index))
    }

    /// World placement of a cell: (i, 0, -j)
    pub fn world_position(pos: GridPosition) -> Vec3 {
        Vec3::new(pos.i as f32, 0.0, -(pos.j as f32))
    }

    /// Model matrix of the object instance in a cell
    pub fn model_matrix(pos: GridPosition) -> Mat4 {
        Mat4::from_translation(Self::world_position(pos))
    }

    /// World-space bounds of the instance in a cell
    pub fn cell_aabb(&self, pos: GridPosition) -> AABB {
        self.object_bounds.translated(Self::world_position(pos))
    }

    /// Bounds of the whole grid (union of every cell's box)
    pub fn world_aabb(&self) -> AABB {
        let last = self.size.saturating_sub(1) as i32;
        let near_corner = self.cell_aabb(GridPosition::new(0, 0));
        let far_corner = self.cell_aabb(GridPosition::new(last, last));
        near_corner.union(&far_corner)
    }

    /// Distance from a cell's world position to the camera
    pub fn distance_to(pos: GridPosition, camera_position: Vec3) -> f32 {
        Self::world_position(pos).distance(camera_position)
    }

    /// Model matrix of the floor quad under the grid.
    ///
    /// The floor mesh is a unit quad in the XY plane centered on the origin;
    /// it is laid flat, scaled to n and centered under the cells half a unit
    /// below the objects' origin.
    pub fn floor_matrix(&self) -> Mat4 {
        let n = self.size as f32;
        Mat4::from_translation(Vec3::new(n / 2.0 - 0.5, -0.5, -n / 2.0 + 0.5))
            * Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2)
            * Mat4::from_scale(Vec3::splat(n))
    }
}
