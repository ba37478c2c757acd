/// Draw dispatch.
///
/// Turns grid cells and quadtree node boxes into renderer draws: the real
/// object in a cell, its proxy box for an occlusion query, the optional
/// wireframe bounds, and the floor.

use crate::error::Result;
use crate::renderer::{DrawMode, MeshHandle, Renderer};
use super::aabb::AABB;
use super::grid::{Grid, GridPosition};

/// The object instanced in every cell, as supplied by the geometry loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    /// Full-detail mesh
    pub mesh: MeshHandle,
    /// Unit cube spanning [0, 1]^3, placed with `AABB::proxy_matrix`
    pub proxy_mesh: MeshHandle,
    /// Bounds of `mesh` in local space
    pub bounds: AABB,
}

/// Issues every draw the strategies ask for.
///
/// `&self` because drawing is stateless: the per-frame bookkeeping
/// (already-rendered cells, counters) lives in the frame context.
#[derive(Debug, Clone)]
pub struct GridDrawer {
    grid: Grid,
    object: SceneObject,
    floor_mesh: Option<MeshHandle>,
    debug_bounds: bool,
}

impl GridDrawer {
    pub fn new(grid_size: u32, object: SceneObject) -> Self {
        Self {
            grid: Grid::new(grid_size, object.bounds),
            object,
            floor_mesh: None,
            debug_bounds: false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn object(&self) -> &SceneObject {
        &self.object
    }

    /// Mesh drawn under the grid (unit quad in the XY plane)
    pub fn set_floor_mesh(&mut self, mesh: Option<MeshHandle>) {
        self.floor_mesh = mesh;
    }

    pub fn set_debug_bounds(&mut self, enabled: bool) {
        self.debug_bounds = enabled;
    }

    pub fn debug_bounds(&self) -> bool {
        self.debug_bounds
    }

    /// Draw the object in a cell
    pub fn draw_cell(&self, renderer: &mut dyn Renderer, pos: GridPosition) -> Result<()> {
        renderer.draw(self.object.mesh, &Grid::model_matrix(pos), DrawMode::Shaded)
    }

    /// Wireframe bounds of a cell, in debug mode only.
    ///
    /// Must not be issued inside an occlusion query: the lines would count
    /// as visible samples of the cell.
    pub fn draw_bounds(&self, renderer: &mut dyn Renderer, pos: GridPosition) -> Result<()> {
        if self.debug_bounds {
            let bounds = self.grid.cell_aabb(pos).proxy_matrix();
            renderer.draw(self.object.proxy_mesh, &bounds, DrawMode::Wireframe)?;
        }
        Ok(())
    }

    /// Probe draw of a cell's box
    pub fn draw_cell_proxy(&self, renderer: &mut dyn Renderer, pos: GridPosition) -> Result<()> {
        self.draw_proxy(renderer, &self.grid.cell_aabb(pos))
    }

    /// Probe draw of an arbitrary world box (quadtree node)
    pub fn draw_proxy(&self, renderer: &mut dyn Renderer, aabb: &AABB) -> Result<()> {
        renderer.draw(self.object.proxy_mesh, &aabb.proxy_matrix(), DrawMode::Probe)
    }

    /// Draw the floor, if a floor mesh is set
    pub fn draw_floor(&self, renderer: &mut dyn Renderer) -> Result<()> {
        if let Some(mesh) = self.floor_mesh {
            renderer.draw(mesh, &self.grid.floor_matrix(), DrawMode::Shaded)?;
        }
        Ok(())
    }
}
