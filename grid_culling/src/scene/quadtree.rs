/// Quadtree: complete 4-ary hierarchy over the grid, stored flat.
///
/// Layout is breadth-first in a single array of `(4^(D+1) - 1) / 3` nodes:
/// - root at index 0
/// - children of node `i` at `4i+1 ..= 4i+4`
/// - parent of node `i` at `(i - 1) / 4`
///
/// Every node exists regardless of what it covers (static tree). Only the
/// `visible` and `last_visited_frame` fields change after construction; they
/// carry the hierarchical visibility cache from one traversal to the next.
///
/// Quadrant bit layout for child `4i + 1 + q`: bit0 = +i (X), bit1 = +j (-Z).

use std::ops::Range;
use glam::Vec3;
use crate::error::{Error, Result};
use super::aabb::AABB;
use super::grid::{Grid, GridPosition};

/// Index of a node in the flat array.
pub type NodeIndex = usize;

/// Index of the root node in the flat node array.
pub const ROOT: NodeIndex = 0;

/// Deepest tree accepted by `from_grid` (a 4096 x 4096 grid).
pub const MAX_DEPTH: u32 = 12;

/// A single node of the quadtree.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadtreeNode {
    /// World-space bounds of the whole subtree
    pub aabb: AABB,
    /// Grid cell represented by this node (leaves only; the subtree's first
    /// cell for internal nodes)
    pub grid_position: GridPosition,
    /// Confirmed visible by the last traversal that reached this node
    pub visible: bool,
    /// Frame counter of the last traversal that reached this node (0 = never)
    pub last_visited_frame: u64,
}

impl Default for QuadtreeNode {
    fn default() -> Self {
        Self {
            aabb: AABB::UNIT,
            grid_position: GridPosition::default(),
            visible: false,
            last_visited_frame: 0,
        }
    }
}

/// Static complete quadtree.
#[derive(Debug, Clone)]
pub struct Quadtree {
    nodes: Vec<QuadtreeNode>,
    max_depth: u32,
}

impl Quadtree {
    /// Build a tree by equal subdivision of `root_aabb` in X/Z.
    ///
    /// Leaves sit at `max_depth` and map to cell (i, j) of a `2^max_depth`
    /// grid laid out along +X and -Z from the root box's (min.x, max.z)
    /// corner. Height is inherited unchanged at every level.
    pub fn build(root_aabb: AABB, max_depth: u32) -> Self {
        let cells = (1u32 << max_depth) as f32;
        let cell_width = (root_aabb.max.x - root_aabb.min.x) / cells;
        let cell_depth = (root_aabb.max.z - root_aabb.min.z) / cells;

        Self::build_with(max_depth, |first: GridPosition, span: u32| {
            let x0 = root_aabb.min.x + first.i as f32 * cell_width;
            let z1 = root_aabb.max.z - first.j as f32 * cell_depth;
            AABB {
                min: Vec3::new(x0, root_aabb.min.y, z1 - span as f32 * cell_depth),
                max: Vec3::new(x0 + span as f32 * cell_width, root_aabb.max.y, z1),
            }
        })
    }

    /// Build the tree matching a grid: every leaf holds the world box of
    /// exactly one cell, every internal node the union of its cells.
    ///
    /// The grid size must be a power of two (depth = log2(size)).
    pub fn from_grid(grid: &Grid) -> Result<Self> {
        let size = grid.size();
        if size == 0 || !size.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "grid size {} is not a power of two", size
            )));
        }
        let max_depth = size.trailing_zeros();
        if max_depth > MAX_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "grid size {} exceeds the deepest supported quadtree ({} levels)",
                size, MAX_DEPTH
            )));
        }

        // Cells are pure translations of one box, so a block's bounds are
        // spanned by its first and last cell.
        Ok(Self::build_with(max_depth, |first: GridPosition, span: u32| {
            let last = GridPosition::new(first.i + span as i32 - 1, first.j + span as i32 - 1);
            grid.cell_aabb(first).union(&grid.cell_aabb(last))
        }))
    }

    /// Total number of nodes for a given depth: (4^(d+1) - 1) / 3
    pub fn node_count_for_depth(max_depth: u32) -> usize {
        let mut count = 0usize;
        let mut level_count = 1usize;
        for _ in 0..=max_depth {
            count += level_count;
            level_count *= 4;
        }
        count
    }

    /// Fill the flat array top-down. `region_aabb(first, span)` returns the
    /// bounds of the `span x span` block of cells starting at `first`.
    fn build_with(max_depth: u32, region_aabb: impl Fn(GridPosition, u32) -> AABB) -> Self {
        let total_nodes = Self::node_count_for_depth(max_depth);
        let mut nodes = vec![QuadtreeNode::default(); total_nodes];

        // (node, first cell, span in cells)
        let mut pending = vec![(ROOT, GridPosition::new(0, 0), 1u32 << max_depth)];
        while let Some((index, first, span)) = pending.pop() {
            nodes[index].aabb = region_aabb(first, span);
            nodes[index].grid_position = first;

            let first_child = 4 * index + 1;
            if first_child >= total_nodes {
                continue;
            }

            let half = (span / 2) as i32;
            for quadrant in 0..4usize {
                let child_first = GridPosition::new(
                    first.i + if quadrant & 1 == 0 { 0 } else { half },
                    first.j + if quadrant & 2 == 0 { 0 } else { half },
                );
                pending.push((first_child + quadrant, child_first, span / 2));
            }
        }

        Self { nodes, max_depth }
    }

    // ===== INDEX ARITHMETIC =====

    /// Root node index
    pub const fn root(&self) -> NodeIndex {
        ROOT
    }

    /// Number of nodes in the flat array
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth of the leaves (root = 0)
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Whether `index` has no children
    pub fn is_leaf(&self, index: NodeIndex) -> bool {
        4 * index + 1 >= self.nodes.len()
    }

    /// Whether `index` has a parent (every node except the root)
    pub fn has_parent(&self, index: NodeIndex) -> bool {
        index != ROOT
    }

    /// Parent index, `None` for the root
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        if self.has_parent(index) {
            Some((index - 1) / 4)
        } else {
            None
        }
    }

    /// Indices of the four children (empty range for a leaf)
    pub fn children(&self, index: NodeIndex) -> Range<NodeIndex> {
        if self.is_leaf(index) {
            0..0
        } else {
            4 * index + 1..4 * index + 5
        }
    }

    /// Indices of every leaf (the last level of the array)
    pub fn leaves(&self) -> Range<NodeIndex> {
        let first_leaf = match self.max_depth {
            0 => ROOT,
            depth => Self::node_count_for_depth(depth - 1),
        };
        first_leaf..self.nodes.len()
    }

    // ===== NODE ACCESS =====

    pub fn node(&self, index: NodeIndex) -> &QuadtreeNode {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut QuadtreeNode {
        &mut self.nodes[index]
    }

    pub fn nodes(&self) -> &[QuadtreeNode] {
        &self.nodes
    }

    // ===== VISIBILITY CACHE =====

    /// Whether the node was reached and confirmed visible in the frame
    /// immediately before `frame`.
    pub fn was_visible(&self, index: NodeIndex, frame: u64) -> bool {
        let node = &self.nodes[index];
        node.visible && node.last_visited_frame + 1 == frame
    }

    /// Stamp a node as reached in `frame` and clear its visibility until a
    /// query confirms it again.
    pub fn visit(&mut self, index: NodeIndex, frame: u64) {
        let node = &mut self.nodes[index];
        node.last_visited_frame = frame;
        node.visible = false;
    }

    /// Mark a node and its ancestors visible.
    ///
    /// Walks toward the root and stops at the first node already marked, so
    /// re-marking a visible node touches nothing. Returns the number of
    /// nodes newly marked.
    pub fn pull_up(&mut self, index: NodeIndex) -> usize {
        let mut marked = 0;
        let mut current = Some(index);
        while let Some(i) = current {
            if self.nodes[i].visible {
                break;
            }
            self.nodes[i].visible = true;
            marked += 1;
            current = self.parent(i);
        }
        marked
    }

    /// Forget all cached visibility (next traversal starts cold).
    pub fn clear_visibility(&mut self) {
        for node in &mut self.nodes {
            node.visible = false;
            node.last_visited_frame = 0;
        }
    }
}

#[cfg(test)]
#[path = "quadtree_tests.rs"]
mod tests;
