/// Culling configuration and strategy selection

use std::fmt;
use crate::error::{Error, Result};
use crate::scene::quadtree::MAX_DEPTH;

/// Visibility algorithm run by the scene each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrategyKind {
    /// Draw every cell
    #[default]
    Unculled,
    /// Draw cells whose box passes the frustum test
    Frustum,
    /// One blocking occlusion query per cell
    StopAndWait,
    /// Front-to-back traversal reusing last frame's visible set
    Pipelined,
    /// Coherent hierarchical culling over the quadtree
    Chc,
}

impl StrategyKind {
    /// Every strategy, in selector order
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Unculled,
        StrategyKind::Frustum,
        StrategyKind::StopAndWait,
        StrategyKind::Pipelined,
        StrategyKind::Chc,
    ];

    /// Whether the strategy issues occlusion queries
    pub fn uses_queries(&self) -> bool {
        matches!(self, StrategyKind::StopAndWait | StrategyKind::Pipelined | StrategyKind::Chc)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Unculled => write!(f, "Unculled"),
            StrategyKind::Frustum => write!(f, "Frustum culling"),
            StrategyKind::StopAndWait => write!(f, "Stop-and-wait occlusion culling"),
            StrategyKind::Pipelined => write!(f, "Pipelined occlusion culling"),
            StrategyKind::Chc => write!(f, "Coherent hierarchical culling"),
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CullingConfig {
    /// Cells per grid side (power of two)
    pub grid_size: u32,
    /// Strategy used from the first frame
    pub strategy: StrategyKind,
    /// Frustum pre-filter for the stop-and-wait and pipelined strategies
    pub frustum_culling: bool,
    /// Also draw the wireframe bounds of every drawn cell
    pub debug_bounds: bool,
    /// Draw the floor quad under the grid
    pub draw_floor: bool,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            grid_size: 16,
            strategy: StrategyKind::Unculled,
            frustum_culling: false,
            debug_bounds: false,
            draw_floor: true,
        }
    }
}

impl CullingConfig {
    /// Check the grid can be covered by a complete quadtree
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 || !self.grid_size.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "grid_size must be a positive power of two, got {}", self.grid_size
            )));
        }
        if self.grid_size.trailing_zeros() > MAX_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "grid_size {} exceeds the maximum of {}", self.grid_size, 1u32 << MAX_DEPTH
            )));
        }
        Ok(())
    }
}
