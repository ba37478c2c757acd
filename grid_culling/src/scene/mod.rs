//! Scene module
//!
//! Grid-to-world mapping, the quadtree over the grid, draw dispatch, the
//! visibility strategies and the `Scene` that drives them every frame.

mod aabb;
mod drawer;
mod grid;
pub mod quadtree;
mod scene;
pub mod strategy;

pub use aabb::AABB;
pub use drawer::{GridDrawer, SceneObject};
pub use grid::{Grid, GridPosition};
pub use quadtree::{NodeIndex, Quadtree, QuadtreeNode, MAX_DEPTH, ROOT};
pub use scene::Scene;
pub use strategy::{
    ChcStrategy, FrameContext, FrameStats, FrameView, FrustumStrategy, PipelinedStrategy,
    StopAndWaitStrategy, StrategySet, UnculledStrategy, VisibilityStrategy,
};
