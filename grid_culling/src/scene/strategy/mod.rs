//! Visibility strategies.
//!
//! A strategy decides, once per frame, which cells get their real geometry
//! drawn. It sees the frame through a `FrameContext`: the renderer, the draw
//! dispatcher, the shared query pool, the frustum and camera position read
//! at the top of the frame, and the per-frame bookkeeping (already-rendered
//! cells, counters).
//!
//! Strategies keep their cross-frame state (PVS, quadtree cache) across
//! switches; `flush` resolves anything still in flight before another
//! strategy reuses the pool, `abandon` drops it after a failed frame.

mod chc;
mod frustum;
mod pipelined;
mod stop_and_wait;
mod unculled;

pub use chc::ChcStrategy;
pub use frustum::FrustumStrategy;
pub use pipelined::PipelinedStrategy;
pub use stop_and_wait::StopAndWaitStrategy;
pub use unculled::UnculledStrategy;

use glam::Vec3;
use crate::camera::Frustum;
use crate::config::StrategyKind;
use crate::error::Result;
use crate::renderer::{OcclusionQuery, QueryPool, Renderer};
use super::aabb::AABB;
use super::drawer::GridDrawer;
use super::grid::{Grid, GridPosition};
use super::quadtree::Quadtree;

/// Per-frame counters, reported by `Scene::render`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Cells whose real geometry was drawn
    pub drawn: usize,
    /// Occlusion queries begun
    pub queries_issued: usize,
    /// Blocking result reads
    pub blocking_waits: usize,
}

/// Camera-dependent inputs read once at the top of a frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView {
    pub frustum: Frustum,
    pub camera_position: Vec3,
    /// Frame counter (starts at 1)
    pub frame: u64,
    /// Frustum pre-filter for the occlusion strategies that make it optional
    pub frustum_culling: bool,
}

/// Everything a strategy may touch during one frame.
pub struct FrameContext<'a> {
    renderer: &'a mut dyn Renderer,
    drawer: &'a GridDrawer,
    pool: &'a mut QueryPool,
    /// Already-rendered flag per cell, indexed by `Grid::index_of`
    rendered: &'a mut [bool],
    view: FrameView,
    stats: FrameStats,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        renderer: &'a mut dyn Renderer,
        drawer: &'a GridDrawer,
        pool: &'a mut QueryPool,
        rendered: &'a mut [bool],
        view: FrameView,
    ) -> Self {
        debug_assert_eq!(rendered.len(), drawer.grid().cell_count());
        Self { renderer, drawer, pool, rendered, view, stats: FrameStats::default() }
    }

    // ===== FRAME INPUTS =====

    pub fn grid(&self) -> &'a Grid {
        let drawer: &'a GridDrawer = self.drawer;
        drawer.grid()
    }

    pub fn frame(&self) -> u64 {
        self.view.frame
    }

    pub fn camera_position(&self) -> Vec3 {
        self.view.camera_position
    }

    pub fn frustum(&self) -> &Frustum {
        &self.view.frustum
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Conservative frustum test of a cell's box
    pub fn in_frustum(&self, pos: GridPosition) -> bool {
        self.view.frustum.intersects_aabb(&self.grid().cell_aabb(pos))
    }

    /// Whether an optionally-filtered strategy should consider the cell
    pub fn is_candidate(&self, pos: GridPosition) -> bool {
        !self.view.frustum_culling || self.in_frustum(pos)
    }

    /// Cells passing `is_candidate`, nearest first (ties by grid index)
    pub fn candidates_front_to_back(&self) -> Vec<GridPosition> {
        let grid = self.grid();
        let camera = self.camera_position();
        let mut keyed: Vec<(f32, usize, GridPosition)> = grid.positions()
            .filter(|&pos| self.is_candidate(pos))
            .map(|pos| (Grid::distance_to(pos, camera), grid.index_of(pos), pos))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        keyed.into_iter().map(|(_, _, pos)| pos).collect()
    }

    // ===== DRAWS =====

    pub fn is_rendered(&self, pos: GridPosition) -> bool {
        self.rendered[self.grid().index_of(pos)]
    }

    /// Draw a cell's real geometry unless it was already drawn this frame.
    /// Returns whether a draw was issued.
    pub fn draw_cell(&mut self, pos: GridPosition) -> Result<bool> {
        let drawn = self.draw_object(pos)?;
        if drawn {
            self.drawer.draw_bounds(self.renderer, pos)?;
        }
        Ok(drawn)
    }

    /// `draw_cell` without the debug bounds
    fn draw_object(&mut self, pos: GridPosition) -> Result<bool> {
        let index = self.grid().index_of(pos);
        if self.rendered[index] {
            return Ok(false);
        }
        self.drawer.draw_cell(self.renderer, pos)?;
        self.rendered[index] = true;
        self.stats.drawn += 1;
        Ok(true)
    }

    // ===== QUERIES =====

    /// Query bracketing a probe draw of `aabb`
    pub fn query_proxy<T>(&mut self, aabb: &AABB, tag: T) -> Result<OcclusionQuery<T>> {
        let query = self.pool.acquire(tag)?;
        self.bracketed(&query, |ctx| ctx.drawer.draw_proxy(ctx.renderer, aabb))?;
        self.stats.queries_issued += 1;
        Ok(query)
    }

    /// Query bracketing the real draw of a cell (confirmation of a cell
    /// believed visible). Falls back to the cell's proxy if the cell was
    /// already drawn this frame. Debug bounds follow the bracket.
    pub fn query_drawn_cell<T>(&mut self, pos: GridPosition, tag: T) -> Result<OcclusionQuery<T>> {
        let query = self.pool.acquire(tag)?;
        let drawn = self.bracketed(&query, |ctx| {
            let drawn = ctx.draw_object(pos)?;
            if !drawn {
                ctx.drawer.draw_cell_proxy(ctx.renderer, pos)?;
            }
            Ok(drawn)
        })?;
        self.stats.queries_issued += 1;
        if drawn {
            self.drawer.draw_bounds(self.renderer, pos)?;
        }
        Ok(query)
    }

    /// Run `draw` between `begin` and `end` of `query`. The query is ended
    /// even if `draw` fails, and the draw error wins over an `end` error.
    fn bracketed<T, R>(
        &mut self,
        query: &OcclusionQuery<T>,
        draw: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        query.begin(self.renderer)?;
        let drawn = draw(&mut *self);
        let ended = query.end(self.renderer);
        let value = drawn?;
        ended?;
        Ok(value)
    }

    /// Non-blocking read of a query result
    pub fn poll<T>(&mut self, query: &OcclusionQuery<T>) -> Result<Option<bool>> {
        query.poll(self.renderer)
    }

    /// Blocking read of a query result
    pub fn wait<T>(&mut self, query: &OcclusionQuery<T>) -> Result<bool> {
        self.stats.blocking_waits += 1;
        query.blocking_get(self.renderer)
    }
}

/// One selectable visibility algorithm.
pub trait VisibilityStrategy: Send {
    fn kind(&self) -> StrategyKind;

    /// Draw this frame's visible cells
    fn render(&mut self, ctx: &mut FrameContext<'_>) -> Result<()>;

    /// Resolve queries kept in flight across frames (before another
    /// strategy reuses the pool)
    fn flush(&mut self, _renderer: &mut dyn Renderer) -> Result<()> {
        Ok(())
    }

    /// Drop all cross-frame state after a failed frame
    fn abandon(&mut self) {}
}

/// One instance of every strategy, so switching keeps their state.
pub struct StrategySet {
    unculled: UnculledStrategy,
    frustum: FrustumStrategy,
    stop_and_wait: StopAndWaitStrategy,
    pipelined: PipelinedStrategy,
    chc: ChcStrategy,
}

impl StrategySet {
    pub fn new(quadtree: Quadtree) -> Self {
        Self {
            unculled: UnculledStrategy::new(),
            frustum: FrustumStrategy::new(),
            stop_and_wait: StopAndWaitStrategy::new(),
            pipelined: PipelinedStrategy::new(),
            chc: ChcStrategy::new(quadtree),
        }
    }

    pub fn get_mut(&mut self, kind: StrategyKind) -> &mut dyn VisibilityStrategy {
        match kind {
            StrategyKind::Unculled => &mut self.unculled,
            StrategyKind::Frustum => &mut self.frustum,
            StrategyKind::StopAndWait => &mut self.stop_and_wait,
            StrategyKind::Pipelined => &mut self.pipelined,
            StrategyKind::Chc => &mut self.chc,
        }
    }

    pub fn pipelined(&self) -> &PipelinedStrategy {
        &self.pipelined
    }

    pub fn chc(&self) -> &ChcStrategy {
        &self.chc
    }
}


#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
