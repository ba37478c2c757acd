/// Scene: the per-frame driver.
///
/// Owns the grid drawer, the query pool, one instance of every strategy and
/// the camera. Each `render` reads the strategy selection and the camera
/// once, runs the active strategy in a fresh frame context, and falls back
/// to drawing everything if the strategy fails.
///
/// The renderer is borrowed per call rather than owned, so the same scene
/// can be driven by a real backend or by `MockRenderer` in tests.

use std::time::Duration;
use rustc_hash::FxHashSet;
use crate::camera::{Camera, CameraPath, InputState, PathRecorder};
use crate::config::{CullingConfig, StrategyKind};
use crate::error::Result;
use crate::renderer::{MeshHandle, QueryPool, Renderer};
use crate::stats::{FpsRecorder, FrameRateCounter};
use crate::log::sources;
use crate::{engine_error, engine_info, engine_trace, engine_warn};
use super::drawer::{GridDrawer, SceneObject};
use super::grid::{Grid, GridPosition};
use super::quadtree::Quadtree;
use super::strategy::{
    FrameContext, FrameStats, FrameView, StrategySet, UnculledStrategy, VisibilityStrategy,
};

const SOURCE: &str = sources::SCENE;

/// An `n x n` grid of one object, culled by a selectable strategy.
pub struct Scene {
    config: CullingConfig,
    drawer: GridDrawer,
    /// One query per quadtree node, shared by every strategy
    pool: QueryPool,
    strategies: StrategySet,
    /// Strategy run by the last frame
    active: StrategyKind,
    /// Strategy to run from the next frame on
    requested: StrategyKind,
    camera: Camera,
    /// Already-rendered flag per cell, reset at the top of every frame
    rendered: Vec<bool>,
    /// Frame counter (starts at 1, so 0 means "never visited")
    frame: u64,
    last_stats: FrameStats,
    frame_rate: FrameRateCounter,
    fps_recorder: Option<FpsRecorder>,
    path_recorder: Option<PathRecorder>,
}

impl Scene {
    /// Build the grid, its quadtree and the query pool.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the grid size cannot be covered by a complete
    /// quadtree, or a backend error if the queries cannot be created.
    pub fn new(
        renderer: &mut dyn Renderer,
        object: SceneObject,
        config: CullingConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut drawer = GridDrawer::new(config.grid_size, object);
        drawer.set_debug_bounds(config.debug_bounds);
        let quadtree = Quadtree::from_grid(drawer.grid())?;
        let pool = QueryPool::new(renderer, quadtree.len())?;
        let cell_count = drawer.grid().cell_count();

        engine_info!(SOURCE,
            "scene built: {0}x{0} grid, {1} quadtree nodes, strategy: {2}",
            config.grid_size, quadtree.len(), config.strategy);

        Ok(Self {
            active: config.strategy,
            requested: config.strategy,
            config,
            drawer,
            pool,
            strategies: StrategySet::new(quadtree),
            camera: Camera::free_fly(),
            rendered: vec![false; cell_count],
            frame: 1,
            last_stats: FrameStats::default(),
            frame_rate: FrameRateCounter::new(),
            fps_recorder: None,
            path_recorder: None,
        })
    }

    // ===== FRAME =====

    /// Render one frame and return the number of cells drawn.
    pub fn render(&mut self, renderer: &mut dyn Renderer) -> Result<usize> {
        self.apply_requested_strategy(renderer);

        renderer.set_camera(self.camera.view_matrix(), self.camera.projection_matrix())?;
        if self.config.draw_floor {
            self.drawer.draw_floor(renderer)?;
        }

        self.rendered.fill(false);
        self.pool.reset();
        let view = FrameView {
            frustum: *self.camera.frustum(),
            camera_position: self.camera.position(),
            frame: self.frame,
            frustum_culling: self.config.frustum_culling,
        };

        let mut ctx = FrameContext::new(
            renderer,
            &self.drawer,
            &mut self.pool,
            &mut self.rendered,
            view,
        );
        let strategy = self.strategies.get_mut(self.active);
        if let Err(err) = strategy.render(&mut ctx) {
            engine_error!(SOURCE, "{} failed on frame {}: {}", self.active, self.frame, err);
            engine_warn!(SOURCE, "drawing frame {} unculled", self.frame);
            strategy.abandon();
            UnculledStrategy::new().render(&mut ctx)?;
        }
        let stats = ctx.stats();

        engine_trace!(SOURCE,
            "frame {}: {} drawn, {} queries, {} blocking waits",
            self.frame, stats.drawn, stats.queries_issued, stats.blocking_waits);

        self.last_stats = stats;
        self.frame += 1;
        Ok(stats.drawn)
    }

    /// Switch strategy if one was requested since the last frame. Queries
    /// the old strategy keeps in flight are resolved first, since the pool
    /// is about to be reused; query-free strategies have nothing to flush.
    fn apply_requested_strategy(&mut self, renderer: &mut dyn Renderer) {
        if self.requested == self.active {
            return;
        }
        if self.active.uses_queries() {
            let previous = self.strategies.get_mut(self.active);
            if let Err(err) = previous.flush(renderer) {
                engine_warn!(SOURCE, "discarding the state of {}: {}", self.active, err);
                previous.abandon();
            }
        }
        engine_info!(SOURCE, "strategy: {} -> {}", self.active, self.requested);
        self.active = self.requested;
    }

    /// Advance the camera and the frame-rate bookkeeping by `dt`.
    ///
    /// Mouse motion in `input` is consumed as-is; the caller clears it
    /// (`InputState::take_mouse_delta`) once the frame is done.
    pub fn update(&mut self, dt: Duration, input: &InputState) {
        let fps = self.frame_rate.tick(dt);
        if let Some(recorder) = &mut self.fps_recorder {
            if !recorder.is_finished() && recorder.tick(dt, fps) {
                engine_info!(SOURCE, "fps record complete ({} samples)", recorder.samples().len());
            }
        }

        if !self.camera.update(dt, input) {
            engine_info!(SOURCE, "camera path finished, back to free-fly");
            self.camera = self.camera.to_free_fly();
        }

        if let Some(recorder) = &mut self.path_recorder {
            let state = self.camera.state();
            if !recorder.is_complete()
                && !recorder.record(dt, state.position(), state.look_direction())
            {
                engine_info!(SOURCE,
                    "camera path recorded ({} keyframes)", recorder.keyframe_count());
            }
        }
    }

    // ===== STRATEGY =====

    /// Select the strategy for the next frame.
    pub fn set_strategy(&mut self, kind: StrategyKind) {
        self.requested = kind;
    }

    /// Strategy run by the last frame (a pending switch applies at the next
    /// `render`)
    pub fn strategy(&self) -> StrategyKind {
        self.active
    }

    pub fn requested_strategy(&self) -> StrategyKind {
        self.requested
    }

    pub fn set_frustum_culling(&mut self, enabled: bool) {
        self.config.frustum_culling = enabled;
    }

    pub fn set_debug_bounds(&mut self, enabled: bool) {
        self.config.debug_bounds = enabled;
        self.drawer.set_debug_bounds(enabled);
    }

    pub fn set_floor_mesh(&mut self, mesh: Option<MeshHandle>) {
        self.drawer.set_floor_mesh(mesh);
    }

    pub fn config(&self) -> &CullingConfig {
        &self.config
    }

    // ===== CAMERA =====

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Adapt the projection to a new viewport. Returns `false` (and keeps
    /// the old projection) for a zero-area viewport.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.camera.resize(width, height)
    }

    /// Fly `path` and record the frame rate for its duration.
    pub fn start_replay(&mut self, path: CameraPath) {
        engine_info!(SOURCE,
            "replaying a {} s camera path", path.duration().as_secs());
        self.fps_recorder = Some(FpsRecorder::for_duration(path.duration()));
        self.camera = self.camera.replay(path);
    }

    /// Record `seconds` keyframes of the current flight.
    pub fn start_recording(&mut self, seconds: usize) {
        let state = self.camera.state();
        self.path_recorder = Some(PathRecorder::new(
            seconds, state.position(), state.look_direction(),
        ));
        engine_info!(SOURCE, "recording a {} s camera path", seconds);
    }

    pub fn is_recording(&self) -> bool {
        self.path_recorder.as_ref().is_some_and(|recorder| !recorder.is_complete())
    }

    /// Stop recording and return the path captured so far.
    pub fn take_recorded_path(&mut self) -> Result<Option<CameraPath>> {
        self.path_recorder.take().map(PathRecorder::finish).transpose()
    }

    pub fn fps_record(&self) -> Option<&FpsRecorder> {
        self.fps_recorder.as_ref()
    }

    pub fn take_fps_record(&mut self) -> Option<FpsRecorder> {
        self.fps_recorder.take()
    }

    // ===== INSPECTION =====

    pub fn grid(&self) -> &Grid {
        self.drawer.grid()
    }

    /// Counters of the last rendered frame
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Number of the next frame to render
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frame rate averaged over the last complete window
    pub fn fps(&self) -> f32 {
        self.frame_rate.fps()
    }

    /// Hierarchy used by CHC, with its visibility cache
    pub fn quadtree(&self) -> &Quadtree {
        self.strategies.chc().quadtree()
    }

    /// Visible set kept by the pipelined strategy
    pub fn pvs(&self) -> &FxHashSet<GridPosition> {
        self.strategies.pipelined().pvs()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
