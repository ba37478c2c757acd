/// Mock Renderer for tests (no GPU required)
///
/// Records every call and answers occlusion queries through a visibility
/// oracle evaluated on the world boxes drawn inside each query bracket.
/// Query latency is simulated as a number of non-blocking polls that report
/// "not ready" before the result becomes available; a blocking read of a
/// query that is not ready yet counts as one stall.

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::renderer::{DrawMode, MeshHandle, QueryId, Renderer};
use crate::scene::AABB;
use crate::log::sources;
use crate::{engine_bail, engine_error};

// ============================================================================
// Recorded calls
// ============================================================================

/// One recorded renderer call
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    SetCamera { view: Mat4, projection: Mat4 },
    Draw { mesh: MeshHandle, model: Mat4, mode: DrawMode },
    BeginQuery(QueryId),
    EndQuery(QueryId),
}

/// A recorded draw with its world-space bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockDraw {
    pub mesh: MeshHandle,
    pub mode: DrawMode,
    pub world_aabb: AABB,
    /// Query open while the draw was issued
    pub query: Option<QueryId>,
}

#[derive(Debug, Clone, Default)]
struct MockQuery {
    /// Boxes drawn between begin and end
    boxes: Vec<AABB>,
    /// Set at end_query
    result: Option<bool>,
    /// Polls left before the result is reported available
    polls_remaining: u32,
}

type Oracle = Box<dyn FnMut(&AABB) -> bool + Send>;

// ============================================================================
// MockRenderer
// ============================================================================

pub struct MockRenderer {
    calls: Vec<MockCall>,
    draws: Vec<MockDraw>,
    mesh_bounds: FxHashMap<MeshHandle, AABB>,
    queries: FxHashMap<QueryId, MockQuery>,
    next_query_id: u32,
    open_query: Option<QueryId>,
    oracle: Oracle,
    latency: u32,
    blocking_stalls: usize,
    fail_queries: bool,
    /// Mode and number of upcoming draws to reject
    draw_failures: Option<(DrawMode, usize)>,
}

impl MockRenderer {
    /// Create a mock where every query passes and results are ready at once
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            draws: Vec::new(),
            mesh_bounds: FxHashMap::default(),
            queries: FxHashMap::default(),
            next_query_id: 1,
            open_query: None,
            oracle: Box::new(|_| true),
            latency: 0,
            blocking_stalls: 0,
            fail_queries: false,
            draw_failures: None,
        }
    }

    /// Register the local bounds of a mesh (unregistered meshes are the
    /// unit cube)
    pub fn register_mesh(&mut self, mesh: MeshHandle, bounds: AABB) {
        self.mesh_bounds.insert(mesh, bounds);
    }

    /// Decide query results: a query passes if the oracle accepts any box
    /// drawn inside it
    pub fn set_visibility<F>(&mut self, oracle: F)
    where
        F: FnMut(&AABB) -> bool + Send + 'static,
    {
        self.oracle = Box::new(oracle);
    }

    /// Number of "not ready" polls before each new result becomes available
    pub fn set_latency(&mut self, polls: u32) {
        self.latency = polls;
    }

    /// Make every subsequent `begin_query` fail with a backend error
    pub fn set_query_failure(&mut self, fail: bool) {
        self.fail_queries = fail;
    }

    /// Make the next `count` draws with `mode` fail with a backend error
    pub fn fail_next_draws(&mut self, mode: DrawMode, count: usize) {
        self.draw_failures = (count > 0).then_some((mode, count));
    }

    // ===== INSPECTION =====

    /// Query currently between begin and end
    pub fn open_query(&self) -> Option<QueryId> {
        self.open_query
    }

    pub fn calls(&self) -> &[MockCall] {
        &self.calls
    }

    pub fn draws(&self) -> &[MockDraw] {
        &self.draws
    }

    /// Draws with a given mode
    pub fn draws_with_mode(&self, mode: DrawMode) -> Vec<MockDraw> {
        self.draws.iter().filter(|d| d.mode == mode).copied().collect()
    }

    /// Number of draws with a given mode
    pub fn draw_count(&self, mode: DrawMode) -> usize {
        self.draws.iter().filter(|d| d.mode == mode).count()
    }

    /// Number of queries begun since the last `clear`
    pub fn queries_begun(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, MockCall::BeginQuery(_))).count()
    }

    /// Blocking reads that had to wait for an unfinished query
    pub fn blocking_stalls(&self) -> usize {
        self.blocking_stalls
    }

    /// Forget recorded calls and draws (query state is kept)
    pub fn clear(&mut self) {
        self.calls.clear();
        self.draws.clear();
        self.blocking_stalls = 0;
    }

    fn world_aabb(&self, mesh: MeshHandle, model: &Mat4) -> AABB {
        let local = self.mesh_bounds.get(&mesh).copied().unwrap_or(AABB::UNIT);
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for corner in local.corners() {
            let p = model.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        AABB { min, max }
    }

    fn ended_query(&mut self, id: QueryId) -> Result<&mut MockQuery> {
        let is_open = self.open_query == Some(id);
        match self.queries.get_mut(&id) {
            Some(query) if query.result.is_some() && !is_open => Ok(query),
            Some(_) => Err(invalid_query(format!("query {:?} was never ended", id))),
            None => Err(invalid_query(format!("unknown query {:?}", id))),
        }
    }
}

fn invalid_query(message: String) -> Error {
    engine_error!(sources::MOCK, "{}", message);
    Error::InvalidQuery(message)
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MockRenderer {
    fn set_camera(&mut self, view: &Mat4, projection: &Mat4) -> Result<()> {
        self.calls.push(MockCall::SetCamera { view: *view, projection: *projection });
        Ok(())
    }

    fn draw(&mut self, mesh: MeshHandle, model: &Mat4, mode: DrawMode) -> Result<()> {
        if let Some((failing, remaining)) = self.draw_failures {
            if failing == mode {
                self.draw_failures = (remaining > 1).then_some((mode, remaining - 1));
                engine_bail!(sources::MOCK, "injected failure drawing {:?} {:?}", mesh, mode);
            }
        }
        let world_aabb = self.world_aabb(mesh, model);
        self.calls.push(MockCall::Draw { mesh, model: *model, mode });
        self.draws.push(MockDraw { mesh, mode, world_aabb, query: self.open_query });
        if let Some(id) = self.open_query {
            if let Some(query) = self.queries.get_mut(&id) {
                query.boxes.push(world_aabb);
            }
        }
        Ok(())
    }

    fn create_queries(&mut self, count: usize) -> Result<Vec<QueryId>> {
        let ids: Vec<QueryId> = (0..count)
            .map(|k| QueryId(self.next_query_id + k as u32))
            .collect();
        self.next_query_id += count as u32;
        for &id in &ids {
            self.queries.insert(id, MockQuery::default());
        }
        Ok(ids)
    }

    fn begin_query(&mut self, id: QueryId) -> Result<()> {
        if self.fail_queries {
            engine_bail!(sources::MOCK, "injected failure beginning query {:?}", id);
        }
        if let Some(open) = self.open_query {
            engine_bail!(sources::MOCK,
                "begin_query {:?} while {:?} is still open", id, open);
        }
        match self.queries.get_mut(&id) {
            Some(query) => *query = MockQuery::default(),
            None => return Err(invalid_query(format!("unknown query {:?}", id))),
        }
        self.open_query = Some(id);
        self.calls.push(MockCall::BeginQuery(id));
        Ok(())
    }

    fn end_query(&mut self, id: QueryId) -> Result<()> {
        if self.open_query != Some(id) {
            engine_bail!(sources::MOCK,
                "end_query {:?} but the open query is {:?}", id, self.open_query);
        }
        self.open_query = None;

        let boxes = match self.queries.get(&id) {
            Some(query) => query.boxes.clone(),
            None => return Err(invalid_query(format!("unknown query {:?}", id))),
        };
        let mut visible = false;
        for aabb in &boxes {
            if (self.oracle)(aabb) {
                visible = true;
                break;
            }
        }

        let latency = self.latency;
        if let Some(query) = self.queries.get_mut(&id) {
            query.result = Some(visible);
            query.polls_remaining = latency;
        }
        self.calls.push(MockCall::EndQuery(id));
        Ok(())
    }

    fn query_result_available(&mut self, id: QueryId) -> Result<bool> {
        let query = self.ended_query(id)?;
        if query.polls_remaining == 0 {
            Ok(true)
        } else {
            query.polls_remaining -= 1;
            Ok(false)
        }
    }

    fn query_result(&mut self, id: QueryId) -> Result<bool> {
        let query = self.ended_query(id)?;
        let stalled = query.polls_remaining > 0;
        query.polls_remaining = 0;
        let visible = query.result.unwrap_or(false);
        if stalled {
            self.blocking_stalls += 1;
        }
        Ok(visible)
    }
}

#[cfg(test)]
#[path = "mock_renderer_tests.rs"]
mod tests;
