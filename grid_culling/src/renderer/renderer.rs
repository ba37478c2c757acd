/// Renderer trait - the draw and occlusion-query surface driven by the scene
///
/// The culling strategies never talk to a graphics API directly. They issue
/// draws and bracket proxy draws with occlusion queries through this trait;
/// a backend maps it onto its own query objects (e.g. `ANY_SAMPLES_PASSED`).

use glam::Mat4;
use crate::error::Result;

// ============================================================================
// Handles
// ============================================================================

/// Opaque handle to a mesh uploaded by the geometry collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Opaque handle to one backend occlusion query object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryId(pub u32);

/// How a draw is rasterized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    /// Normal shaded geometry (color and depth writes on)
    Shaded,
    /// Occlusion probe: color and depth writes off, depth test on
    Probe,
    /// Debug bounds: lines only
    Wireframe,
}

// ============================================================================
// Renderer trait
// ============================================================================

/// Backend used by a `Scene` for one frame at a time.
///
/// All methods take `&mut self`: a backend records state (bound camera,
/// open query) between calls. Query results are asynchronous:
/// `query_result_available` must never block, `query_result` may.
pub trait Renderer: Send {
    /// Bind the camera matrices for every following draw
    fn set_camera(&mut self, view: &Mat4, projection: &Mat4) -> Result<()>;

    /// Draw a mesh with a model matrix
    fn draw(&mut self, mesh: MeshHandle, model: &Mat4, mode: DrawMode) -> Result<()>;

    /// Allocate `count` occlusion query objects
    fn create_queries(&mut self, count: usize) -> Result<Vec<QueryId>>;

    /// Start counting samples for `id` (at most one query open at a time)
    fn begin_query(&mut self, id: QueryId) -> Result<()>;

    /// Stop counting samples for `id`
    fn end_query(&mut self, id: QueryId) -> Result<()>;

    /// Whether the result of `id` is ready (non-blocking)
    fn query_result_available(&mut self, id: QueryId) -> Result<bool>;

    /// Whether any sample passed for `id`, waiting for the GPU if needed
    fn query_result(&mut self, id: QueryId) -> Result<bool>;
}
