/// Renderer module - draw dispatch and occlusion-query primitives

pub mod renderer;
pub mod query;
pub mod query_pool;
pub mod mock_renderer;

pub use renderer::*;
pub use query::OcclusionQuery;
pub use query_pool::QueryPool;
pub use mock_renderer::{MockRenderer, MockCall, MockDraw};
