/// OcclusionQuery: a future-like handle over one backend query.

use super::renderer::{QueryId, Renderer};
use crate::error::Result;

/// One in-flight or completed visibility test, tagged with what it was
/// issued for (a grid cell, a quadtree node, ...).
///
/// The handle does not own the backend query object: it is borrowed from a
/// `QueryPool` for the duration of one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcclusionQuery<T> {
    id: QueryId,
    tag: T,
}

impl<T> OcclusionQuery<T> {
    pub fn new(id: QueryId, tag: T) -> Self {
        Self { id, tag }
    }

    pub fn id(&self) -> QueryId {
        self.id
    }

    pub fn tag(&self) -> &T {
        &self.tag
    }

    pub fn into_tag(self) -> T {
        self.tag
    }

    /// Open the query: following draws count toward its result
    pub fn begin(&self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.begin_query(self.id)
    }

    /// Close the query
    pub fn end(&self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.end_query(self.id)
    }

    /// Non-blocking: `Some(visible)` once the result is ready, `None` before
    pub fn poll(&self, renderer: &mut dyn Renderer) -> Result<Option<bool>> {
        if renderer.query_result_available(self.id)? {
            Ok(Some(renderer.query_result(self.id)?))
        } else {
            Ok(None)
        }
    }

    /// Wait for the result and report whether any sample passed
    pub fn blocking_get(&self, renderer: &mut dyn Renderer) -> Result<bool> {
        renderer.query_result(self.id)
    }
}
