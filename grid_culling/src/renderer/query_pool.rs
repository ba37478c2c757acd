/// QueryPool: fixed set of backend queries reused every traversal.
///
/// Queries are handed out round-robin from a cursor that `reset` rewinds
/// at the start of each strategy invocation. Handles are never released
/// individually; every handle issued in a traversal must be resolved
/// before the next `reset`.

use super::query::OcclusionQuery;
use super::renderer::{QueryId, Renderer};
use crate::error::{Error, Result};
use crate::engine_error;
use crate::log::sources;

pub struct QueryPool {
    ids: Vec<QueryId>,
    cursor: usize,
}

impl QueryPool {
    /// Allocate `capacity` backend queries up front.
    pub fn new(renderer: &mut dyn Renderer, capacity: usize) -> Result<Self> {
        let ids = renderer.create_queries(capacity)?;
        if ids.len() != capacity {
            return Err(Error::BackendError(format!(
                "requested {} queries, backend created {}", capacity, ids.len()
            )));
        }
        Ok(Self { ids, cursor: 0 })
    }

    /// Total number of queries
    pub fn capacity(&self) -> usize {
        self.ids.len()
    }

    /// Queries handed out since the last reset
    pub fn in_use(&self) -> usize {
        self.cursor
    }

    /// Queries still available before the next reset
    pub fn remaining(&self) -> usize {
        self.ids.len() - self.cursor
    }

    /// Rewind the cursor. Results of already issued queries stay readable
    /// until the same backend query is begun again.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Take the next query and tag it.
    ///
    /// Running out means the pool was sized below the worst case of the
    /// running strategy; the traversal must abort.
    pub fn acquire<T>(&mut self, tag: T) -> Result<OcclusionQuery<T>> {
        match self.ids.get(self.cursor) {
            Some(&id) => {
                self.cursor += 1;
                Ok(OcclusionQuery::new(id, tag))
            }
            None => {
                engine_error!(sources::QUERY_POOL,
                    "query pool exhausted after {} queries", self.ids.len());
                Err(Error::QueryPoolExhausted { capacity: self.ids.len() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MockRenderer;

    #[test]
    fn test_new_allocates_capacity() {
        let mut renderer = MockRenderer::new();
        let pool = QueryPool::new(&mut renderer, 8).unwrap();
        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.remaining(), 8);
    }

    #[test]
    fn test_acquire_hands_out_distinct_ids() {
        let mut renderer = MockRenderer::new();
        let mut pool = QueryPool::new(&mut renderer, 3).unwrap();
        let a = pool.acquire(10).unwrap();
        let b = pool.acquire(11).unwrap();
        let c = pool.acquire(12).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(*b.tag(), 11);
        assert_eq!(pool.remaining(), 0);
    }

    #[test]
    fn test_acquire_past_capacity_fails() {
        let mut renderer = MockRenderer::new();
        let mut pool = QueryPool::new(&mut renderer, 1).unwrap();
        pool.acquire(()).unwrap();
        assert_eq!(pool.acquire(()).unwrap_err(), Error::QueryPoolExhausted { capacity: 1 });
        assert_eq!(pool.in_use(), 1);
    }

    #[test]
    fn test_reset_rewinds_to_first_query() {
        let mut renderer = MockRenderer::new();
        let mut pool = QueryPool::new(&mut renderer, 2).unwrap();
        let first = pool.acquire(()).unwrap();
        pool.acquire(()).unwrap();

        pool.reset();
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.acquire(()).unwrap().id(), first.id());
    }

    #[test]
    fn test_empty_pool_is_immediately_exhausted() {
        let mut renderer = MockRenderer::new();
        let mut pool = QueryPool::new(&mut renderer, 0).unwrap();
        assert!(matches!(pool.acquire(()), Err(Error::QueryPoolExhausted { capacity: 0 })));
    }
}
