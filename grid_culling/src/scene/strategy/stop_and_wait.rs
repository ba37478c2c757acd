use crate::config::StrategyKind;
use crate::error::Result;
use super::{FrameContext, VisibilityStrategy};

/// One query per cell, resolved before moving on.
///
/// Exact (no stale information), but the CPU waits on the GPU once per
/// candidate cell.
#[derive(Debug, Default)]
pub struct StopAndWaitStrategy;

impl StopAndWaitStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl VisibilityStrategy for StopAndWaitStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StopAndWait
    }

    fn render(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let grid = ctx.grid();
        for pos in grid.positions() {
            if !ctx.is_candidate(pos) {
                continue;
            }
            let query = ctx.query_proxy(&grid.cell_aabb(pos), pos)?;
            if ctx.wait(&query)? {
                ctx.draw_cell(pos)?;
            }
        }
        Ok(())
    }
}
