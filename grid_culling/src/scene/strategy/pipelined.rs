/// Pipelined occlusion culling with a potentially visible set (PVS).
///
/// Cells believed visible from last frame are drawn straight away inside a
/// confirmation query that is only read at the start of the next frame.
/// Every other cell gets a proxy query; those are drained in issue order,
/// opportunistically while traversing and blocking at the end. The CPU
/// only stalls when a result is still missing once there is nothing else
/// left to submit.

use std::collections::VecDeque;
use rustc_hash::FxHashSet;
use crate::config::StrategyKind;
use crate::error::Result;
use crate::renderer::{OcclusionQuery, Renderer};
use crate::scene::grid::GridPosition;
use crate::engine_trace;
use crate::log::sources;
use super::{FrameContext, VisibilityStrategy};

type CellQuery = OcclusionQuery<GridPosition>;

#[derive(Debug, Default)]
pub struct PipelinedStrategy {
    /// Cells drawn as visible during the last frame
    pvs: FxHashSet<GridPosition>,
    /// Confirmation queries issued last frame for the cells drawn from the PVS
    confirmations: Vec<CellQuery>,
}

impl PipelinedStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible set carried into the next frame
    pub fn pvs(&self) -> &FxHashSet<GridPosition> {
        &self.pvs
    }

    /// Confirmation queries still in flight
    pub fn pending_confirmations(&self) -> usize {
        self.confirmations.len()
    }

    /// Drain ready queries from the front of the queue, drawing positives.
    fn drain_ready(
        ctx: &mut FrameContext<'_>,
        queue: &mut VecDeque<CellQuery>,
        drawn: &mut FxHashSet<GridPosition>,
    ) -> Result<()> {
        while let Some(front) = queue.front() {
            let Some(visible) = ctx.poll(front)? else {
                break;
            };
            let pos = *front.tag();
            queue.pop_front();
            if visible {
                ctx.draw_cell(pos)?;
                drawn.insert(pos);
            }
        }
        Ok(())
    }
}

impl VisibilityStrategy for PipelinedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pipelined
    }

    fn render(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        // Last frame's confirmations: a negative result evicts the cell.
        let mut working_pvs = std::mem::take(&mut self.pvs);
        for query in std::mem::take(&mut self.confirmations) {
            if !ctx.wait(&query)? {
                working_pvs.remove(query.tag());
            }
        }

        let grid = ctx.grid();
        let mut queue: VecDeque<CellQuery> = VecDeque::new();
        let mut next_confirmations = Vec::new();
        let mut drawn = FxHashSet::default();

        for pos in ctx.candidates_front_to_back() {
            Self::drain_ready(ctx, &mut queue, &mut drawn)?;

            if working_pvs.contains(&pos) {
                next_confirmations.push(ctx.query_drawn_cell(pos, pos)?);
                drawn.insert(pos);
            } else {
                queue.push_back(ctx.query_proxy(&grid.cell_aabb(pos), pos)?);
            }
        }

        while let Some(query) = queue.pop_front() {
            if ctx.wait(&query)? {
                let pos = *query.tag();
                ctx.draw_cell(pos)?;
                drawn.insert(pos);
            }
        }

        engine_trace!(sources::PIPELINED,
            "frame {}: pvs {} -> {} cells, {} confirmations pending",
            ctx.frame(), working_pvs.len(), drawn.len(), next_confirmations.len());

        self.pvs = drawn;
        self.confirmations = next_confirmations;
        Ok(())
    }

    fn flush(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        for query in std::mem::take(&mut self.confirmations) {
            if !query.blocking_get(renderer)? {
                self.pvs.remove(query.tag());
            }
        }
        Ok(())
    }

    fn abandon(&mut self) {
        self.pvs.clear();
        self.confirmations.clear();
    }
}

#[cfg(test)]
#[path = "pipelined_tests.rs"]
mod tests;
