use crate::config::StrategyKind;
use crate::error::Result;
use super::{FrameContext, VisibilityStrategy};

/// Draws every cell. Baseline, and the fallback after a failed frame.
#[derive(Debug, Default)]
pub struct UnculledStrategy;

impl UnculledStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl VisibilityStrategy for UnculledStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Unculled
    }

    fn render(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        for pos in ctx.grid().positions() {
            ctx.draw_cell(pos)?;
        }
        Ok(())
    }
}
