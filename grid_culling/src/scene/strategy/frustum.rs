use crate::config::StrategyKind;
use crate::error::Result;
use super::{FrameContext, VisibilityStrategy};

/// Draws a cell iff its box passes the conservative frustum test.
#[derive(Debug, Default)]
pub struct FrustumStrategy;

impl FrustumStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl VisibilityStrategy for FrustumStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Frustum
    }

    fn render(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        for pos in ctx.grid().positions() {
            if ctx.in_frustum(pos) {
                ctx.draw_cell(pos)?;
            }
        }
        Ok(())
    }
}
