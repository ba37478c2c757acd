/// Coherent hierarchical culling (CHC) over the quadtree.
///
/// Depth-first traversal with an explicit node stack and a FIFO of
/// in-flight node queries:
/// - a node visible last frame is drawn (leaf) or expanded (internal) at
///   once, with a confirmation query issued alongside
/// - any other node only gets a proxy query; a positive result pulls the
///   visibility up to the root and then draws or expands the node
///
/// An occluded subtree that stays occluded costs a single query at its
/// root. Query results are drained in issue order, polling while the
/// stack still has work and blocking once it is empty.

use std::collections::VecDeque;
use crate::camera::FrustumTest;
use crate::config::StrategyKind;
use crate::error::Result;
use crate::renderer::OcclusionQuery;
use crate::scene::quadtree::{NodeIndex, Quadtree, ROOT};
use crate::engine_trace;
use crate::log::sources;
use super::{FrameContext, VisibilityStrategy};

/// Tag of a queued node query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChcEntry {
    node: NodeIndex,
    /// Already drawn or expanded when the query was issued
    expanded: bool,
    /// Known to lie fully inside the frustum (descendants skip the test)
    inside: bool,
}

/// Node waiting on the traversal stack.
#[derive(Debug, Clone, Copy)]
struct StackEntry {
    node: NodeIndex,
    inside: bool,
}

#[derive(Debug)]
pub struct ChcStrategy {
    tree: Quadtree,
}

impl ChcStrategy {
    pub fn new(tree: Quadtree) -> Self {
        Self { tree }
    }

    /// Hierarchy with the visibility cache of the last traversal
    pub fn quadtree(&self) -> &Quadtree {
        &self.tree
    }

    /// Push the children of `node`, farthest first so the nearest is popped
    /// next.
    fn push_children(
        &self,
        ctx: &FrameContext<'_>,
        node: NodeIndex,
        inside: bool,
        stack: &mut Vec<StackEntry>,
    ) {
        let camera = ctx.camera_position();
        let mut children: Vec<(f32, NodeIndex)> = self.tree.children(node)
            .map(|child| (self.tree.node(child).aabb.center().distance(camera), child))
            .collect();
        children.sort_by(|a, b| b.0.total_cmp(&a.0).then(b.1.cmp(&a.1)));
        stack.extend(children.into_iter().map(|(_, child)| StackEntry { node: child, inside }));
    }

    /// Handle a node popped from the stack.
    fn traverse_node(
        &mut self,
        ctx: &mut FrameContext<'_>,
        entry: StackEntry,
        stack: &mut Vec<StackEntry>,
        queue: &mut VecDeque<OcclusionQuery<ChcEntry>>,
    ) -> Result<()> {
        let StackEntry { node, mut inside } = entry;
        if !inside {
            match ctx.frustum().classify_aabb(&self.tree.node(node).aabb) {
                FrustumTest::Outside => return Ok(()),
                FrustumTest::Inside => inside = true,
                FrustumTest::Partial => {}
            }
        }

        let frame = ctx.frame();
        let was_visible = self.tree.was_visible(node, frame);
        self.tree.visit(node, frame);

        let query = if was_visible {
            if self.tree.is_leaf(node) {
                let pos = self.tree.node(node).grid_position;
                ctx.query_drawn_cell(pos, ChcEntry { node, expanded: true, inside })?
            } else {
                let aabb = self.tree.node(node).aabb;
                let query = ctx.query_proxy(&aabb, ChcEntry { node, expanded: true, inside })?;
                self.push_children(ctx, node, inside, stack);
                query
            }
        } else {
            let aabb = self.tree.node(node).aabb;
            ctx.query_proxy(&aabb, ChcEntry { node, expanded: false, inside })?
        };
        queue.push_back(query);
        Ok(())
    }

    /// Handle a positive query result.
    fn handle_visible(
        &mut self,
        ctx: &mut FrameContext<'_>,
        entry: ChcEntry,
        stack: &mut Vec<StackEntry>,
    ) -> Result<()> {
        self.tree.pull_up(entry.node);
        if entry.expanded {
            return Ok(());
        }
        if self.tree.is_leaf(entry.node) {
            ctx.draw_cell(self.tree.node(entry.node).grid_position)?;
        } else {
            self.push_children(ctx, entry.node, entry.inside, stack);
        }
        Ok(())
    }
}

impl VisibilityStrategy for ChcStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Chc
    }

    fn render(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        debug_assert_eq!(
            self.tree.leaves().len(),
            ctx.grid().cell_count(),
            "quadtree does not match the grid"
        );

        let mut stack = vec![StackEntry { node: ROOT, inside: false }];
        let mut queue: VecDeque<OcclusionQuery<ChcEntry>> = VecDeque::new();

        while !stack.is_empty() || !queue.is_empty() {
            while let Some(front) = queue.front() {
                let ready = if stack.is_empty() {
                    Some(ctx.wait(front)?)
                } else {
                    ctx.poll(front)?
                };
                let Some(visible) = ready else {
                    break;
                };
                if let Some(query) = queue.pop_front() {
                    if visible {
                        self.handle_visible(ctx, query.into_tag(), &mut stack)?;
                    }
                }
            }

            if let Some(entry) = stack.pop() {
                self.traverse_node(ctx, entry, &mut stack, &mut queue)?;
            }
        }

        engine_trace!(sources::CHC,
            "frame {}: {} cells drawn, {} queries",
            ctx.frame(), ctx.stats().drawn, ctx.stats().queries_issued);
        Ok(())
    }

    fn abandon(&mut self) {
        self.tree.clear_visibility();
    }
}

#[cfg(test)]
#[path = "chc_tests.rs"]
mod tests;
