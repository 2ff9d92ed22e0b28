//! Render entry point.
//!
//! [`render_node`] is the single recursion used for every node: it serves
//! clean nodes from their cached output (replaying their click regions),
//! and otherwise dispatches to the registered handler or the fallback,
//! storing the fresh output on the node.

use tracing::{debug, trace};

use crate::engine::{Node, RenderKey};
use crate::layout::{line_count, max_line_width, split_lines};
use crate::state::ClickRegion;

use super::context::{ChildPlacement, RenderContext, RenderOverrides, RenderPass, RenderStats};
use super::flow::{content_right_edge, stack_child};
use super::registry::HandlerRegistry;

/// Result of one full pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    /// Lines of each top-level child, indented by its geometry `x`, each
    /// terminated by a newline.
    pub text: String,
    /// Click regions in document order, absolute coordinates.
    pub regions: Vec<ClickRegion>,
    pub stats: RenderStats,
}

/// Renders trees with a borrowed handler table.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'h> {
    handlers: &'h HandlerRegistry,
}

impl<'h> Renderer<'h> {
    pub fn new(handlers: &'h HandlerRegistry) -> Self {
        Self { handlers }
    }

    /// Run one pass over `root`.
    ///
    /// Dirty flags are reconciled first, so mutations made through the node
    /// API since the last pass are picked up without any further
    /// bookkeeping. The collected regions are also stored on the root.
    pub fn render(&self, root: &mut Node) -> RenderOutput {
        root.reconcile_dirty();

        let mut pass = RenderPass::new(self.handlers);
        pass.tracker.start_tracking();

        let mut lines: Vec<String> = Vec::new();
        if root.children().is_empty() {
            let placement = ChildPlacement::default();
            let out = render_node(&mut pass, root, placement, 0, RenderOverrides::default());
            lines.extend(split_lines(&out).into_iter().map(str::to_string));
        } else {
            let origin = root.metrics().map_or((0, 0), |m| (m.x, m.y));
            let mut ctx = RenderContext::new(root, &mut pass, origin, 0, false, RenderOverrides::default());
            let right_edge = content_right_edge(&ctx);
            for i in 0..ctx.children().len() {
                let y = lines.len().min(u16::MAX as usize) as u16;
                if let Some(child_lines) = stack_child(&mut ctx, i, y, right_edge) {
                    lines.extend(child_lines);
                }
            }
        }

        let mut text = lines.join("\n");
        if !lines.is_empty() {
            text.push('\n');
        }

        let regions = pass.tracker.stop_tracking();
        root.render.click_regions = regions.clone();
        if !root.children().is_empty() {
            root.render.store(text.clone(), RenderKey::default(), Vec::new());
        }

        debug!(
            fresh = pass.stats.fresh_renders,
            cached = pass.stats.cache_hits,
            regions = regions.len(),
            "render pass complete"
        );

        RenderOutput {
            text,
            regions,
            stats: pass.stats,
        }
    }

    /// Run a pass and keep only the text.
    pub fn render_text(&self, root: &mut Node) -> String {
        self.render(root).text
    }
}

/// Region for a clickable node, sized from geometry or, without geometry,
/// from the shape of its output.
fn own_region(node: &Node, output: &str, x: u16, y: u16, depth: usize) -> Option<ClickRegion> {
    let component_id = node.click_id()?;
    let (width, height) = match node.metrics() {
        Some(m) => (m.width, m.height),
        None => (
            max_line_width(output).min(u16::MAX as usize) as u16,
            line_count(output).min(u16::MAX as usize) as u16,
        ),
    };
    Some(ClickRegion {
        component_id: component_id.to_string(),
        x,
        y,
        width,
        height,
        depth,
        node_type: node.node_type().to_string(),
    })
}

/// Render one node (memoized).
pub(crate) fn render_node(
    pass: &mut RenderPass<'_>,
    node: &mut Node,
    placement: ChildPlacement,
    depth: usize,
    overrides: RenderOverrides,
) -> String {
    if node.is_comment() {
        return String::new();
    }

    let metrics = node.metrics();
    let abs_x = placement
        .parent_abs_x
        .saturating_add(metrics.map_or(0, |m| m.x));
    let abs_y = placement.parent_abs_y.saturating_add(placement.y_offset);
    let key = RenderKey {
        width: overrides.width,
        target_height: overrides.target_height,
        size: metrics.map(|m| (m.width, m.height)),
    };

    if node.render.is_reusable(&key) {
        pass.stats.cache_hits += 1;
        trace!(node_type = node.node_type(), depth, "render cache hit");

        let output = node.render.cached_output.clone().unwrap_or_default();
        if let Some(region) = own_region(node, &output, abs_x, abs_y, depth) {
            pass.tracker.register_region(region);
        }
        for region in &node.render.cached_regions {
            pass.tracker.register_region(region.offset_by(abs_x, abs_y, depth));
        }
        return output;
    }

    pass.stats.fresh_renders += 1;
    let mark = pass.tracker.mark();
    let handlers: &HandlerRegistry = pass.handlers;
    let handler = handlers.get(node.node_type());
    if handler.is_none() {
        pass.stats.fallbacks += 1;
    }

    let output = {
        let mut ctx = RenderContext::new(node, pass, (abs_x, abs_y), depth, placement.in_row, overrides);
        match handler {
            Some(handler) => handler.render(&mut ctx),
            None => render_fallback(&mut ctx),
        }
    };

    let descendants: Vec<ClickRegion> = pass
        .tracker
        .since(mark)
        .iter()
        .map(|r| r.relative_to(abs_x, abs_y, depth))
        .collect();
    if let Some(region) = own_region(node, &output, abs_x, abs_y, depth) {
        pass.tracker.insert_region(mark, region);
    }

    node.render.store(output.clone(), key, descendants);
    output
}

/// Children concatenated in order, or the literal text of a leaf.
fn render_fallback(ctx: &mut RenderContext<'_, '_>) -> String {
    if ctx.children().is_empty() {
        return ctx.text().unwrap_or_default().to_string();
    }

    let mut out = String::new();
    for i in 0..ctx.children().len() {
        let y = out.matches('\n').count().min(u16::MAX as usize) as u16;
        let placement = ctx.column_slot(y);
        out.push_str(&ctx.render_child(i, placement));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMetrics;

    #[test]
    fn test_fallback_renders_text_and_children() {
        let registry = HandlerRegistry::new();
        let renderer = Renderer::new(&registry);

        let mut root = Node::new("app").with_child(
            Node::new("group")
                .with_child(Node::new("label").with_text("a"))
                .with_child(Node::new("label").with_text("b")),
        );
        let out = renderer.render(&mut root);
        assert_eq!(out.text, "ab\n");
        assert_eq!(out.stats.fallbacks, 3);
    }

    #[test]
    fn test_custom_handler_receives_context() {
        let mut registry = HandlerRegistry::new();
        registry.register_fn("badge", |ctx| {
            let (x, y) = ctx.absolute_position();
            format!("[{}@{x},{y} d{}]", ctx.text().unwrap_or(""), ctx.depth())
        });
        let renderer = Renderer::new(&registry);

        let mut root = Node::new("root")
            .with_child(Node::new("badge").with_text("a"))
            .with_child(Node::new("badge").with_text("b").with_metrics(LayoutMetrics::new(4, 0, 3, 1)));
        assert_eq!(renderer.render_text(&mut root), "[a@0,0 d1]\n    [b@4,1 d1]\n");
    }

    #[test]
    fn test_comments_render_nothing() {
        let registry = HandlerRegistry::with_defaults();
        let renderer = Renderer::new(&registry);
        let mut root = Node::column([Node::comment("hidden"), Node::text("shown")]);
        assert_eq!(renderer.render_text(&mut root), "shown\n");
    }

    #[test]
    fn test_childless_root_renders_itself() {
        let registry = HandlerRegistry::with_defaults();
        let renderer = Renderer::new(&registry);
        let mut root = Node::text("solo");
        assert_eq!(renderer.render_text(&mut root), "solo\n");
    }

    #[test]
    fn test_empty_tree() {
        let registry = HandlerRegistry::with_defaults();
        let renderer = Renderer::new(&registry);
        let mut root = Node::column([]);
        let out = renderer.render(&mut root);
        assert_eq!(out.text, "");
        assert!(out.regions.is_empty());
    }

    #[test]
    fn test_second_pass_is_served_from_cache() {
        let registry = HandlerRegistry::with_defaults();
        let renderer = Renderer::new(&registry);
        let mut root = Node::column([Node::column([Node::text("a"), Node::text("b")])]);

        let first = renderer.render(&mut root);
        let second = renderer.render(&mut root);
        assert_eq!(first.text, second.text);
        assert_eq!(second.stats.fresh_renders, 0);
        assert_eq!(second.stats.cache_hits, 1);
    }

    #[test]
    fn test_override_change_misses_cache() {
        let registry = HandlerRegistry::with_defaults();
        let mut pass = RenderPass::new(&registry);
        let mut node = Node::text("hello world");

        let narrow = render_node(&mut pass, &mut node, ChildPlacement::default(), 1, RenderOverrides::width(5));
        let wide = render_node(&mut pass, &mut node, ChildPlacement::default(), 1, RenderOverrides::width(20));
        assert_eq!(narrow, "hello\nworld");
        assert_eq!(wide, "hello world");
        assert_eq!(pass.stats.fresh_renders, 2);
    }
}
