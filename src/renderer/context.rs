//! Render Context - what a handler sees of the node it renders.
//!
//! A context is a read-only view over one node (props, text, children,
//! geometry) plus the per-call overrides its parent composed it with, and
//! the one write operation a handler needs: rendering a child through the
//! memoized entry point.

use crate::engine::{Node, Props};
use crate::layout::LayoutMetrics;
use crate::state::ClickTracker;

use super::registry::HandlerRegistry;
use super::render::render_node;

/// Per-call constraints a composer imposes on a child.
///
/// Passed by value down one call; never written onto the node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOverrides {
    /// Width to compose at, taking precedence over props and geometry.
    pub width: Option<u16>,
    /// Exact line count the output must have.
    pub target_height: Option<u16>,
}

impl RenderOverrides {
    pub fn width(width: u16) -> Self {
        Self {
            width: Some(width),
            target_height: None,
        }
    }
}

/// Where a child sits relative to the composer rendering it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildPlacement {
    pub parent_abs_x: u16,
    pub parent_abs_y: u16,
    /// Lines below the parent's top edge.
    pub y_offset: u16,
    pub in_row: bool,
}

/// Work counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Nodes composed from scratch.
    pub fresh_renders: usize,
    /// Nodes served from their cached output.
    pub cache_hits: usize,
    /// Fresh renders that had no registered handler.
    pub fallbacks: usize,
}

/// State owned by one render pass.
pub(crate) struct RenderPass<'h> {
    pub(crate) handlers: &'h HandlerRegistry,
    pub(crate) tracker: ClickTracker,
    pub(crate) stats: RenderStats,
}

impl<'h> RenderPass<'h> {
    pub(crate) fn new(handlers: &'h HandlerRegistry) -> Self {
        Self {
            handlers,
            tracker: ClickTracker::new(),
            stats: RenderStats::default(),
        }
    }
}

pub struct RenderContext<'a, 'h> {
    node: &'a mut Node,
    pass: &'a mut RenderPass<'h>,
    abs_x: u16,
    abs_y: u16,
    depth: usize,
    in_row: bool,
    overrides: RenderOverrides,
}

impl<'a, 'h> RenderContext<'a, 'h> {
    pub(crate) fn new(
        node: &'a mut Node,
        pass: &'a mut RenderPass<'h>,
        (abs_x, abs_y): (u16, u16),
        depth: usize,
        in_row: bool,
        overrides: RenderOverrides,
    ) -> Self {
        Self {
            node,
            pass,
            abs_x,
            abs_y,
            depth,
            in_row,
            overrides,
        }
    }

    // -------------------------------------------------------------------------
    // Node views
    // -------------------------------------------------------------------------

    pub fn node_type(&self) -> &str {
        self.node.node_type()
    }

    pub fn props(&self) -> &Props {
        self.node.props()
    }

    pub fn text(&self) -> Option<&str> {
        self.node.text_content()
    }

    pub fn children(&self) -> &[Node] {
        self.node.children()
    }

    pub fn metrics(&self) -> Option<LayoutMetrics> {
        self.node.metrics()
    }

    /// The node being rendered, for handlers that hash or inspect it whole.
    pub fn node(&self) -> &Node {
        &*self.node
    }

    // -------------------------------------------------------------------------
    // Resolved placement
    // -------------------------------------------------------------------------

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn absolute_position(&self) -> (u16, u16) {
        (self.abs_x, self.abs_y)
    }

    pub fn in_row(&self) -> bool {
        self.in_row
    }

    pub fn overrides(&self) -> RenderOverrides {
        self.overrides
    }

    /// Override, then `width` prop, then geometry.
    pub fn effective_width(&self) -> Option<u16> {
        self.overrides
            .width
            .or_else(|| self.props().cells("width"))
            .or_else(|| self.metrics().map(|m| m.width))
    }

    pub fn target_height(&self) -> Option<u16> {
        self.overrides.target_height
    }

    // -------------------------------------------------------------------------
    // Children
    // -------------------------------------------------------------------------

    /// Placement for a child laid out horizontally by this node.
    pub fn row_slot(&self, y_offset: u16) -> ChildPlacement {
        ChildPlacement {
            parent_abs_x: self.abs_x,
            parent_abs_y: self.abs_y,
            y_offset,
            in_row: true,
        }
    }

    /// Placement for a child stacked vertically by this node.
    pub fn column_slot(&self, y_offset: u16) -> ChildPlacement {
        ChildPlacement {
            in_row: false,
            ..self.row_slot(y_offset)
        }
    }

    pub fn render_child(&mut self, index: usize, placement: ChildPlacement) -> String {
        self.render_child_with(index, placement, RenderOverrides::default())
    }

    /// Render child `index` one level deeper. Out-of-range indices render
    /// as the empty string.
    pub fn render_child_with(
        &mut self,
        index: usize,
        placement: ChildPlacement,
        overrides: RenderOverrides,
    ) -> String {
        let depth = self.depth + 1;
        match self.node.child_mut(index) {
            Some(child) => render_node(self.pass, child, placement, depth, overrides),
            None => String::new(),
        }
    }
}
