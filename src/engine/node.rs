//! The node tree.
//!
//! A [`Node`] is a typed element with props, optional text content, ordered
//! children and per-node render state. Mutations go through methods that
//! flip the node's dirty flag; [`Node::reconcile_dirty`] then propagates
//! `children_dirty` to every ancestor in a single bottom-up sweep at the
//! start of a render pass.

use crate::engine::props::{PropValue, Props};
use crate::layout::LayoutMetrics;
use crate::state::ClickRegion;

/// Built-in node kinds.
pub mod kind {
    pub const BOX: &str = "box";
    pub const ROW: &str = "row";
    pub const COLUMN: &str = "column";
    pub const TEXT: &str = "text";
    pub const COMMENT: &str = "comment";
}

/// Index path from the root to a node.
pub type NodePath = [usize];

// =============================================================================
// Render state
// =============================================================================

/// Inputs, besides content, that a cached output depends on.
///
/// A cached output is only reused when the key it was produced under matches
/// the key of the current request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub width: Option<u16>,
    pub target_height: Option<u16>,
    pub size: Option<(u16, u16)>,
}

/// Per-node memoization state.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub(crate) cached_output: Option<String>,
    pub(crate) is_dirty: bool,
    pub(crate) children_dirty: bool,
    pub(crate) key: RenderKey,
    /// Descendant regions recorded during the last fresh render, relative to
    /// this node's absolute origin and depth.
    pub(crate) cached_regions: Vec<ClickRegion>,
    /// Regions of the last full pass. Only populated on the root.
    pub(crate) click_regions: Vec<ClickRegion>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            cached_output: None,
            is_dirty: true,
            children_dirty: false,
            key: RenderKey::default(),
            cached_regions: Vec::new(),
            click_regions: Vec::new(),
        }
    }
}

impl RenderState {
    /// Cached output may be returned verbatim.
    pub fn is_reusable(&self, key: &RenderKey) -> bool {
        !self.is_dirty && !self.children_dirty && self.cached_output.is_some() && self.key == *key
    }

    pub fn cached_output(&self) -> Option<&str> {
        self.cached_output.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn children_dirty(&self) -> bool {
        self.children_dirty
    }

    /// Record a fresh output and clear both dirty flags.
    pub(crate) fn store(&mut self, output: String, key: RenderKey, regions: Vec<ClickRegion>) {
        self.cached_output = Some(output);
        self.key = key;
        self.cached_regions = regions;
        self.is_dirty = false;
        self.children_dirty = false;
    }
}

// =============================================================================
// Node
// =============================================================================

#[derive(Debug, Clone)]
pub struct Node {
    node_type: String,
    props: Props,
    text: Option<String>,
    children: Vec<Node>,
    clickable: Option<String>,
    pub(crate) metrics: Option<LayoutMetrics>,
    pub(crate) render: RenderState,
}

impl Node {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            props: Props::new(),
            text: None,
            children: Vec::new(),
            clickable: None,
            metrics: None,
            render: RenderState::default(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(kind::TEXT).with_text(content)
    }

    pub fn row(children: impl IntoIterator<Item = Node>) -> Self {
        Self::new(kind::ROW).with_children(children)
    }

    pub fn column(children: impl IntoIterator<Item = Node>) -> Self {
        Self::new(kind::COLUMN).with_children(children)
    }

    pub fn boxed(children: impl IntoIterator<Item = Node>) -> Self {
        Self::new(kind::BOX).with_children(children)
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Self::new(kind::COMMENT).with_text(content)
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.set(name, value);
        self
    }

    pub fn with_text(mut self, content: impl Into<String>) -> Self {
        self.text = Some(content.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Mark the node clickable, reporting `component_id` in hit regions.
    pub fn with_click_id(mut self, component_id: impl Into<String>) -> Self {
        self.clickable = Some(component_id.into());
        self
    }

    /// Assign geometry directly. Used when no geometry provider runs.
    pub fn with_metrics(mut self, metrics: LayoutMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.node_type == kind
    }

    pub fn is_comment(&self) -> bool {
        self.node_type == kind::COMMENT
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// Mutable access to a child. The child's own setters mark it dirty and
    /// the next pass propagates that to this node.
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.children.get_mut(index)
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    pub fn click_id(&self) -> Option<&str> {
        self.clickable.as_deref()
    }

    pub fn metrics(&self) -> Option<LayoutMetrics> {
        self.metrics
    }

    /// Geometry of each child, in child order.
    pub fn child_metrics(&self) -> Vec<Option<LayoutMetrics>> {
        self.children.iter().map(|c| c.metrics).collect()
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render
    }

    /// Click regions recorded by the last pass rooted at this node.
    pub fn click_regions(&self) -> &[ClickRegion] {
        &self.render.click_regions
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    pub fn mark_dirty(&mut self) {
        self.render.is_dirty = true;
    }

    /// Set a prop. Marks the node dirty when the value actually changes.
    pub fn set_prop(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        let value = value.into();
        let previous = self.props.set(name, value.clone());
        if previous.as_ref() != Some(&value) {
            self.mark_dirty();
        }
    }

    pub fn remove_prop(&mut self, name: &str) -> Option<PropValue> {
        let removed = self.props.remove(name);
        if removed.is_some() {
            self.mark_dirty();
        }
        removed
    }

    pub fn set_text(&mut self, content: impl Into<String>) {
        let content = content.into();
        if self.text.as_deref() != Some(content.as_str()) {
            self.text = Some(content);
            self.mark_dirty();
        }
    }

    pub fn set_click_id(&mut self, component_id: Option<String>) {
        if self.clickable != component_id {
            self.clickable = component_id;
            self.mark_dirty();
        }
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
        self.mark_dirty();
    }

    pub fn insert_child(&mut self, index: usize, child: Node) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
        self.mark_dirty();
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Node> {
        if index >= self.children.len() {
            return None;
        }
        self.mark_dirty();
        Some(self.children.remove(index))
    }

    /// Replace geometry, marking the node dirty when it differs.
    pub(crate) fn set_metrics(&mut self, metrics: Option<LayoutMetrics>) -> bool {
        if self.metrics == metrics {
            return false;
        }
        self.metrics = metrics;
        self.mark_dirty();
        true
    }

    // -------------------------------------------------------------------------
    // Paths
    // -------------------------------------------------------------------------

    pub fn node_at(&self, path: &NodePath) -> Option<&Node> {
        path.iter().try_fold(self, |node, &i| node.children.get(i))
    }

    /// Apply `update` to the node at `path`, marking it dirty and flagging
    /// every ancestor's `children_dirty`. Returns `false` for a bad path.
    pub fn update_at(&mut self, path: &NodePath, update: impl FnOnce(&mut Node)) -> bool {
        let Some((&first, rest)) = path.split_first() else {
            update(self);
            self.mark_dirty();
            return true;
        };
        let Some(child) = self.children.get_mut(first) else {
            return false;
        };
        let found = child.update_at(rest, update);
        if found {
            self.render.children_dirty = true;
        }
        found
    }

    pub fn mark_dirty_at(&mut self, path: &NodePath) -> bool {
        self.update_at(path, |_| {})
    }

    /// Bottom-up sweep: any node with a dirty descendant gets
    /// `children_dirty`. Returns whether this subtree has anything dirty.
    pub fn reconcile_dirty(&mut self) -> bool {
        let mut any_child = false;
        for child in &mut self.children {
            any_child |= child.reconcile_dirty();
        }
        if any_child {
            self.render.children_dirty = true;
        }
        self.render.is_dirty || self.render.children_dirty
    }

    /// Drop every cached output in the subtree.
    pub fn invalidate_all(&mut self) {
        self.mark_dirty();
        self.render.cached_output = None;
        for child in &mut self.children {
            child.invalidate_all();
        }
    }
}
