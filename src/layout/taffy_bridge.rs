//! Taffy Bridge - flexbox geometry for the node tree.
//!
//! Converts node props to Taffy styles, builds a Taffy tree that mirrors the
//! node tree child-for-child, runs layout with a text measure function and
//! writes the results back as [`LayoutMetrics`].
//!
//! Comment nodes are kept in the Taffy tree with `Display::None` so child
//! indices line up on both sides.

use taffy::{
    AlignItems, AlignSelf, AvailableSpace, Dimension, Display, FlexDirection, FlexWrap,
    JustifyContent, LengthPercentage, LengthPercentageAuto, NodeId, Rect, Size, Style, TaffyTree,
};
use tracing::{debug, warn};

use crate::engine::{kind, Node, PropValue, Props};
use crate::error::Result;

use super::text_measure::{display_width, max_line_width, wrap_words};
use super::types::LayoutMetrics;
use super::GeometryProvider;

// =============================================================================
// PROP CONVERSION
// =============================================================================

fn to_dimension(value: Option<&PropValue>) -> Dimension {
    match value {
        Some(PropValue::Number(n)) if n.is_finite() => Dimension::Length(n.max(0.0) as f32),
        Some(PropValue::Str(s)) => {
            let s = s.trim();
            if let Some(pct) = s.strip_suffix('%') {
                pct.trim()
                    .parse::<f32>()
                    .map(|p| Dimension::Percent(p / 100.0))
                    .unwrap_or(Dimension::Auto)
            } else {
                s.parse::<f32>().map(Dimension::Length).unwrap_or(Dimension::Auto)
            }
        }
        _ => Dimension::Auto,
    }
}

/// Per-side value, falling back to the shorthand.
fn side(props: &Props, specific: &str, shorthand: &str) -> f32 {
    props
        .cells(specific)
        .or_else(|| props.cells(shorthand))
        .unwrap_or(0) as f32
}

fn to_flex_direction(node: &Node) -> FlexDirection {
    if node.is_kind(kind::ROW) {
        return FlexDirection::Row;
    }
    if node.is_kind(kind::COLUMN) {
        return FlexDirection::Column;
    }
    match node.props().string("flexDirection") {
        Some("row") => FlexDirection::Row,
        Some("row-reverse") => FlexDirection::RowReverse,
        Some("column-reverse") => FlexDirection::ColumnReverse,
        _ => FlexDirection::Column,
    }
}

fn to_flex_wrap(props: &Props) -> FlexWrap {
    match props.string("flexWrap") {
        Some("wrap") => FlexWrap::Wrap,
        Some("wrap-reverse") => FlexWrap::WrapReverse,
        _ if props.flag("responsive") => FlexWrap::Wrap,
        _ => FlexWrap::NoWrap,
    }
}

fn to_justify_content(value: Option<&str>) -> Option<JustifyContent> {
    Some(match value? {
        "flex-start" | "start" => JustifyContent::FlexStart,
        "center" => JustifyContent::Center,
        "flex-end" | "end" => JustifyContent::FlexEnd,
        "space-between" => JustifyContent::SpaceBetween,
        "space-around" => JustifyContent::SpaceAround,
        "space-evenly" => JustifyContent::SpaceEvenly,
        _ => return None,
    })
}

fn to_align_items(value: Option<&str>) -> Option<AlignItems> {
    Some(match value? {
        "stretch" => AlignItems::Stretch,
        "flex-start" | "start" => AlignItems::FlexStart,
        "center" => AlignItems::Center,
        "flex-end" | "end" => AlignItems::FlexEnd,
        "baseline" => AlignItems::Baseline,
        _ => return None,
    })
}

fn to_align_self(value: Option<&str>) -> Option<AlignSelf> {
    Some(match value? {
        "stretch" => AlignSelf::Stretch,
        "flex-start" | "start" => AlignSelf::FlexStart,
        "center" => AlignSelf::Center,
        "flex-end" | "end" => AlignSelf::FlexEnd,
        "baseline" => AlignSelf::Baseline,
        _ => return None,
    })
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

fn build_style(node: &Node) -> Style {
    let props = node.props();

    if node.is_comment() || props.string("display") == Some("none") {
        return Style {
            display: Display::None,
            ..Default::default()
        };
    }

    let mut style = Style {
        display: Display::Flex,
        flex_direction: to_flex_direction(node),
        flex_wrap: to_flex_wrap(props),
        justify_content: to_justify_content(props.string("justifyContent")),
        align_items: to_align_items(props.string("alignItems")),
        align_self: to_align_self(props.string("alignSelf")),

        flex_grow: props.number("flexGrow").unwrap_or(0.0) as f32,
        flex_shrink: props.number("flexShrink").unwrap_or(1.0) as f32,
        flex_basis: to_dimension(props.get("flexBasis")),

        size: Size {
            width: to_dimension(props.get("width")),
            height: to_dimension(props.get("height")),
        },
        min_size: Size {
            width: to_dimension(props.get("minWidth")),
            height: to_dimension(props.get("minHeight")),
        },
        max_size: Size {
            width: to_dimension(props.get("maxWidth")),
            height: to_dimension(props.get("maxHeight")),
        },

        margin: Rect {
            top: LengthPercentageAuto::Length(side(props, "marginTop", "margin")),
            right: LengthPercentageAuto::Length(side(props, "marginRight", "margin")),
            bottom: LengthPercentageAuto::Length(side(props, "marginBottom", "margin")),
            left: LengthPercentageAuto::Length(side(props, "marginLeft", "margin")),
        },
        padding: Rect {
            top: LengthPercentage::Length(side(props, "paddingTop", "padding")),
            right: LengthPercentage::Length(side(props, "paddingRight", "padding")),
            bottom: LengthPercentage::Length(side(props, "paddingBottom", "padding")),
            left: LengthPercentage::Length(side(props, "paddingLeft", "padding")),
        },
        gap: Size {
            width: LengthPercentage::Length(side(props, "columnGap", "gap")),
            height: LengthPercentage::Length(side(props, "rowGap", "gap")),
        },

        ..Default::default()
    };

    // `flex: n` is the CSS shorthand for grow n, shrink 1, basis 0.
    if let Some(flex) = props.number("flex").filter(|f| *f > 0.0) {
        style.flex_grow = flex as f32;
        style.flex_shrink = 1.0;
        if !props.contains("flexBasis") {
            style.flex_basis = Dimension::Length(0.0);
        }
    }

    style
}

// =============================================================================
// TEXT MEASUREMENT
// =============================================================================

/// Measure context attached to text leaves.
#[derive(Debug, Clone)]
struct TextLeaf {
    content: String,
}

fn measure_text(
    leaf: &TextLeaf,
    known_dimensions: Size<Option<f32>>,
    available_space: Size<AvailableSpace>,
) -> Size<f32> {
    let content = leaf.content.as_str();
    if content.is_empty() {
        return Size::ZERO;
    }

    let natural = max_line_width(content);
    let wrap_at = match known_dimensions.width {
        Some(w) => w.max(0.0) as usize,
        None => match available_space.width {
            AvailableSpace::Definite(w) => (w.max(0.0) as usize).min(natural),
            AvailableSpace::MinContent => content
                .split_whitespace()
                .map(display_width)
                .max()
                .unwrap_or(natural),
            AvailableSpace::MaxContent => natural,
        },
    };

    let lines = wrap_words(content, wrap_at.max(1));
    let width = lines.iter().map(|l| display_width(l)).max().unwrap_or(0);

    Size {
        width: known_dimensions.width.unwrap_or(width as f32),
        height: known_dimensions.height.unwrap_or(lines.len() as f32),
    }
}

// =============================================================================
// PROVIDER
// =============================================================================

/// Flexbox geometry via Taffy.
pub struct TaffyLayout {
    tree: TaffyTree<TextLeaf>,
}

impl Default for TaffyLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TaffyLayout {
    pub fn new() -> Self {
        Self {
            tree: TaffyTree::new(),
        }
    }

    fn build(&mut self, node: &Node) -> Result<NodeId> {
        let style = build_style(node);

        if node.children().is_empty() {
            return Ok(match node.text_content() {
                Some(text) if !node.is_comment() => self.tree.new_leaf_with_context(
                    style,
                    TextLeaf {
                        content: text.to_string(),
                    },
                )?,
                _ => self.tree.new_leaf(style)?,
            });
        }

        let children = node
            .children()
            .iter()
            .map(|child| self.build(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.tree.new_with_children(style, &children)?)
    }

    /// Copy computed geometry back, returning how many nodes changed.
    fn extract(&self, id: NodeId, node: &mut Node) -> Result<usize> {
        let layout = self.tree.layout(id)?;
        let metrics = LayoutMetrics {
            x: cell(layout.location.x),
            y: cell(layout.location.y),
            width: cell(layout.size.width),
            height: cell(layout.size.height),
        };
        let mut changed = usize::from(node.set_metrics(Some(metrics)));

        let child_ids = self.tree.children(id)?;
        for (child_id, child) in child_ids.into_iter().zip(node.children_mut()) {
            changed += self.extract(child_id, child)?;
        }
        Ok(changed)
    }
}

fn cell(v: f32) -> u16 {
    v.round().clamp(0.0, u16::MAX as f32) as u16
}

impl GeometryProvider for TaffyLayout {
    fn compute(&mut self, root: &mut Node, width: u16, height: Option<u16>) -> Result<()> {
        self.tree.clear();

        let root_id = self.build(root)?;

        // The root fills the viewport unless it sizes itself.
        let mut root_style = self.tree.style(root_id)?.clone();
        if !root.props().contains("width") {
            root_style.size.width = Dimension::Length(width as f32);
        }
        if let Some(h) = height {
            if !root.props().contains("height") {
                root_style.size.height = Dimension::Length(h as f32);
            }
        }
        self.tree.set_style(root_id, root_style)?;

        let available = Size {
            width: AvailableSpace::Definite(width as f32),
            height: match height {
                Some(h) => AvailableSpace::Definite(h as f32),
                None => AvailableSpace::MaxContent,
            },
        };

        self.tree
            .compute_layout_with_measure(
                root_id,
                available,
                |known_dimensions, available_space, _node_id, context, _style| match context {
                    Some(leaf) => measure_text(leaf, known_dimensions, available_space),
                    None => Size::ZERO,
                },
            )
            .inspect_err(|e| warn!(error = %e, "taffy layout failed"))?;

        let changed = self.extract(root_id, root)?;
        debug!(width, ?height, changed, "layout computed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(node: &Node) -> LayoutMetrics {
        node.metrics().unwrap_or_default()
    }

    #[test]
    fn test_column_stacks_children() {
        let mut root = Node::column([Node::text("one"), Node::text("two")]);
        TaffyLayout::new().compute(&mut root, 20, None).unwrap();

        assert_eq!(metrics(&root).width, 20);
        let a = metrics(&root.children()[0]);
        let b = metrics(&root.children()[1]);
        assert_eq!((a.y, a.height), (0, 1));
        assert_eq!((b.y, b.height), (1, 1));
    }

    #[test]
    fn test_row_places_children_side_by_side() {
        let mut root = Node::column([Node::row([
            Node::text("ab").with_prop("width", 4),
            Node::text("cd"),
        ])]);
        TaffyLayout::new().compute(&mut root, 20, None).unwrap();

        let row = &root.children()[0];
        assert_eq!(metrics(&row.children()[0]).x, 0);
        assert_eq!(metrics(&row.children()[1]).x, 4);
    }

    #[test]
    fn test_padding_offsets_children() {
        let mut root = Node::column([Node::text("x")])
            .with_prop("padding", 1)
            .with_prop("paddingLeft", 3);
        TaffyLayout::new().compute(&mut root, 20, None).unwrap();

        let child = metrics(&root.children()[0]);
        assert_eq!((child.x, child.y), (3, 1));
        assert_eq!(metrics(&root).height, 3);
    }

    #[test]
    fn test_text_wraps_to_width() {
        let mut root = Node::column([Node::text("hello world")]).with_prop("width", 6);
        TaffyLayout::new().compute(&mut root, 40, None).unwrap();
        assert_eq!(metrics(&root.children()[0]).height, 2);
    }

    #[test]
    fn test_comment_keeps_indices_aligned() {
        let mut root = Node::column([Node::comment("note"), Node::text("a"), Node::text("b")]);
        TaffyLayout::new().compute(&mut root, 10, None).unwrap();

        assert_eq!(metrics(&root.children()[0]).height, 0);
        assert_eq!(metrics(&root.children()[1]).y, 0);
        assert_eq!(metrics(&root.children()[2]).y, 1);
    }

    #[test]
    fn test_geometry_change_marks_dirty() {
        let mut root = Node::column([Node::text("abc")]);
        let mut layout = TaffyLayout::new();
        layout.compute(&mut root, 10, None).unwrap();

        root.render.is_dirty = false;
        root.children_mut()[0].render.is_dirty = false;

        layout.compute(&mut root, 10, None).unwrap();
        assert!(!root.render_state().is_dirty());

        layout.compute(&mut root, 12, None).unwrap();
        assert!(root.render_state().is_dirty());
    }

    #[test]
    fn test_percent_and_flex() {
        let mut root = Node::row([
            Node::boxed([]).with_prop("width", "25%"),
            Node::boxed([]).with_prop("flex", 1),
        ]);
        TaffyLayout::new().compute(&mut root, 40, None).unwrap();

        assert_eq!(metrics(&root.children()[0]).width, 10);
        assert_eq!(metrics(&root.children()[1]).width, 30);
    }
}
