//! Flow Composer - row and column composition.
//!
//! Turns a container's children plus their geometry into one multi-line
//! string. Children are rendered through the context so each recursion
//! carries its absolute position (for click regions) and any width/height
//! constraint as an explicit per-call override.
//!
//! Rows place children by geometry `x`, measuring what was written in
//! display columns so wide glyphs and ANSI styling do not skew alignment.
//! Wrapped rows are split into bands by non-overlapping vertical extents and
//! each band is composed on its own. Columns stack children top to bottom
//! with `gap` blank lines in between.

use std::borrow::Cow;
use std::iter::repeat_n;

use crate::engine::{kind, Node, Props};
use crate::layout::{display_width, fit_height, fit_width, join_lines, split_lines, truncate_to_width};

use super::context::{RenderContext, RenderOverrides};

// =============================================================================
// Shared
// =============================================================================

/// Effective `(top, bottom)` padding. Per-side values win over `padding`.
pub fn vertical_padding(props: &Props) -> (u16, u16) {
    let shared = props.cells("padding").unwrap_or(0);
    (
        props.cells("paddingTop").unwrap_or(shared),
        props.cells("paddingBottom").unwrap_or(shared),
    )
}

/// Right edge of the content box, from the effective width less right
/// padding. `paddingRight` wins over `padding`.
pub(crate) fn content_right_edge(ctx: &RenderContext<'_, '_>) -> Option<u16> {
    let props = ctx.props();
    let right = props
        .cells("paddingRight")
        .or_else(|| props.cells("padding"))
        .unwrap_or(0);
    ctx.effective_width().map(|w| w.saturating_sub(right))
}

/// Wrap a body in padding lines and fit it to a target height.
fn finish(body: Vec<String>, top: u16, bottom: u16, target_height: Option<u16>) -> String {
    let mut lines = Vec::with_capacity(body.len() + top as usize + bottom as usize);
    lines.extend(repeat_n(String::new(), top as usize));
    lines.extend(body);
    lines.extend(repeat_n(String::new(), bottom as usize));
    if let Some(h) = target_height {
        fit_height(&mut lines, h as usize);
    }
    join_lines(&lines)
}

fn owned_lines(block: &str) -> Vec<String> {
    split_lines(block).into_iter().map(str::to_string).collect()
}

// =============================================================================
// Row
// =============================================================================

/// Children sharing one visual line of a wrapped row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Band {
    items: Vec<usize>,
    top: u16,
    bottom: u16,
}

/// Group items into bands of overlapping vertical extent, in ascending `y`.
fn group_bands(children: &[Node], items: &[usize]) -> Vec<Band> {
    let mut extents: Vec<(usize, u16, u16)> = items
        .iter()
        .map(|&i| {
            let m = children[i].metrics().unwrap_or_default();
            (i, m.y, m.bottom())
        })
        .collect();
    extents.sort_by_key(|&(_, top, _)| top);

    let mut bands: Vec<Band> = Vec::new();
    for (i, top, bottom) in extents {
        match bands.last_mut() {
            Some(band) if top < band.bottom || top == band.top => {
                band.items.push(i);
                band.bottom = band.bottom.max(bottom);
            }
            _ => bands.push(Band {
                items: vec![i],
                top,
                bottom,
            }),
        }
    }
    bands
}

/// Whether a row child is composed at exactly its geometry width.
fn row_constrains_width(child: &Node) -> bool {
    child.is_kind(kind::COLUMN)
        || child.is_kind(kind::BOX)
        || child.props().contains("flex")
        || child.props().contains("width")
}

struct RowCell {
    x: Option<u16>,
    width: Option<u16>,
    lines: Vec<String>,
}

/// Compose one band left to right, returning its lines.
fn compose_band(ctx: &mut RenderContext<'_, '_>, items: &[usize], y_offset: u16) -> Vec<String> {
    let mut order = items.to_vec();
    order.sort_by_key(|&i| ctx.children()[i].metrics().map_or(0, |m| m.x));

    let mut cells = Vec::with_capacity(order.len());
    for i in order {
        let child = &ctx.children()[i];
        let metrics = child.metrics();
        let width = if row_constrains_width(child) {
            metrics.map(|m| m.width)
        } else {
            None
        };

        let placement = ctx.row_slot(y_offset);
        let output = ctx.render_child_with(
            i,
            placement,
            RenderOverrides {
                width,
                target_height: None,
            },
        );
        cells.push(RowCell {
            x: metrics.map(|m| m.x),
            width,
            lines: owned_lines(&output),
        });
    }

    let height = cells.iter().map(|c| c.lines.len()).max().unwrap_or(0);
    let last = cells.len().saturating_sub(1);

    (0..height)
        .map(|row| {
            let mut line = String::new();
            let mut cursor = 0usize;
            for (k, cell) in cells.iter().enumerate() {
                if let Some(x) = cell.x.map(usize::from) {
                    if x > cursor {
                        line.extend(repeat_n(' ', x - cursor));
                        cursor = x;
                    }
                }
                let raw = cell.lines.get(row).map(String::as_str).unwrap_or("");
                let segment: Cow<'_, str> = match cell.width.map(usize::from) {
                    Some(w) if k < last => Cow::Owned(fit_width(raw, w)),
                    Some(w) => truncate_to_width(raw, w),
                    None => Cow::Borrowed(raw),
                };
                cursor += display_width(&segment);
                line.push_str(&segment);
            }
            line
        })
        .collect()
}

/// Horizontal composition.
pub fn compose_row(ctx: &mut RenderContext<'_, '_>) -> String {
    let (top, bottom) = vertical_padding(ctx.props());
    let wraps = matches!(ctx.props().string("flexWrap"), Some("wrap" | "wrap-reverse"))
        || ctx.props().flag("responsive");

    let items: Vec<usize> = ctx
        .children()
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_comment())
        .map(|(i, _)| i)
        .collect();

    let bands = if wraps {
        group_bands(ctx.children(), &items)
    } else {
        Vec::new()
    };

    let body = if bands.len() <= 1 {
        compose_band(ctx, &items, top)
    } else {
        let mut body = Vec::new();
        let mut y = top;
        let mut prev_bottom: Option<u16> = None;
        for band in bands {
            if let Some(prev) = prev_bottom {
                let spacing = band.top.saturating_sub(prev);
                body.extend(repeat_n(String::new(), spacing as usize));
                y = y.saturating_add(spacing);
            }
            let lines = compose_band(ctx, &band.items, y);
            y = y.saturating_add(lines.len() as u16);
            prev_bottom = Some(band.bottom);
            body.extend(lines);
        }
        body
    };

    finish(body, top, bottom, ctx.target_height())
}

// =============================================================================
// Column
// =============================================================================

/// Render child `i` of `ctx` as one entry of a vertical stack, `y` lines
/// below the top of `ctx`.
///
/// `right_edge` is the column's content right edge; children without an
/// explicit `width` are composed out to it. Returns the child's lines
/// indented by its geometry `x`, or `None` for comments.
pub(crate) fn stack_child(
    ctx: &mut RenderContext<'_, '_>,
    i: usize,
    y: u16,
    right_edge: Option<u16>,
) -> Option<Vec<String>> {
    let child = ctx.children().get(i)?;
    if child.is_comment() {
        return None;
    }
    let metrics = child.metrics();
    let props = child.props();
    let x = metrics.map_or(0, |m| m.x);

    let width = if props.contains("width") {
        None
    } else {
        right_edge.map(|edge| edge.saturating_sub(x))
    };

    let constrained = props.contains("flex")
        || props.contains("flexGrow")
        || props.contains("height")
        || child.is_kind(kind::COLUMN)
        || child.is_kind(kind::ROW);
    let inject = constrained && (child.is_kind(kind::BOX) || child.is_kind(kind::ROW));
    let target = if constrained {
        metrics.map(|m| m.height)
    } else {
        None
    };

    let placement = ctx.column_slot(y);
    let output = ctx.render_child_with(
        i,
        placement,
        RenderOverrides {
            width,
            target_height: if inject { target } else { None },
        },
    );

    let mut lines = owned_lines(&output);
    if let Some(h) = target {
        fit_height(&mut lines, h as usize);
    }
    if x > 0 {
        let indent = " ".repeat(x as usize);
        for line in lines.iter_mut().filter(|l| !l.is_empty()) {
            line.insert_str(0, &indent);
        }
    }
    Some(lines)
}

/// Vertical composition.
pub fn compose_column(ctx: &mut RenderContext<'_, '_>) -> String {
    let (top, bottom) = vertical_padding(ctx.props());
    let gap = ctx
        .props()
        .cells("rowGap")
        .or_else(|| ctx.props().cells("gap"))
        .unwrap_or(0) as usize;
    let right_edge = content_right_edge(ctx);

    let mut y = top as usize;
    let mut blocks: Vec<Vec<String>> = Vec::new();

    for i in 0..ctx.children().len() {
        let at = y.min(u16::MAX as usize) as u16;
        let Some(lines) = stack_child(ctx, i, at, right_edge) else {
            continue;
        };
        if lines.is_empty() {
            continue;
        }
        y += lines.len() + gap;
        blocks.push(lines);
    }

    let mut body = Vec::new();
    for (k, block) in blocks.into_iter().enumerate() {
        if k > 0 {
            body.extend(repeat_n(String::new(), gap));
        }
        body.extend(block);
    }

    finish(body, top, bottom, ctx.target_height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMetrics;

    fn boxed_at(x: u16, y: u16, w: u16, h: u16) -> Node {
        Node::boxed([]).with_metrics(LayoutMetrics::new(x, y, w, h))
    }

    #[test]
    fn test_vertical_padding_overrides() {
        let mut props = Props::new();
        assert_eq!(vertical_padding(&props), (0, 0));
        props.set("padding", 2);
        assert_eq!(vertical_padding(&props), (2, 2));
        props.set("paddingBottom", 0);
        assert_eq!(vertical_padding(&props), (2, 0));
    }

    #[test]
    fn test_group_bands_same_y() {
        let children = vec![boxed_at(0, 0, 3, 1), boxed_at(3, 0, 3, 1), boxed_at(6, 0, 3, 1)];
        let bands = group_bands(&children, &[0, 1, 2]);
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].items, vec![0, 1, 2]);
    }

    #[test]
    fn test_group_bands_distinct_y_sorted() {
        let children = vec![boxed_at(0, 4, 3, 2), boxed_at(0, 0, 3, 2), boxed_at(0, 2, 3, 2)];
        let bands = group_bands(&children, &[0, 1, 2]);
        let order: Vec<Vec<usize>> = bands.iter().map(|b| b.items.clone()).collect();
        assert_eq!(order, vec![vec![1], vec![2], vec![0]]);
    }

    #[test]
    fn test_group_bands_overlap_merges() {
        let children = vec![boxed_at(0, 0, 3, 3), boxed_at(3, 1, 3, 1), boxed_at(0, 3, 3, 1)];
        let bands = group_bands(&children, &[0, 1, 2]);
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].items, vec![0, 1]);
        assert_eq!((bands[0].top, bands[0].bottom), (0, 3));
    }

    #[test]
    fn test_group_bands_zero_height() {
        let children = vec![boxed_at(0, 1, 2, 0), boxed_at(2, 1, 2, 0)];
        assert_eq!(group_bands(&children, &[0, 1]).len(), 1);
    }

    #[test]
    fn test_finish_padding_only() {
        assert_eq!(finish(Vec::new(), 0, 0, None), "");
        assert_eq!(finish(Vec::new(), 1, 0, None), "\n");
        assert_eq!(finish(Vec::new(), 0, 0, Some(1)), "\n");
        assert_eq!(finish(Vec::new(), 1, 2, None), "\n\n\n");
        assert_eq!(finish(vec!["a".into()], 1, 1, None), "\na\n\n");
        assert_eq!(finish(vec!["a".into(), "b".into()], 0, 0, Some(1)), "a");
    }

    #[test]
    fn test_row_width_constraint_rules() {
        assert!(row_constrains_width(&Node::column([])));
        assert!(row_constrains_width(&Node::boxed([])));
        assert!(row_constrains_width(&Node::text("x").with_prop("width", 3)));
        assert!(row_constrains_width(&Node::text("x").with_prop("flex", 1)));
        assert!(!row_constrains_width(&Node::text("x")));
        assert!(!row_constrains_width(&Node::row([])));
    }
}
