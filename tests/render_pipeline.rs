//! End-to-end rendering: memoization, flow composition, click regions and
//! the Taffy-backed engine.

use std::cell::Cell;
use std::rc::Rc;

use termflow::cache::content_hash;
use termflow::{
    hit_test, Engine, EngineConfig, HandlerRegistry, LayoutMetrics, NoLayout, Node, Renderer,
    Viewport,
};

fn engine(width: u16, height: u16) -> Engine {
    Engine::with_viewport(EngineConfig::default(), Viewport::new(width, height))
}

fn cell(label: &str, x: u16, y: u16) -> Node {
    Node::boxed([Node::text(label)])
        .with_prop("width", 3)
        .with_metrics(LayoutMetrics::new(x, y, 3, 1))
}

// =============================================================================
// Memoization
// =============================================================================

#[test]
fn test_unchanged_tree_renders_identically_without_work() {
    let calls = Rc::new(Cell::new(0));
    let mut engine = engine(40, 10);
    let seen = calls.clone();
    engine.handlers_mut().register_fn("leaf", move |ctx| {
        seen.set(seen.get() + 1);
        ctx.text().unwrap_or("").to_string()
    });

    let mut root = Node::column([
        Node::column([Node::new("leaf").with_text("a"), Node::new("leaf").with_text("b")]),
        Node::text("tail"),
    ]);

    let first = engine.frame(&mut root).unwrap();
    let second = engine.frame(&mut root).unwrap();
    assert_eq!(first.text, "a\nb\ntail\n");
    assert_eq!(first.text, second.text);
    assert_eq!(calls.get(), 2);
    assert_eq!(second.stats.fresh_renders, 0);

    assert!(root.update_at(&[0, 1], |n| n.set_text("B")));
    let third = engine.frame(&mut root).unwrap();
    assert_eq!(third.text, "a\nB\ntail\n");
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_setting_equal_prop_keeps_cache() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);
    let mut root = Node::column([Node::text("x").with_prop("bold", false)]);
    renderer.render(&mut root);

    if let Some(child) = root.child_mut(0) {
        child.set_prop("bold", false);
    }
    let out = renderer.render(&mut root);
    assert_eq!(out.stats.cache_hits, 1);
}

#[test]
fn test_content_hash_properties() {
    let tree = || Node::row([Node::text("a"), Node::text("b")]);
    assert_eq!(content_hash(&tree()), content_hash(&tree()));

    let swapped = Node::row([Node::text("b"), Node::text("a")]);
    assert_ne!(content_hash(&tree()), content_hash(&swapped));

    let colored = Node::row([Node::text("a").with_prop("color", "red"), Node::text("b")]);
    assert_eq!(content_hash(&tree()), content_hash(&colored));

    let sized = Node::row([Node::text("a").with_prop("width", 4), Node::text("b")]);
    assert_ne!(content_hash(&tree()), content_hash(&sized));
}

// =============================================================================
// Flow composition
// =============================================================================

#[test]
fn test_row_with_equal_y_is_one_line() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);
    let mut root = Node::column([Node::row([cell("aaa", 0, 0), cell("bbb", 3, 0), cell("ccc", 6, 0)])
        .with_prop("flexWrap", "wrap")
        .with_metrics(LayoutMetrics::new(0, 0, 9, 1))]);

    assert_eq!(renderer.render_text(&mut root), "aaabbbccc\n");
}

#[test]
fn test_wrapped_row_stacks_bands_by_y() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);
    let mut root = Node::column([Node::row([cell("aaa", 0, 2), cell("bbb", 0, 0), cell("ccc", 0, 1)])
        .with_prop("flexWrap", "wrap")
        .with_metrics(LayoutMetrics::new(0, 0, 3, 3))]);

    assert_eq!(renderer.render_text(&mut root), "bbb\nccc\naaa\n");
}

#[test]
fn test_wrapped_row_keeps_gap_between_bands() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);
    let mut root = Node::column([Node::row([cell("aaa", 0, 0), cell("bbb", 0, 2)])
        .with_prop("flexWrap", "wrap")
        .with_metrics(LayoutMetrics::new(0, 0, 3, 3))]);

    assert_eq!(renderer.render_text(&mut root), "aaa\n\nbbb\n");
}

#[test]
fn test_empty_padded_container_is_padding_lines() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);
    let mut root = Node::column([Node::boxed([]).with_prop("padding", 1)]);
    assert_eq!(renderer.render_text(&mut root), "\n\n");
}

#[test]
fn test_single_blank_line_children_are_kept() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);
    let spacer = || {
        Node::boxed([])
            .with_prop("height", 1)
            .with_metrics(LayoutMetrics::new(0, 1, 10, 1))
    };

    let mut top_level = Node::column([Node::text("a"), spacer(), Node::text("b")]);
    assert_eq!(renderer.render_text(&mut top_level), "a\n\nb\n");

    let mut nested = Node::column([Node::column([Node::text("a"), spacer(), Node::text("b")])]);
    assert_eq!(renderer.render_text(&mut nested), "a\n\nb\n");
}

#[test]
fn test_one_sided_padding_renders_one_line() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);

    let mut top = Node::column([
        Node::text("a"),
        Node::boxed([]).with_prop("paddingTop", 1),
        Node::text("b"),
    ]);
    assert_eq!(renderer.render_text(&mut top), "a\n\nb\n");

    let mut bottom = Node::column([Node::column([
        Node::text("a"),
        Node::boxed([]).with_prop("paddingBottom", 1),
        Node::text("b"),
    ])]);
    assert_eq!(renderer.render_text(&mut bottom), "a\n\nb\n");

    let mut alone = Node::column([Node::boxed([]).with_prop("paddingTop", 1)]);
    assert_eq!(renderer.render_text(&mut alone), "\n");
}

#[test]
fn test_column_child_wraps_to_column_width() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);
    let mut root = Node::column([Node::column([
        Node::text("aaa bbb").with_metrics(LayoutMetrics::new(0, 0, 3, 1))
    ])
    .with_metrics(LayoutMetrics::new(0, 0, 10, 1))]);

    assert_eq!(renderer.render_text(&mut root), "aaa bbb\n");
}

// =============================================================================
// Click regions
// =============================================================================

#[test]
fn test_nested_region_has_absolute_position() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);
    let mut root = Node::column([Node::column([
        Node::text("a"),
        Node::text("btn")
            .with_click_id("b")
            .with_metrics(LayoutMetrics::new(3, 0, 3, 1)),
    ])
    .with_metrics(LayoutMetrics::new(0, 0, 10, 2))]);

    let out = renderer.render(&mut root);
    assert_eq!(out.text, "a\n   btn\n");
    assert_eq!(out.regions.len(), 1);

    let region = &out.regions[0];
    assert_eq!(region.component_id, "b");
    assert_eq!((region.x, region.y, region.width, region.height), (3, 1, 3, 1));
    assert_eq!(region.depth, 2);
    assert_eq!(region.node_type, "text");
}

#[test]
fn test_top_level_child_text_matches_region() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);
    let mut root = Node::column([
        Node::text("go")
            .with_click_id("go")
            .with_metrics(LayoutMetrics::new(4, 0, 2, 1)),
    ]);

    let out = renderer.render(&mut root);
    assert_eq!(out.text, "    go\n");
    let region = &out.regions[0];
    assert_eq!((region.x, region.y, region.width), (4, 0, 2));
    assert_eq!(out.text.find("go"), Some(region.x as usize));
}

#[test]
fn test_cached_subtree_replays_regions() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);
    let mut root = Node::column([Node::column([
        Node::text("a"),
        Node::text("btn")
            .with_click_id("b")
            .with_metrics(LayoutMetrics::new(3, 0, 3, 1)),
    ])
    .with_metrics(LayoutMetrics::new(0, 0, 10, 2))]);

    let first = renderer.render(&mut root);
    let second = renderer.render(&mut root);
    assert_eq!(second.stats.fresh_renders, 0);
    assert_eq!(first.regions, second.regions);
    assert_eq!(root.click_regions(), second.regions.as_slice());
}

#[test]
fn test_zero_sized_regions_are_dropped() {
    let registry = HandlerRegistry::with_defaults();
    let renderer = Renderer::new(&registry);
    let mut root = Node::column([
        Node::text("x")
            .with_click_id("zero-width")
            .with_metrics(LayoutMetrics::new(0, 0, 0, 1)),
        Node::text("").with_click_id("empty"),
        Node::text("ok").with_click_id("ok"),
    ]);

    let out = renderer.render(&mut root);
    let ids: Vec<&str> = out.regions.iter().map(|r| r.component_id.as_str()).collect();
    assert_eq!(ids, vec!["ok"]);
    assert_eq!((out.regions[0].width, out.regions[0].height), (2, 1));
}

// =============================================================================
// Engine with Taffy
// =============================================================================

#[test]
fn test_taffy_row_places_children_by_x() {
    let mut engine = engine(20, 5);
    let mut root = Node::column([Node::row([Node::text("left"), Node::text("right")]).with_prop("gap", 1)]);
    let out = engine.frame(&mut root).unwrap();
    assert_eq!(out.text, "left right\n");
}

#[test]
fn test_taffy_text_wraps_to_width() {
    let mut engine = engine(20, 5);
    let mut root = Node::column([Node::text("hello world").with_prop("width", 5)]);
    let out = engine.frame(&mut root).unwrap();
    assert_eq!(out.text, "hello\nworld\n");
    assert_eq!(root.child(0).and_then(Node::metrics).map(|m| m.height), Some(2));
}

#[test]
fn test_taffy_region_follows_layout() {
    let mut engine = engine(20, 5);
    let mut root = Node::column([Node::text("title"), Node::text("press").with_click_id("go")]);
    let out = engine.frame(&mut root).unwrap();

    let region = out.regions.iter().find(|r| r.component_id == "go").unwrap();
    assert_eq!((region.x, region.y, region.height), (0, 1, 1));
    assert!(region.width >= 5);
}

#[test]
fn test_no_layout_engine_uses_hand_geometry() {
    let mut engine = engine(20, 5).with_layout(NoLayout);
    let mut root = Node::column([Node::text("abc")]);
    assert_eq!(engine.frame(&mut root).unwrap().text, "abc\n");
    assert!(root.child(0).and_then(Node::metrics).is_none());
}

#[test]
fn test_taffy_padded_root_indents_top_level_children() {
    let mut engine = engine(20, 5);
    let mut root = Node::column([Node::text("go").with_click_id("go")]).with_prop("paddingLeft", 4);
    let out = engine.frame(&mut root).unwrap();

    assert_eq!(out.text, "    go\n");
    assert_eq!(hit_test(&out.regions, 4, 0).map(|r| r.component_id.as_str()), Some("go"));
    assert!(hit_test(&out.regions, 0, 0).is_none());
}
