//! Raw bytes through tokenizer, decoders, focus ring and dispatch chain.

use std::cell::RefCell;
use std::rc::Rc;

use termflow::{
    decode_key, decode_mouse, hit_test, ClickRegion, Dispatch, FocusManager, FocusOptions,
    InputEvent, InputManager, Key, MouseAction, MouseButton,
};

// =============================================================================
// Decoding tables
// =============================================================================

#[test]
fn test_key_table() {
    assert_eq!(decode_key("\x1b[A").key, Key::Up);

    let ctrl_c = decode_key("\x03");
    assert_eq!(ctrl_c.key, Key::Char);
    assert_eq!(ctrl_c.ch.as_deref(), Some("\x03"));
    assert!(ctrl_c.ctrl());
    assert!(ctrl_c.is_ctrl_c());

    assert_eq!(decode_key("\t").key, Key::Tab);

    let a = decode_key("a");
    assert_eq!((a.key, a.ch.as_deref(), a.shift()), (Key::Char, Some("a"), false));
    assert!(decode_key("A").shift());

    let left = decode_key("\x1b[1;6D");
    assert_eq!(left.key, Key::Left);
    assert!(left.shift() && left.ctrl() && !left.alt());

    assert_eq!(decode_key("\r").key, Key::Enter);
    let newline = decode_key("\n");
    assert_eq!(newline.key, Key::Enter);
    assert!(newline.shift());

    let unknown = decode_key("\x1b[99x");
    assert_eq!(unknown.key, Key::Unknown);
    assert_eq!(unknown.ch.as_deref(), Some("\x1b[99x"));
}

#[test]
fn test_non_ascii_char_has_no_modifiers() {
    let ev = decode_key("é");
    assert_eq!(ev.key, Key::Char);
    assert_eq!(ev.ch.as_deref(), Some("é"));
    assert!(ev.modifiers.is_empty());
}

#[test]
fn test_mouse_table() {
    let click = decode_mouse(b"\x1b[<20;12;8M").unwrap();
    assert_eq!(click.action.name(), "left_click");
    assert_eq!((click.x, click.y), (12, 8));
    assert!(click.shift() && click.ctrl());

    let release = decode_mouse(b"\x1b[<0;7;3m").unwrap();
    assert_eq!(release.action.name(), "left_release");
    assert_eq!((release.x, release.y), (7, 3));

    assert_eq!(decode_mouse(b"\x1b[<96;5;4M").unwrap().action, MouseAction::WheelUp);

    let wheel = decode_mouse(b"\x1b[65;10;11M").unwrap();
    assert_eq!(wheel.action, MouseAction::WheelDown);
    assert_eq!((wheel.x, wheel.y), (10, 11));

    assert!(decode_mouse(b"\x1b[<1;2M").is_none());
}

// =============================================================================
// Focus
// =============================================================================

#[test]
fn test_focus_ring_skips_ineligible() {
    let mut fm = FocusManager::new();
    fm.register("A", FocusOptions::disabled(), Box::new(|_| false));
    fm.register("B", FocusOptions::default(), Box::new(|_| false));
    fm.register("C", FocusOptions::global(), Box::new(|_| false));

    fm.blur();
    assert!(fm.focus_next());
    assert_eq!(fm.focused(), Some("B"));
}

#[test]
fn test_focus_ring_all_disabled() {
    let mut fm = FocusManager::new();
    fm.register("A", FocusOptions::disabled(), Box::new(|_| false));
    fm.register("B", FocusOptions::disabled(), Box::new(|_| false));
    assert!(!fm.focus_next());
    assert_eq!(fm.focused(), None);
}

// =============================================================================
// Dispatch
// =============================================================================

type Log = Rc<RefCell<Vec<String>>>;

fn recorder(log: &Log, name: &'static str, consume: bool) -> Box<dyn FnMut(&termflow::KeyEvent) -> bool> {
    let log = log.clone();
    Box::new(move |ev| {
        log.borrow_mut().push(format!("{name}:{ev}"));
        consume
    })
}

#[test]
fn test_priority_viewport_then_focused_then_global() {
    let log: Log = Rc::default();
    let mut im = InputManager::default();
    im.register("field", FocusOptions::default(), recorder(&log, "field", false));
    im.register("quit", FocusOptions::global(), recorder(&log, "quit", true));

    let viewport_log = log.clone();
    im.set_viewport_handler(Box::new(move |ev| {
        if let InputEvent::Key(k) = ev {
            viewport_log.borrow_mut().push(format!("viewport:{k}"));
            return k.first_char() == Some('v');
        }
        false
    }));

    assert_eq!(im.feed(b"v"), vec![Dispatch::Viewport]);
    assert_eq!(im.feed(b"q"), vec![Dispatch::Global("quit".into())]);
    assert_eq!(
        *log.borrow(),
        vec!["viewport:v", "viewport:q", "field:q", "quit:q"]
    );
}

#[test]
fn test_focused_consumer_stops_chain() {
    let log: Log = Rc::default();
    let mut im = InputManager::default();
    im.register("field", FocusOptions::default(), recorder(&log, "field", true));
    im.register("quit", FocusOptions::global(), recorder(&log, "quit", true));

    assert_eq!(im.feed(b"x"), vec![Dispatch::Focused("field".into())]);
    assert_eq!(*log.borrow(), vec!["field:x"]);
}

#[test]
fn test_tab_cycles_and_is_not_delivered() {
    let log: Log = Rc::default();
    let mut im = InputManager::default();
    im.register("a", FocusOptions::default(), recorder(&log, "a", true));
    im.register("b", FocusOptions::default(), recorder(&log, "b", true));

    assert_eq!(im.feed(b"\t"), vec![Dispatch::FocusMoved(Some("b".into()))]);
    assert_eq!(im.feed(b"\x1b[Z"), vec![Dispatch::FocusMoved(Some("a".into()))]);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_chunked_sgr_click_hits_region() {
    let regions = vec![
        ClickRegion {
            component_id: "panel".into(),
            x: 0,
            y: 0,
            width: 20,
            height: 10,
            depth: 1,
            node_type: "box".into(),
        },
        ClickRegion {
            component_id: "button".into(),
            x: 10,
            y: 6,
            width: 4,
            height: 1,
            depth: 2,
            node_type: "text".into(),
        },
    ];

    let clicked: Rc<RefCell<Vec<String>>> = Rc::default();
    let mut im = InputManager::default();
    let sink = clicked.clone();
    im.set_viewport_handler(Box::new(move |ev| {
        let InputEvent::Mouse(m) = ev else {
            return false;
        };
        if m.action != MouseAction::Click(MouseButton::Left) {
            return false;
        }
        let (x, y) = m.cell();
        match hit_test(&regions, x, y) {
            Some(r) => {
                sink.borrow_mut().push(r.component_id.clone());
                true
            }
            None => false,
        }
    }));

    assert!(im.feed(b"\x1b[<0;1").is_empty());
    assert!(im.has_pending());
    assert_eq!(im.feed(b"2;7M"), vec![Dispatch::Viewport]);
    assert_eq!(im.feed(b"\x1b[<0;2;2M"), vec![Dispatch::Viewport]);
    assert_eq!(im.feed(b"\x1b[<0;50;50M"), vec![Dispatch::Unhandled]);
    assert_eq!(*clicked.borrow(), vec!["button", "panel"]);
}

#[test]
fn test_lone_escape_needs_flush() {
    let log: Log = Rc::default();
    let mut im = InputManager::default();
    im.register("a", FocusOptions::default(), recorder(&log, "a", true));

    assert!(im.feed(b"\x1b").is_empty());
    assert_eq!(im.flush_pending(), vec![Dispatch::Focused("a".into())]);
    assert_eq!(*log.borrow(), vec!["a:escape"]);
}

#[test]
fn test_ctrl_c_from_bytes_exits() {
    let log: Log = Rc::default();
    let mut im = InputManager::default();
    im.register("a", FocusOptions::default(), recorder(&log, "a", true));

    assert_eq!(im.feed(b"ab\x03"), vec![
        Dispatch::Focused("a".into()),
        Dispatch::Focused("a".into()),
        Dispatch::Exit,
    ]);
    assert!(im.exit_requested());
}
