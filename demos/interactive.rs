//! Interactive demo - counter with a clickable button and a focus ring.
//!
//! - click "[ + ]" or press Enter on it to increment
//! - Tab / Shift+Tab to move focus between the two buttons
//! - `r` resets (global shortcut)
//! - Ctrl+C exits
//!
//! Logs go to `termflow-demo.log`; set `RUST_LOG=termflow=trace` to see
//! every decoded key.
//!
//! Run with: cargo run --example interactive

use std::cell::RefCell;
use std::fs::File;
use std::rc::Rc;
use std::sync::Mutex;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use spark_signals::{signal, Signal};
use termflow::input::{StdinMessage, StdinReader, ESCAPE_TIMEOUT_MS};
use termflow::{
    hit_test, ClickRegion, Engine, EngineConfig, FocusOptions, InputConfig, InputEvent,
    InputManager, Key, MouseAction, MouseButton, Node, TerminalSession, TreeSource, TreeUpdate,
};
use tracing_subscriber::EnvFilter;

/// Rebuilds the tree when the counter or focus changes.
struct CounterView {
    count: Signal<i64>,
    focused: Rc<RefCell<Option<String>>>,
    shown: Option<(i64, Option<String>)>,
}

impl CounterView {
    fn button(&self, id: &str, label: &str) -> Node {
        let focused = self.focused.borrow().as_deref() == Some(id);
        Node::text(label)
            .with_click_id(id)
            .with_prop("bold", focused)
            .with_prop("color", if focused { "cyan" } else { "white" })
    }

    fn build(&self, count: i64) -> Node {
        Node::column([
            Node::text("termflow demo").with_prop("bold", true),
            Node::text(format!("Count: {count}")),
            Node::row([
                self.button("inc", "[ + ]"),
                Node::text("  "),
                self.button("dec", "[ - ]"),
            ]),
            Node::text("Tab to move focus, Enter to press, r to reset, Ctrl+C to exit")
                .with_prop("dim", true),
        ])
        .with_prop("padding", 1)
    }
}

impl TreeSource for CounterView {
    fn poll_tree(&mut self, _tree: &mut Node) -> TreeUpdate {
        let state = (self.count.get(), self.focused.borrow().clone());
        if self.shown.as_ref() == Some(&state) {
            return TreeUpdate::Unchanged;
        }
        let tree = self.build(state.0);
        self.shown = Some(state);
        TreeUpdate::Replace(tree)
    }
}

fn press(count: &Signal<i64>, id: &str) -> bool {
    match id {
        "inc" => count.set(count.get() + 1),
        "dec" => count.set(count.get() - 1),
        _ => return false,
    };
    true
}

fn main() -> termflow::Result<()> {
    let log = File::create("termflow-demo.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let count = signal(0i64);
    let focused = Rc::new(RefCell::new(None));
    let regions: Rc<RefCell<Vec<ClickRegion>>> = Rc::new(RefCell::new(Vec::new()));

    let mut input = InputManager::new(InputConfig::default());
    for id in ["inc", "dec"] {
        let count = count.clone();
        input.register(
            id,
            FocusOptions::default(),
            Box::new(move |event| event.key == Key::Enter && press(&count, id)),
        );
    }
    input.register("reset", FocusOptions::global(), {
        let count = count.clone();
        Box::new(move |event| {
            if event.first_char() == Some('r') {
                count.set(0);
                return true;
            }
            false
        })
    });
    input.set_viewport_handler({
        let count = count.clone();
        let regions = regions.clone();
        Box::new(move |event| {
            let InputEvent::Mouse(mouse) = event else {
                return false;
            };
            if mouse.action != MouseAction::Click(MouseButton::Left) {
                return false;
            }
            let (x, y) = mouse.cell();
            let regions = regions.borrow();
            hit_test(&regions, x, y).is_some_and(|r| press(&count, &r.component_id))
        })
    });

    let mut engine = Engine::new(EngineConfig::from_env());
    let mut view = CounterView {
        count: count.clone(),
        focused: focused.clone(),
        shown: None,
    };
    let mut tree = Node::column([]);

    let mut session = TerminalSession::enter(true)?;
    let (_reader, rx) = StdinReader::spawn()?;
    let timeout = Duration::from_millis(ESCAPE_TIMEOUT_MS);

    while !input.exit_requested() {
        engine.viewport().refresh();
        *focused.borrow_mut() = input.focus().focused().map(str::to_string);
        if let Some(frame) = engine.pump(&mut view, &mut tree)? {
            session.draw(&frame.text)?;
            *regions.borrow_mut() = frame.regions;
        }

        match rx.recv_timeout(timeout) {
            Ok(StdinMessage::Data(bytes)) => {
                input.feed(&bytes);
            }
            Ok(StdinMessage::Closed) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if input.has_pending() {
                    input.flush_pending();
                }
            }
        }
    }

    session.restore()
}
