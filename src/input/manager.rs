//! Input dispatch.
//!
//! [`InputManager`] owns the tokenizer and the focus ring and routes every
//! decoded event. Keys go through a fixed priority chain:
//!
//! 1. Ctrl+C requests exit
//! 2. the configured toggle shortcut
//! 3. Tab / Shift+Tab move focus (when enabled)
//! 4. the viewport handler, which may consume the event
//! 5. the focused component
//! 6. enabled non-focusable components, in registration order
//!
//! Mouse events skip the chain and go straight to the viewport handler,
//! which owns hit testing against the last pass's click regions.
//! Malformed mouse reports are dropped.

use tracing::{debug, trace};

use crate::config::InputConfig;

use super::focus::{FocusManager, FocusOptions, KeyHandler};
use super::keyboard::{decode_key, Key, KeyEvent};
use super::mouse::{decode_mouse, MouseEvent};
use super::parser::{InputTokenizer, Token};

/// A decoded input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

/// Where an event ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Ctrl+C.
    Exit,
    /// The toggle shortcut fired.
    Toggle,
    /// Tab navigation; carries the newly focused id.
    FocusMoved(Option<String>),
    /// The viewport handler consumed it.
    Viewport,
    /// The focused component consumed it.
    Focused(String),
    /// A global (non-focusable) component consumed it.
    Global(String),
    /// Nobody consumed it.
    Unhandled,
}

/// Viewport-level handler. Returns `true` when the event was consumed.
pub type EventHandler = Box<dyn FnMut(&InputEvent) -> bool>;

type Callback = Box<dyn FnMut()>;

/// Tokenizer + focus ring + dispatch chain.
pub struct InputManager {
    tokenizer: InputTokenizer,
    focus: FocusManager,
    config: InputConfig,
    viewport: Option<EventHandler>,
    on_toggle: Option<Callback>,
    on_exit: Option<Callback>,
    exit_requested: bool,
}

impl std::fmt::Debug for InputManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputManager")
            .field("focus", &self.focus)
            .field("config", &self.config)
            .field("exit_requested", &self.exit_requested)
            .finish_non_exhaustive()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

impl InputManager {
    pub fn new(config: InputConfig) -> Self {
        Self {
            tokenizer: InputTokenizer::new(),
            focus: FocusManager::new(),
            config,
            viewport: None,
            on_toggle: None,
            on_exit: None,
            exit_requested: false,
        }
    }

    pub fn set_viewport_handler(&mut self, handler: EventHandler) {
        self.viewport = Some(handler);
    }

    pub fn on_toggle(&mut self, callback: impl FnMut() + 'static) {
        self.on_toggle = Some(Box::new(callback));
    }

    pub fn on_exit(&mut self, callback: impl FnMut() + 'static) {
        self.on_exit = Some(Box::new(callback));
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn focus(&self) -> &FocusManager {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusManager {
        &mut self.focus
    }

    /// Shorthand for registering with the focus ring.
    pub fn register(&mut self, id: impl Into<String>, options: FocusOptions, handler: KeyHandler) {
        self.focus.register(id, options, handler);
    }

    pub fn has_pending(&self) -> bool {
        self.tokenizer.has_pending()
    }

    /// Feed raw bytes and dispatch every complete event.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Dispatch> {
        let tokens = self.tokenizer.feed(data);
        self.dispatch_tokens(tokens)
    }

    /// Dispatch whatever is still buffered (call after an input timeout).
    pub fn flush_pending(&mut self) -> Vec<Dispatch> {
        let tokens = self.tokenizer.flush_pending();
        self.dispatch_tokens(tokens)
    }

    fn dispatch_tokens(&mut self, tokens: Vec<Token>) -> Vec<Dispatch> {
        let mut results = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token {
                Token::Key(raw) => {
                    let event = decode_key(&raw);
                    trace!(raw = ?raw, key = %event, "key");
                    results.push(self.dispatch_key(event));
                }
                Token::Mouse(raw) => match decode_mouse(&raw) {
                    Some(event) => {
                        trace!(action = %event.action.name(), x = event.x, y = event.y, "mouse");
                        results.push(self.dispatch_mouse(event));
                    }
                    None => trace!(raw = ?String::from_utf8_lossy(&raw), "malformed mouse report"),
                },
            }
        }
        results
    }

    /// Route one key event through the priority chain.
    pub fn dispatch_key(&mut self, event: KeyEvent) -> Dispatch {
        if event.is_ctrl_c() {
            debug!("exit requested");
            self.exit_requested = true;
            if let Some(on_exit) = self.on_exit.as_mut() {
                on_exit();
            }
            return Dispatch::Exit;
        }

        if self.config.toggle_key.as_ref().is_some_and(|b| b.matches(&event)) {
            if let Some(on_toggle) = self.on_toggle.as_mut() {
                on_toggle();
            }
            return Dispatch::Toggle;
        }

        if self.config.tab_navigation && event.key == Key::Tab && !event.ctrl() && !event.alt() {
            if event.shift() {
                self.focus.focus_previous();
            } else {
                self.focus.focus_next();
            }
            return Dispatch::FocusMoved(self.focus.focused().map(str::to_string));
        }

        if let Some(viewport) = self.viewport.as_mut() {
            if viewport(&InputEvent::Key(event.clone())) {
                return Dispatch::Viewport;
            }
        }

        if self.focus.dispatch_focused(&event) {
            let id = self.focus.focused().unwrap_or_default().to_string();
            return Dispatch::Focused(id);
        }

        match self.focus.dispatch_global(&event) {
            Some(id) => Dispatch::Global(id),
            None => Dispatch::Unhandled,
        }
    }

    /// Hand a mouse event to the viewport handler.
    pub fn dispatch_mouse(&mut self, event: MouseEvent) -> Dispatch {
        if let Some(viewport) = self.viewport.as_mut() {
            if viewport(&InputEvent::Mouse(event)) {
                return Dispatch::Viewport;
            }
        }
        Dispatch::Unhandled
    }
}
