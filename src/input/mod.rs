//! Input - raw terminal bytes to routed events.
//!
//! # Pipeline
//!
//! ```text
//! stdin thread → InputTokenizer → decode_key / decode_mouse → InputManager
//!                                                              ├─ exit / toggle / Tab
//!                                                              ├─ viewport handler
//!                                                              ├─ focused component
//!                                                              └─ global components
//! ```
//!
//! Decoding never fails: unknown key sequences become [`Key::Unknown`] and
//! malformed mouse reports are dropped.

mod focus;
mod keyboard;
mod manager;
mod mouse;
mod parser;
mod reader;

pub use focus::{FocusManager, FocusOptions, KeyHandler};
pub use keyboard::{decode_key, decode_modifier_param, Key, KeyBinding, KeyEvent, Modifiers};
pub use manager::{Dispatch, EventHandler, InputEvent, InputManager};
pub use mouse::{decode_mouse, MouseAction, MouseButton, MouseEvent};
pub use parser::{InputTokenizer, Token};
pub use reader::{StdinMessage, StdinReader, ESCAPE_TIMEOUT_MS};
