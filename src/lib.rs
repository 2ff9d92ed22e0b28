//! # termflow
//!
//! Terminal rendering engine: a node tree rendered to styled text, with
//! memoized output, click regions for pointer hit testing, and an input
//! layer that turns raw terminal bytes into routed key and mouse events.
//!
//! ## Architecture
//!
//! ```text
//! Node tree → GeometryProvider (Taffy) → Renderer (handlers + flow composer) → text + click regions
//! stdin bytes → InputTokenizer → decode_key / decode_mouse → InputManager → focus ring / viewport
//! ```
//!
//! Every node caches its last output. A pass only re-renders nodes that are
//! dirty, have dirty descendants, or are asked for a different width or
//! height than last time; everything else is returned verbatim and its
//! click regions are replayed.
//!
//! ## Modules
//!
//! - [`engine`] - Node tree, props, dirty flags
//! - [`layout`] - Geometry provider seam, Taffy bridge, text measurement
//! - [`renderer`] - Handler registry, flow composer, memoized renderer
//! - [`cache`] - FNV-1a content hash, bounded LRU cache
//! - [`state`] - Click-region tracking, reactive viewport
//! - [`input`] - Tokenizer, key/mouse decoding, focus, dispatch
//! - [`pipeline`] - Engine, tree sources, invalidation queue, terminal session

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod layout;
pub mod pipeline;
pub mod renderer;
pub mod state;

pub use config::{EngineConfig, InputConfig};
pub use engine::{kind, Node, PropValue, Props};
pub use error::{Error, Result};
pub use input::{
    decode_key, decode_mouse, Dispatch, FocusManager, FocusOptions, InputEvent, InputManager,
    InputTokenizer, Key, KeyBinding, KeyEvent, Modifiers, MouseAction, MouseButton, MouseEvent,
};
pub use layout::{GeometryProvider, LayoutMetrics, NoLayout, TaffyLayout};
pub use pipeline::{Engine, InvalidationQueue, TerminalSession, TreeSource, TreeUpdate};
pub use renderer::{HandlerRegistry, RenderContext, RenderHandler, RenderOutput, Renderer};
pub use state::{hit_test, ClickRegion, ClickTracker, Viewport};
