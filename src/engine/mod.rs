//! Engine - the node tree and its props.
//!
//! Nodes own their children directly; there is no global registry. A node's
//! render state (cached output, dirty flags, cached click regions) lives on
//! the node itself so invalidation is a local operation.

mod node;
mod props;

pub use node::{kind, Node, NodePath, RenderKey, RenderState};
pub use props::{is_layout_prop, PropValue, Props, LAYOUT_PROPS};
