//! Renderer - node tree to text.
//!
//! # Architecture
//!
//! ```text
//! Renderer::render(root)
//!   └─ render_node(child)            memoized: cached output + replayed regions
//!        └─ handler.render(ctx)      box / row / column / text / custom
//!             └─ ctx.render_child()  back into render_node, one level deeper
//! ```
//!
//! Handlers are looked up in a [`HandlerRegistry`] built once and lent to
//! the [`Renderer`]. Width and height constraints travel down as
//! [`RenderOverrides`] values; nothing is written onto nodes except their
//! own cache state.

mod context;
mod flow;
mod handlers;
mod registry;
mod render;

pub use context::{ChildPlacement, RenderContext, RenderOverrides, RenderStats};
pub use flow::{compose_column, compose_row, vertical_padding};
pub use handlers::{parse_color, text_style, BoxHandler, ColumnHandler, RowHandler, TextHandler};
pub use registry::{HandlerRegistry, RenderHandler};
pub use render::{RenderOutput, Renderer};
