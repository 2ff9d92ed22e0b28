//! Layout - geometry for the node tree.
//!
//! # Architecture
//!
//! The renderer never computes geometry itself. A [`GeometryProvider`]
//! assigns [`LayoutMetrics`] to every node before a pass, and the flow
//! composers read them back. The default provider, [`TaffyLayout`], maps
//! node props onto [Taffy](https://github.com/DioxusLabs/taffy) flexbox
//! styles and measures text leaves by word-wrapping them.
//!
//! Providers must mark a node dirty whenever its geometry changes so that
//! memoized output is never reused at a stale size.

mod taffy_bridge;
mod text_measure;
mod types;

pub use taffy_bridge::TaffyLayout;
pub use text_measure::*;
pub use types::LayoutMetrics;

use crate::engine::Node;
use crate::error::Result;

/// Computes geometry for a tree.
pub trait GeometryProvider {
    /// Assign metrics to `root` and all descendants.
    ///
    /// `height` is `None` when content may grow past the viewport.
    fn compute(&mut self, root: &mut Node, width: u16, height: Option<u16>) -> Result<()>;
}

/// A provider that leaves geometry untouched.
///
/// For trees whose metrics are assigned by hand (or not at all, in which
/// case composers fall back to measuring rendered output).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLayout;

impl GeometryProvider for NoLayout {
    fn compute(&mut self, _root: &mut Node, _width: u16, _height: Option<u16>) -> Result<()> {
        Ok(())
    }
}
