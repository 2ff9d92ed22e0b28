//! Layout Types
//!
//! Geometry produced by a [`GeometryProvider`](super::GeometryProvider) and
//! consumed by the flow composers.

/// Resolved box of one node, in terminal cells.
///
/// `x`/`y` are relative to the parent's border box. The root is positioned
/// relative to the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LayoutMetrics {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl LayoutMetrics {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
