//! State - render-pass and terminal state shared with the input layer.
//!
//! - [`click`]: click-region tracking and hit testing
//! - [`viewport`]: reactive terminal size

pub mod click;
pub mod viewport;

pub use click::{hit_test, ClickRegion, ClickTracker};
pub use viewport::Viewport;
