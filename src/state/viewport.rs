//! Viewport signals.
//!
//! Terminal width/height as reactive signals plus a resize counter. The
//! [`Viewport`] handle is cheap to clone: every clone shares the same
//! signals, so the engine and the authoring layer observe the same size.

use spark_signals::{derived, signal, Derived, Signal};
use tracing::debug;

use crate::config::EngineConfig;

#[derive(Clone)]
pub struct Viewport {
    width: Signal<u16>,
    height: Signal<u16>,
    version: Signal<u64>,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: signal(width),
            height: signal(height),
            version: signal(0),
        }
    }

    /// Viewport sized to the terminal, or the configured fallback when the
    /// terminal cannot be queried.
    pub fn detect(config: &EngineConfig) -> Self {
        let viewport = Self::new(config.fallback_width, config.fallback_height);
        viewport.refresh();
        viewport
    }

    pub fn width(&self) -> u16 {
        self.width.get()
    }

    pub fn height(&self) -> u16 {
        self.height.get()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width.get(), self.height.get())
    }

    /// Bumped on every effective resize.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Apply a new size. Returns `false` when nothing changed.
    pub fn resize(&self, width: u16, height: u16) -> bool {
        if self.size() == (width, height) {
            return false;
        }
        self.width.set(width);
        self.height.set(height);
        self.version.set(self.version.get() + 1);
        debug!(width, height, "viewport resized");
        true
    }

    /// Re-query the terminal. Keeps the current size when that fails.
    pub fn refresh(&self) -> bool {
        match crossterm::terminal::size() {
            Ok((w, h)) if w > 0 && h > 0 => self.resize(w, h),
            _ => false,
        }
    }

    pub fn width_signal(&self) -> Signal<u16> {
        self.width.clone()
    }

    pub fn height_signal(&self) -> Signal<u16> {
        self.height.clone()
    }

    /// Derived `(width, height)` for reactive consumers.
    pub fn size_derived(&self) -> Derived<(u16, u16)> {
        let width = self.width.clone();
        let height = self.height.clone();
        derived(move || (width.get(), height.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_bumps_version() {
        let viewport = Viewport::new(80, 24);
        assert_eq!(viewport.version(), 0);

        assert!(viewport.resize(100, 30));
        assert_eq!(viewport.size(), (100, 30));
        assert_eq!(viewport.version(), 1);

        assert!(!viewport.resize(100, 30));
        assert_eq!(viewport.version(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let viewport = Viewport::new(80, 24);
        let other = viewport.clone();
        other.resize(40, 10);
        assert_eq!(viewport.size(), (40, 10));
        assert_eq!(viewport.width_signal().get(), 40);
    }

    #[test]
    fn test_size_derived_tracks_signals() {
        let viewport = Viewport::new(80, 24);
        let size = viewport.size_derived();
        assert_eq!(size.get(), (80, 24));

        viewport.resize(120, 40);
        assert_eq!(size.get(), (120, 40));
    }
}
