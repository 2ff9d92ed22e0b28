//! Engine and input configuration.
//!
//! Plain structs with defaults and `with_*` builders. The only environment
//! inputs are `COLUMNS`/`LINES`, consulted as the fallback viewport size
//! when the terminal itself cannot be queried.

use crate::input::KeyBinding;

/// Viewport size used when the terminal cannot report one.
pub const DEFAULT_VIEWPORT: (u16, u16) = (80, 24);

/// Default entry ceiling for the wrapped-text cache.
pub const DEFAULT_WRAP_CACHE_ENTRIES: usize = 256;

/// Default total-weight ceiling (cached line count) for the wrapped-text cache.
pub const DEFAULT_WRAP_CACHE_WEIGHT: usize = 20_000;

// =============================================================================
// Engine
// =============================================================================

/// Render pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Width used when the terminal size is unavailable.
    pub fallback_width: u16,
    /// Height used when the terminal size is unavailable.
    pub fallback_height: u16,
    /// Constrain layout to the viewport height (fullscreen) instead of
    /// letting content grow downward.
    pub constrain_height: bool,
    /// Maximum number of entries in the wrapped-text cache.
    pub wrap_cache_entries: usize,
    /// Maximum total cached lines in the wrapped-text cache.
    pub wrap_cache_weight: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_width: DEFAULT_VIEWPORT.0,
            fallback_height: DEFAULT_VIEWPORT.1,
            constrain_height: false,
            wrap_cache_entries: DEFAULT_WRAP_CACHE_ENTRIES,
            wrap_cache_weight: DEFAULT_WRAP_CACHE_WEIGHT,
        }
    }
}

impl EngineConfig {
    /// Defaults, with the fallback viewport taken from `COLUMNS`/`LINES`
    /// when they hold positive integers.
    pub fn from_env() -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.trim().parse::<u16>().ok())
                .filter(|&v| v > 0)
        };

        let mut config = Self::default();
        if let Some(cols) = read("COLUMNS") {
            config.fallback_width = cols;
        }
        if let Some(lines) = read("LINES") {
            config.fallback_height = lines;
        }
        config
    }

    pub fn with_fallback_size(mut self, width: u16, height: u16) -> Self {
        self.fallback_width = width;
        self.fallback_height = height;
        self
    }

    pub fn with_constrain_height(mut self, constrain: bool) -> Self {
        self.constrain_height = constrain;
        self
    }

    pub fn with_wrap_cache(mut self, entries: usize, weight: usize) -> Self {
        self.wrap_cache_entries = entries;
        self.wrap_cache_weight = weight;
        self
    }
}

// =============================================================================
// Input
// =============================================================================

/// Input dispatch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputConfig {
    /// Global toggle shortcut (dispatch step 2). `None` disables the step.
    pub toggle_key: Option<KeyBinding>,
    /// Tab / Shift+Tab cycle the focus ring.
    pub tab_navigation: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            toggle_key: None,
            tab_navigation: true,
        }
    }
}

impl InputConfig {
    pub fn with_toggle_key(mut self, binding: KeyBinding) -> Self {
        self.toggle_key = Some(binding);
        self
    }

    pub fn with_tab_navigation(mut self, enabled: bool) -> Self {
        self.tab_navigation = enabled;
        self
    }
}
