//! Pipeline - viewport → layout → render.
//!
//! # Frame
//!
//! ```text
//! InvalidationQueue::apply   timer/animation paths marked dirty
//!   → GeometryProvider        metrics for every node (dirty on change)
//!   → Renderer::render        memoized text + click regions
//! ```
//!
//! [`Engine::frame`] runs exactly one pass. Nothing here renders on its own:
//! invalidations only mark nodes, and the caller decides when the next frame
//! happens (after input, on resize, or when a [`TreeSource`] reports a
//! change via [`Engine::pump`]).

pub mod terminal;

pub use terminal::{write_frame, TerminalSession};

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::config::EngineConfig;
use crate::engine::Node;
use crate::error::Result;
use crate::layout::{GeometryProvider, TaffyLayout};
use crate::renderer::{HandlerRegistry, RenderOutput, Renderer};
use crate::state::Viewport;

// =============================================================================
// Tree Source
// =============================================================================

/// What a [`TreeSource`] did to the tree since it was last polled.
#[derive(Debug)]
pub enum TreeUpdate {
    /// Nothing changed.
    Unchanged,
    /// Swap in a whole new tree.
    Replace(Node),
    /// Nodes at these paths (from the root) changed in place.
    Patched(Vec<Vec<usize>>),
}

/// Diff-on-demand boundary to whatever produces the node tree.
///
/// Implementations may mutate `tree` through the node API (which keeps
/// dirty flags current) and report the touched paths, or hand back a
/// replacement.
pub trait TreeSource {
    fn poll_tree(&mut self, tree: &mut Node) -> TreeUpdate;
}

// =============================================================================
// Invalidation Queue
// =============================================================================

/// Paths to mark dirty at the start of the next frame.
///
/// Clones share one queue, so a timer callback can hold its own handle.
#[derive(Debug, Clone, Default)]
pub struct InvalidationQueue {
    pending: Rc<RefCell<Vec<Vec<usize>>>>,
}

impl InvalidationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&self, path: impl Into<Vec<usize>>) {
        self.pending.borrow_mut().push(path.into());
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Mark every queued path dirty. Returns how many still resolved to a
    /// node.
    pub fn apply(&self, root: &mut Node) -> usize {
        let paths = std::mem::take(&mut *self.pending.borrow_mut());
        paths.iter().filter(|path| root.mark_dirty_at(path)).count()
    }
}

// =============================================================================
// Engine
// =============================================================================

pub struct Engine {
    config: EngineConfig,
    viewport: Viewport,
    layout: Box<dyn GeometryProvider>,
    handlers: HandlerRegistry,
    invalidations: InvalidationQueue,
    rendered_version: Option<u64>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("viewport", &self.viewport.size())
            .field("handlers", &self.handlers)
            .field("pending_invalidations", &self.invalidations.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Engine sized to the terminal, with Taffy layout and the built-in
    /// handlers.
    pub fn new(config: EngineConfig) -> Self {
        let viewport = Viewport::detect(&config);
        Self::with_viewport(config, viewport)
    }

    pub fn with_viewport(config: EngineConfig, viewport: Viewport) -> Self {
        let handlers = HandlerRegistry::with_text_cache(config.wrap_cache_entries, config.wrap_cache_weight);
        Self {
            config,
            viewport,
            layout: Box::new(TaffyLayout::new()),
            handlers,
            invalidations: InvalidationQueue::new(),
            rendered_version: None,
        }
    }

    /// Replace the geometry provider.
    pub fn with_layout(mut self, layout: impl GeometryProvider + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Register custom handlers between frames.
    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    /// A handle for timers and animations.
    pub fn invalidation_queue(&self) -> InvalidationQueue {
        self.invalidations.clone()
    }

    /// Run one full pass over `root`.
    pub fn frame(&mut self, root: &mut Node) -> Result<RenderOutput> {
        let applied = self.invalidations.apply(root);

        let version = self.viewport.version();
        if self.rendered_version.is_some_and(|v| v != version) {
            debug!(version, "viewport changed, invalidating tree");
            root.invalidate_all();
        }
        self.rendered_version = Some(version);

        let (width, height) = self.viewport.size();
        let height = self.config.constrain_height.then_some(height);
        self.layout.compute(root, width, height)?;

        let output = Renderer::new(&self.handlers).render(root);
        debug!(width, applied, lines = output.text.lines().count(), "frame");
        Ok(output)
    }

    /// Poll `source` and render only if something changed (tree, queued
    /// invalidations or viewport).
    pub fn pump(&mut self, source: &mut impl TreeSource, tree: &mut Node) -> Result<Option<RenderOutput>> {
        match source.poll_tree(tree) {
            TreeUpdate::Unchanged => {
                let resized = self.rendered_version != Some(self.viewport.version());
                if self.invalidations.is_empty() && !resized {
                    return Ok(None);
                }
            }
            TreeUpdate::Replace(next) => *tree = next,
            TreeUpdate::Patched(paths) => {
                for path in &paths {
                    tree.mark_dirty_at(path);
                }
            }
        }
        self.frame(tree).map(Some)
    }
}
