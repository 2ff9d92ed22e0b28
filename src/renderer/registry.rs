//! Handler Registry - node type to render handler.
//!
//! The table is built once at startup and lent to the renderer by
//! reference. Handlers are looked up by the node's type string; types with
//! no handler take the renderer's fallback path.

use std::collections::HashMap;
use std::fmt;

use crate::engine::kind;

use super::context::RenderContext;
use super::handlers::{BoxHandler, ColumnHandler, RowHandler, TextHandler};

/// Converts one node, plus its resolved geometry, into text.
pub trait RenderHandler {
    fn render(&self, ctx: &mut RenderContext<'_, '_>) -> String;
}

/// Adapter so plain closures can be registered.
struct FnHandler<F>(F);

impl<F> RenderHandler for FnHandler<F>
where
    F: Fn(&mut RenderContext<'_, '_>) -> String,
{
    fn render(&self, ctx: &mut RenderContext<'_, '_>) -> String {
        (self.0)(ctx)
    }
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn RenderHandler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("HandlerRegistry").field("types", &types).finish()
    }
}

impl HandlerRegistry {
    /// Empty registry. Every type renders through the fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `box`, `row`, `column` and `text` handlers.
    pub fn with_defaults() -> Self {
        Self::with_text_cache(
            crate::config::DEFAULT_WRAP_CACHE_ENTRIES,
            crate::config::DEFAULT_WRAP_CACHE_WEIGHT,
        )
    }

    /// Built-ins, with the text handler's wrap cache sized explicitly.
    pub fn with_text_cache(entries: usize, weight: usize) -> Self {
        let mut registry = Self::new();
        registry.register(kind::BOX, BoxHandler);
        registry.register(kind::ROW, RowHandler);
        registry.register(kind::COLUMN, ColumnHandler);
        registry.register(kind::TEXT, TextHandler::new(entries, weight));
        registry
    }

    /// Register a handler, returning the one it replaces.
    pub fn register(
        &mut self,
        node_type: impl Into<String>,
        handler: impl RenderHandler + 'static,
    ) -> Option<Box<dyn RenderHandler>> {
        self.handlers.insert(node_type.into(), Box::new(handler))
    }

    /// Register a closure as a handler.
    pub fn register_fn<F>(&mut self, node_type: impl Into<String>, f: F) -> Option<Box<dyn RenderHandler>>
    where
        F: Fn(&mut RenderContext<'_, '_>) -> String + 'static,
    {
        self.register(node_type, FnHandler(f))
    }

    pub fn get(&self, node_type: &str) -> Option<&dyn RenderHandler> {
        self.handlers.get(node_type).map(|h| h.as_ref())
    }

    pub fn has(&self, node_type: &str) -> bool {
        self.handlers.contains_key(node_type)
    }

    pub fn unregister(&mut self, node_type: &str) -> Option<Box<dyn RenderHandler>> {
        self.handlers.remove(node_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_builtin_kinds() {
        let registry = HandlerRegistry::with_defaults();
        for t in [kind::BOX, kind::ROW, kind::COLUMN, kind::TEXT] {
            assert!(registry.has(t), "missing {t}");
        }
        assert!(!registry.has(kind::COMMENT));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_register_replaces_and_unregisters() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register_fn("badge", |_ctx| "[b]".to_string()).is_none());
        assert!(registry.register_fn("badge", |_ctx| "[B]".to_string()).is_some());
        assert!(registry.get("badge").is_some());

        assert!(registry.unregister("badge").is_some());
        assert!(!registry.has("badge"));
        assert!(registry.get("badge").is_none());
    }

    #[test]
    fn test_debug_lists_types() {
        let registry = HandlerRegistry::with_defaults();
        let dbg = format!("{registry:?}");
        assert!(dbg.contains("\"column\""));
    }
}
