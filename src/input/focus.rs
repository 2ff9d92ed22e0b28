//! Focus management.
//!
//! An ordered ring of registered components. Each entry carries a key
//! handler plus `disabled` and `focusable` flags:
//!
//! - enabled + focusable entries take part in Tab navigation
//! - enabled + non-focusable entries act as always-on global shortcuts
//! - disabled entries receive nothing
//!
//! The first eligible registration is focused automatically. Losing the
//! focused entry (disable, unregister, or turning it non-focusable) moves
//! focus to the next eligible entry, or clears it if there is none.

use tracing::debug;

use super::keyboard::KeyEvent;

/// A component key handler. Returns `true` when the event was consumed.
pub type KeyHandler = Box<dyn FnMut(&KeyEvent) -> bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusOptions {
    pub disabled: bool,
    pub focusable: bool,
}

impl Default for FocusOptions {
    fn default() -> Self {
        Self {
            disabled: false,
            focusable: true,
        }
    }
}

impl FocusOptions {
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Global shortcut: enabled but never focused.
    pub fn global() -> Self {
        Self {
            focusable: false,
            ..Self::default()
        }
    }
}

struct FocusEntry {
    id: String,
    handler: KeyHandler,
    options: FocusOptions,
}

impl FocusEntry {
    fn eligible(&self) -> bool {
        self.options.focusable && !self.options.disabled
    }
}

// =============================================================================
// Focus Manager
// =============================================================================

#[derive(Default)]
pub struct FocusManager {
    entries: Vec<FocusEntry>,
    focused: Option<usize>,
}

impl std::fmt::Debug for FocusManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusManager")
            .field("ids", &self.ids())
            .field("focused", &self.focused())
            .finish()
    }
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component, or replace the handler and options of an
    /// already registered id in place.
    pub fn register(&mut self, id: impl Into<String>, options: FocusOptions, handler: KeyHandler) {
        let id = id.into();
        let index = match self.position(&id) {
            Some(index) => {
                self.entries[index].handler = handler;
                self.entries[index].options = options;
                self.revalidate(index);
                index
            }
            None => {
                self.entries.push(FocusEntry { id, handler, options });
                self.entries.len() - 1
            }
        };

        if self.focused.is_none() && self.entries[index].eligible() {
            self.set_focus(Some(index));
        }
    }

    /// Remove a component. Returns whether it was registered.
    pub fn unregister(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let was_focused = self.focused == Some(index);
        self.entries.remove(index);

        match self.focused {
            Some(f) if was_focused => {
                // Resume the walk from the slot before the removed one.
                self.focused = None;
                self.advance_from(f.checked_sub(1), true);
            }
            Some(f) if f > index => self.focused = Some(f - 1),
            _ => {}
        }
        true
    }

    pub fn set_disabled(&mut self, id: &str, disabled: bool) {
        if let Some(index) = self.position(id) {
            self.entries[index].options.disabled = disabled;
            self.revalidate(index);
        }
    }

    pub fn set_focusable(&mut self, id: &str, focusable: bool) {
        if let Some(index) = self.position(id) {
            self.entries[index].options.focusable = focusable;
            self.revalidate(index);
        }
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.map(|i| self.entries[i].id.as_str())
    }

    pub fn is_focused(&self, id: &str) -> bool {
        self.focused() == Some(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Focus `id` if it is enabled and focusable.
    pub fn focus(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) if self.entries[index].eligible() => {
                self.set_focus(Some(index));
                true
            }
            _ => false,
        }
    }

    pub fn blur(&mut self) {
        self.set_focus(None);
    }

    /// Move to the next eligible entry, wrapping. Returns `false` (and
    /// clears focus) when nothing is eligible.
    pub fn focus_next(&mut self) -> bool {
        self.advance_from(self.focused, true)
    }

    /// Move to the previous eligible entry, wrapping.
    pub fn focus_previous(&mut self) -> bool {
        self.advance_from(self.focused, false)
    }

    /// Offer `event` to the focused entry.
    pub fn dispatch_focused(&mut self, event: &KeyEvent) -> bool {
        match self.focused {
            Some(index) => (self.entries[index].handler)(event),
            None => false,
        }
    }

    /// Offer `event` to each enabled non-focusable entry in registration
    /// order until one consumes it. Returns the consumer's id.
    pub fn dispatch_global(&mut self, event: &KeyEvent) -> Option<String> {
        self.entries
            .iter_mut()
            .filter(|e| !e.options.focusable && !e.options.disabled)
            .find_map(|e| (e.handler)(event).then(|| e.id.clone()))
    }

    // -------------------------------------------------------------------------

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn set_focus(&mut self, index: Option<usize>) {
        if self.focused != index {
            self.focused = index;
            debug!(focused = ?self.focused(), "focus changed");
        }
    }

    /// If the entry at `index` holds focus but is no longer eligible, move on.
    fn revalidate(&mut self, index: usize) {
        if self.focused == Some(index) && !self.entries[index].eligible() {
            self.advance_from(Some(index), true);
        }
    }

    /// Walk one full cycle from `start` (exclusive) in the given direction.
    fn advance_from(&mut self, start: Option<usize>, forward: bool) -> bool {
        let n = self.entries.len();
        if n == 0 {
            self.set_focus(None);
            return false;
        }

        let candidates = (1..=n).map(|step| match (start, forward) {
            (Some(s), true) => (s + step) % n,
            (Some(s), false) => (s + n * 2 - step) % n,
            (None, true) => step - 1,
            (None, false) => n - step,
        });

        for index in candidates {
            if self.entries[index].eligible() {
                self.set_focus(Some(index));
                return true;
            }
        }
        self.set_focus(None);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn noop() -> KeyHandler {
        Box::new(|_| false)
    }

    fn ring(specs: &[(&str, FocusOptions)]) -> FocusManager {
        let mut fm = FocusManager::new();
        for (id, opts) in specs {
            fm.register(*id, *opts, noop());
        }
        fm
    }

    #[test]
    fn test_skips_disabled_and_non_focusable() {
        let mut fm = ring(&[
            ("a", FocusOptions::disabled()),
            ("b", FocusOptions::default()),
            ("c", FocusOptions::global()),
        ]);
        assert_eq!(fm.focused(), Some("b"));

        fm.blur();
        assert!(fm.focus_next());
        assert_eq!(fm.focused(), Some("b"));
        assert!(fm.focus_next());
        assert_eq!(fm.focused(), Some("b"));
    }

    #[test]
    fn test_all_disabled_clears_focus() {
        let mut fm = ring(&[("a", FocusOptions::disabled()), ("b", FocusOptions::disabled())]);
        assert_eq!(fm.focused(), None);
        assert!(!fm.focus_next());
        assert_eq!(fm.focused(), None);
        assert!(!fm.focus_previous());
    }

    #[test]
    fn test_wraps_both_directions() {
        let mut fm = ring(&[
            ("a", FocusOptions::default()),
            ("b", FocusOptions::default()),
            ("c", FocusOptions::default()),
        ]);
        assert_eq!(fm.focused(), Some("a"));
        fm.focus_previous();
        assert_eq!(fm.focused(), Some("c"));
        fm.focus_next();
        assert_eq!(fm.focused(), Some("a"));
        fm.focus_next();
        assert_eq!(fm.focused(), Some("b"));
    }

    #[test]
    fn test_disabling_focused_moves_on() {
        let mut fm = ring(&[("a", FocusOptions::default()), ("b", FocusOptions::default())]);
        fm.set_disabled("a", true);
        assert_eq!(fm.focused(), Some("b"));
        fm.set_disabled("b", true);
        assert_eq!(fm.focused(), None);
    }

    #[test]
    fn test_unregister_focused_moves_on() {
        let mut fm = ring(&[
            ("a", FocusOptions::default()),
            ("b", FocusOptions::default()),
            ("c", FocusOptions::default()),
        ]);
        fm.focus("b");
        assert!(fm.unregister("b"));
        assert_eq!(fm.focused(), Some("c"));
        assert!(fm.unregister("a"));
        assert_eq!(fm.focused(), Some("c"));
        assert!(!fm.unregister("zzz"));
    }

    #[test]
    fn test_reregister_replaces_in_place() {
        let mut fm = ring(&[("a", FocusOptions::default()), ("b", FocusOptions::default())]);
        fm.register("a", FocusOptions::default(), noop());
        assert_eq!(fm.ids(), vec!["a", "b"]);
        assert_eq!(fm.focused(), Some("a"));
    }

    #[test]
    fn test_dispatch_global_stops_at_consumer() {
        let calls = Rc::new(Cell::new(0));
        let mut fm = FocusManager::new();
        for (id, consume) in [("g1", false), ("g2", true), ("g3", true)] {
            let calls = calls.clone();
            fm.register(
                id,
                FocusOptions::global(),
                Box::new(move |_| {
                    calls.set(calls.get() + 1);
                    consume
                }),
            );
        }
        let event = KeyEvent::char("q", Default::default());
        assert_eq!(fm.dispatch_global(&event).as_deref(), Some("g2"));
        assert_eq!(calls.get(), 2);
        assert!(!fm.dispatch_focused(&event));
    }
}
