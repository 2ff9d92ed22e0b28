//! Node properties.
//!
//! Props are an ordered, string-keyed bag of scalar values. Insertion order
//! is preserved so iteration (and therefore debugging output) is stable.
//!
//! A fixed allow-list of layout-affecting keys participates in content
//! hashing; everything else is content-only.

/// Props that influence geometry and therefore participate in the
/// content hash.
pub const LAYOUT_PROPS: &[&str] = &[
    "width",
    "height",
    "minWidth",
    "maxWidth",
    "minHeight",
    "maxHeight",
    "flex",
    "flexGrow",
    "flexShrink",
    "flexBasis",
    "flexDirection",
    "flexWrap",
    "justifyContent",
    "alignItems",
    "alignSelf",
    "gap",
    "rowGap",
    "columnGap",
    "padding",
    "paddingTop",
    "paddingRight",
    "paddingBottom",
    "paddingLeft",
    "margin",
    "marginTop",
    "marginRight",
    "marginBottom",
    "marginLeft",
    "border",
    "display",
    "responsive",
];

/// Whether `name` is one of the layout-affecting props.
pub fn is_layout_prop(name: &str) -> bool {
    LAYOUT_PROPS.contains(&name)
}

/// A single prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Number(f64),
    Bool(bool),
    Str(String),
}

impl PropValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            PropValue::Str(s) => s.trim().parse().ok(),
            PropValue::Bool(_) => None,
        }
    }

    /// Non-negative cell count, clamped to `u16`.
    pub fn as_cells(&self) -> Option<u16> {
        self.as_f64()
            .filter(|n| n.is_finite())
            .map(|n| n.max(0.0).min(u16::MAX as f64).round() as u16)
    }

    /// Truthiness: `true`, non-zero numbers, and non-empty strings other
    /// than `"false"`.
    pub fn as_bool(&self) -> bool {
        match self {
            PropValue::Bool(b) => *b,
            PropValue::Number(n) => *n != 0.0,
            PropValue::Str(s) => !s.is_empty() && s != "false",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Number(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        PropValue::Number(v as f64)
    }
}

impl From<u16> for PropValue {
    fn from(v: u16) -> Self {
        PropValue::Number(v as f64)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Str(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Str(v)
    }
}

/// Ordered prop map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    entries: Vec<(String, PropValue)>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a prop, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Option<PropValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        let index = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // -------------------------------------------------------------------------
    // Typed accessors
    // -------------------------------------------------------------------------

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropValue::as_f64)
    }

    pub fn cells(&self, name: &str) -> Option<u16> {
        self.get(name).and_then(PropValue::as_cells)
    }

    /// Missing props are `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(PropValue::as_bool)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_str)
    }
}
