//! Content hashing.
//!
//! FNV-1a (32-bit) over a node's type, a prefix of its text, its
//! layout-affecting props and, recursively, its children. The hash is a cheap
//! discriminator for secondary caches, not a full structural fingerprint:
//! long text is sampled, deep trees are cut off and very wide child lists
//! are sampled.

use crate::engine::{Node, PropValue, LAYOUT_PROPS};

pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
pub const FNV_PRIME: u32 = 0x0100_0193;

/// Characters of text content folded into the hash.
pub const TEXT_PREFIX_CHARS: usize = 50;

/// Characters of a string prop folded into the hash.
pub const STRING_PROP_CHARS: usize = 30;

/// Child recursion stops below this depth.
pub const MAX_HASH_DEPTH: usize = 10;

/// Child lists longer than this are sampled.
pub const CHILD_SAMPLE_THRESHOLD: usize = 20;

const SAMPLE_SPAN: usize = 5;
const FIELD_SEPARATOR: u8 = 0xFF;

/// Incremental FNV-1a hasher.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a(u32);

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

impl Fnv1a {
    pub const fn new() -> Self {
        Self(FNV_OFFSET_BASIS)
    }

    #[inline]
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u32;
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    /// String followed by a separator so adjacent fields cannot run together.
    pub fn write_str(&mut self, s: &str) {
        self.write(s.as_bytes());
        self.write(&[FIELD_SEPARATOR]);
    }

    pub fn finish(&self) -> u32 {
        self.0
    }
}

/// FNV-1a of a byte string.
pub fn fnv1a(bytes: &[u8]) -> u32 {
    let mut h = Fnv1a::new();
    h.write(bytes);
    h.finish()
}

/// Structural hash of a node and its subtree.
pub fn content_hash(node: &Node) -> u32 {
    let mut h = Fnv1a::new();
    hash_node(&mut h, node, 0);
    h.finish()
}

/// Secondary cache key: the content hash paired with a width.
pub fn content_key(node: &Node, width: u16) -> String {
    format!("{:08x}:{}", content_hash(node), width)
}

fn prefix(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

fn hash_node(h: &mut Fnv1a, node: &Node, depth: usize) {
    h.write_str(node.node_type());

    if let Some(text) = node.text_content() {
        h.write_str(prefix(text, TEXT_PREFIX_CHARS));
        h.write_u32(text.chars().count() as u32);
    }

    let props = node.props();
    for &name in LAYOUT_PROPS {
        let Some(value) = props.get(name) else {
            continue;
        };
        h.write_str(name);
        match value {
            PropValue::Number(n) => h.write(&n.to_bits().to_le_bytes()),
            PropValue::Bool(b) => h.write(&[u8::from(*b)]),
            PropValue::Str(s) => h.write_str(prefix(s, STRING_PROP_CHARS)),
        }
    }

    if depth >= MAX_HASH_DEPTH {
        return;
    }

    let children = node.children();
    h.write_u32(children.len() as u32);
    if children.len() > CHILD_SAMPLE_THRESHOLD {
        let n = children.len();
        let mid = n / 2 - SAMPLE_SPAN / 2;
        let sampled = (0..SAMPLE_SPAN)
            .chain(mid..mid + SAMPLE_SPAN)
            .chain(n - SAMPLE_SPAN..n);
        for i in sampled {
            hash_node(h, &children[i], depth + 1);
        }
    } else {
        for child in children {
            hash_node(h, child, depth + 1);
        }
    }
}
