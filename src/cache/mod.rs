//! Caches - content hashing and bounded secondary caches.
//!
//! Per-node output memoization lives on the nodes themselves
//! ([`RenderState`](crate::engine::RenderState)). This module provides the
//! pieces shared by handler-level caches: a structural FNV-1a hash used to
//! build `hash:width` keys, and a count/weight bounded map to store derived
//! data under them.

mod bounded;
mod hash;

pub use bounded::BoundedCache;
pub use hash::{
    content_hash, content_key, fnv1a, Fnv1a, CHILD_SAMPLE_THRESHOLD, FNV_OFFSET_BASIS, FNV_PRIME,
    MAX_HASH_DEPTH, STRING_PROP_CHARS, TEXT_PREFIX_CHARS,
};
