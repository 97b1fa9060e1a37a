//! Opaque identifiers and creation-order counters.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Generate a fresh opaque identifier.
///
/// Uniqueness is practical, not guaranteed; ids are meant for correlating
/// entities in logs and presentation layers.
pub fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

/// Generate an identifier scoped under a parent id (`parent-xxxx`).
pub fn child_id(parent: &str) -> String {
    format!("{parent}-{}", generate_id())
}

/// Monotonic creation-order counter for one entity kind.
#[derive(Debug)]
pub(crate) struct Ordinal(AtomicU64);

impl Ordinal {
    pub(crate) const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub(crate) fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}
