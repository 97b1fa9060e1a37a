//! Configuration merging.
//!
//! Every entity's configuration is built in two steps: the raw JSON object is
//! shallow-merged over its parent's inherited values, then filtered into a
//! typed record whose serde defaults fill whatever is still missing.

use serde_json::{Map, Value};

/// Shallow merge: copy every key of `overrides` onto `base`, overwriting.
///
/// Keys absent from `overrides` are left untouched. Returns the merged map.
pub fn merge(mut base: Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Drop `null` entries so that they fall back to defaults when filtered.
pub(crate) fn strip_nulls(mut map: Map<String, Value>) -> Map<String, Value> {
    map.retain(|_, v| !v.is_null());
    map
}

/// Unwrap an optional single-key wrapper such as `{ "question": { ... } }`.
pub(crate) fn unwrap_tag<'a>(value: &'a Value, tag: &str) -> &'a Value {
    match value.get(tag) {
        Some(inner) if inner.is_object() => inner,
        _ => value,
    }
}
