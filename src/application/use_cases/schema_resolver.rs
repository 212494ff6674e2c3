// ============================================================
// SCHEMA RESOLVER
// ============================================================
// Map logical field names to actual schema keys using a live schema
// map and ordered candidate lists. The index is rebuilt per call; the
// schema is fetched fresh for every write, so nothing is cached.

use std::collections::BTreeMap;

use crate::domain::property::{PropertyKind, SchemaMap};

/// The schema key whose declared type is `title`, if any. A database
/// has at most one; it is preferred outright when resolving the title
/// logical field.
pub fn resolve_title_key(schema: &SchemaMap) -> Option<String> {
    schema
        .iter()
        .find(|(_, kind)| **kind == PropertyKind::Title)
        .map(|(key, _)| key.clone())
}

/// First candidate present in the schema, compared case-insensitively.
/// Returns the actual schema key, or `None` when nothing matches.
pub fn resolve_key(schema: &SchemaMap, candidates: &[&str]) -> Option<String> {
    let index: BTreeMap<String, &String> = schema
        .keys()
        .map(|key| (key.to_lowercase(), key))
        .collect();
    candidates
        .iter()
        .find_map(|name| index.get(&name.to_lowercase()).map(|key| (*key).clone()))
}
