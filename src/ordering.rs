//! Ply ordering and output field naming (component C5).
//!
//! Plies are sorted by the stable composite key `(key, definition_index)`;
//! the resulting rank becomes the 1-based index baked into every output
//! field name. Two plies that would produce the same name (same `parent`
//! and `key`, i.e. a rank collision after sorting that maps to identical
//! `parent`/`key` pairs) are a configuration error.

use std::collections::HashMap;

use crate::error::{DrapeError, DrapeResult};
use crate::plan::Ply;

/// A ply together with its assigned 1-based output index.
pub struct RankedPly<'a> {
    pub index: usize,
    pub ply: &'a Ply,
}

/// Formats the three output field names for a ply at the given 1-based
/// index: `ply_{i:06d}_{parent}_{key}_{suffix}`.
pub fn field_name(index: usize, parent: &str, key: i64, suffix: &str) -> String {
    format!("ply_{index:06}_{parent}_{key}_{suffix}")
}

/// Sorts plies by `(key, definition_index)` (stable — ties preserve
/// original relative order, which `definition_index` already guarantees
/// even for a non-stable sort), assigns sequential 1-based indices, and
/// rejects any resulting duplicate output field name.
pub fn order_and_name(plies: &[Ply]) -> DrapeResult<Vec<RankedPly<'_>>> {
    let mut refs: Vec<&Ply> = plies.iter().collect();
    refs.sort_by(|a, b| {
        a.key
            .cmp(&b.key)
            .then(a.definition_index.cmp(&b.definition_index))
    });

    // Dedupe on the pre-formatting `(parent, key)` pair, not the formatted
    // name: the formatted name always embeds the unique rank-derived index,
    // so two plies can never collide on the fully-qualified name itself —
    // only on what it would be without that index.
    let mut seen: HashMap<(String, i64), usize> = HashMap::new();
    let mut ranked = Vec::with_capacity(refs.len());
    for (rank, ply) in refs.into_iter().enumerate() {
        let index = rank + 1;
        let dedup_key = (ply.parent.clone(), ply.key);
        if let Some(&first) = seen.get(&dedup_key) {
            return Err(DrapeError::DuplicatePlyName {
                name: format!("{}_{}", ply.parent, ply.key),
                first,
                second: index,
            });
        }
        seen.insert(dedup_key, index);
        ranked.push(RankedPly { index, ply });
    }

    Ok(ranked)
}
