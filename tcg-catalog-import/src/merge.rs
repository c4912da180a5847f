//! First-non-empty-wins merge helpers.
//!
//! Sources are applied in priority order; every helper fills gaps in the
//! target and never replaces a non-empty value with another value.

use tcg_catalog::types::{LocalizedText, PropertyMap};

/// Fill an empty string from `candidate`. Returns `true` if filled.
pub fn fill_text(target: &mut String, candidate: &str) -> bool {
    let candidate = candidate.trim();
    if !target.is_empty() || candidate.is_empty() {
        return false;
    }
    *target = candidate.to_string();
    true
}

/// Fill an unknown count from `candidate`. Returns `true` if filled.
pub fn fill_count(target: &mut Option<u32>, candidate: Option<u32>) -> bool {
    if target.is_some() || candidate.is_none() {
        return false;
    }
    *target = candidate;
    true
}

/// Union provider ids into `target` without overwriting existing non-empty
/// values. Returns the number of ids added.
pub fn union_properties(target: &mut PropertyMap, other: &PropertyMap) -> usize {
    let mut added = 0;
    for (key, value) in other {
        if value.trim().is_empty() {
            continue;
        }
        let slot = target.entry(key.clone()).or_default();
        if slot.is_empty() {
            *slot = value.trim().to_string();
            added += 1;
        }
    }
    added
}

/// Guarantee a non-empty English name: fall back to the first non-empty
/// other language, then to `id`.
pub fn ensure_english_name(names: &mut LocalizedText, id: &str) {
    if !names.get("en").is_empty() {
        return;
    }
    let fallback = names.first_non_empty().unwrap_or(id).to_string();
    names.set("en", fallback);
}
