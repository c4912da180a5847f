//! Multi-source reconciliation.
//!
//! The walked catalog is the primary source. Auxiliary catalogs use their own
//! id schemes, so a set is joined across sources only by its English display
//! name (exact, case-sensitive). Two distinct sets sharing an English name
//! would be unified; such names are logged and returned in the report rather
//! than silently merged.
//!
//! Every field is merged first-non-empty-wins in source priority order: the
//! primary catalog first, then each auxiliary catalog in the order given.

use std::collections::{BTreeMap, BTreeSet};

use tcg_catalog::types::{
    AuxiliaryCatalog, AuxiliarySet, CanonicalCard, CanonicalCatalog, CanonicalSeries,
    CanonicalSet, Catalog, PropertyMap,
};
use tcg_catalog_sources::SourceError;
use thiserror::Error;

use crate::merge::{ensure_english_name, fill_count, fill_text, union_properties};

/// Failure to obtain an auxiliary catalog.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Legacy archive could not be read: {0}")]
    Archive(#[source] SourceError),
    #[error("Remote catalog could not be listed: {0}")]
    Remote(#[source] SourceError),
}

/// Findings for one auxiliary source.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    /// Canonical sets that found a same-named set in this source.
    pub matched_sets: usize,
    /// Sets of this source no canonical set matched.
    pub unmatched_sets: usize,
    /// Canonical cards supplemented from this source.
    pub supplemented_cards: usize,
    /// English names carried by more than one set of this source.
    pub duplicate_names: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// English names carried by more than one set of the primary catalog.
    pub duplicate_names: Vec<String>,
    pub sources: Vec<SourceReport>,
}

impl ReconcileReport {
    /// Every ambiguous English name, primary catalog first.
    pub fn all_duplicate_names(&self) -> impl Iterator<Item = &str> {
        self.duplicate_names
            .iter()
            .chain(self.sources.iter().flat_map(|s| s.duplicate_names.iter()))
            .map(String::as_str)
    }
}

/// A canonical set under construction.
struct SetDraft {
    set: CanonicalSet,
    platform_code: String,
    abbreviations: PropertyMap,
}

/// Resolve a set's display code: platform code, then an abbreviation
/// (English slot, then `official`, then any other), then the uppercased id.
pub fn resolve_set_code(platform_code: &str, abbreviations: &PropertyMap, set_id: &str) -> String {
    let code = platform_code.trim();
    if !code.is_empty() {
        return code.to_string();
    }
    let abbreviation = preferred_abbreviation(abbreviations);
    if !abbreviation.is_empty() {
        return abbreviation.to_string();
    }
    set_id.to_uppercase()
}

fn preferred_abbreviation(abbreviations: &PropertyMap) -> &str {
    ["en", "official"]
        .iter()
        .filter_map(|key| abbreviations.get(*key))
        .chain(abbreviations.values())
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or("")
}

/// Compose the card code `"{SET_CODE} {NUMBER}"`.
pub fn card_code(set_code: &str, number: &str) -> String {
    format!("{} {}", set_code.to_uppercase(), number)
}

/// English names that occur more than once, sorted.
fn duplicate_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for name in names.into_iter().filter(|n| !n.is_empty()) {
        if !seen.insert(name) {
            duplicates.insert(name.to_string());
        }
    }
    duplicates.into_iter().collect()
}

/// Reconcile the primary catalog with auxiliary catalogs in priority order.
pub fn reconcile(
    catalog: &Catalog,
    sources: &[AuxiliaryCatalog],
) -> (CanonicalCatalog, ReconcileReport) {
    let mut report = ReconcileReport::default();

    let mut series: BTreeMap<String, CanonicalSeries> = catalog
        .series
        .values()
        .map(|s| {
            (
                s.id.clone(),
                CanonicalSeries {
                    id: s.id.clone(),
                    names: s.names.clone(),
                },
            )
        })
        .collect();

    let mut drafts: BTreeMap<String, SetDraft> = BTreeMap::new();
    let mut cards: BTreeMap<(String, String), CanonicalCard> = BTreeMap::new();
    for record in catalog.sets() {
        drafts.insert(
            record.id.clone(),
            SetDraft {
                set: CanonicalSet {
                    id: record.id.clone(),
                    names: record.names.clone(),
                    series_id: record.series_id.clone(),
                    official_count: record.official_count,
                    total_count: record.total_count,
                    release_date: record.release_date.clone(),
                    third_party: record.third_party.clone(),
                    images: record.images.clone(),
                    ..Default::default()
                },
                platform_code: record.platform_code.trim().to_string(),
                abbreviations: record.abbreviations.clone(),
            },
        );
        for card in record.cards.values() {
            cards.insert(
                (record.id.clone(), card.id.clone()),
                CanonicalCard {
                    id: card.id.clone(),
                    set_id: record.id.clone(),
                    number: card.number.clone(),
                    names: card.names.clone(),
                    third_party: card.third_party.clone(),
                    ..Default::default()
                },
            );
        }
    }

    report.duplicate_names = duplicate_names(drafts.values().map(|d| d.set.names.get("en")));
    for name in &report.duplicate_names {
        log::warn!("Catalog has several sets named '{}'", name);
    }

    for source in sources {
        let source_report = apply_source(source, &mut drafts, &mut series, &mut cards);
        report.sources.push(source_report);
    }

    let mut canonical = CanonicalCatalog::default();
    for (id, draft) in drafts {
        let SetDraft {
            mut set,
            platform_code,
            abbreviations,
        } = draft;
        ensure_english_name(&mut set.names, &id);
        set.abbreviation = preferred_abbreviation(&abbreviations).to_string();
        set.code = resolve_set_code(&platform_code, &abbreviations, &id);
        canonical.sets.insert(id, set);
    }

    for ((set_id, card_id), mut card) in cards {
        ensure_english_name(&mut card.names, &card_id);
        let set_code = canonical
            .sets
            .get(&set_id)
            .map(|s| s.code.clone())
            .unwrap_or_else(|| set_id.to_uppercase());
        card.code = card_code(&set_code, &card.number);
        canonical.cards.insert((set_id, card_id), card);
    }

    for (id, mut entry) in series {
        ensure_english_name(&mut entry.names, &id);
        canonical.series.insert(id, entry);
    }

    log::info!(
        "Reconciled {} series, {} sets, {} cards from {} auxiliary sources",
        canonical.series.len(),
        canonical.sets.len(),
        canonical.cards.len(),
        sources.len()
    );
    (canonical, report)
}

/// Supplement drafts and cards from one auxiliary catalog.
fn apply_source(
    source: &AuxiliaryCatalog,
    drafts: &mut BTreeMap<String, SetDraft>,
    series: &mut BTreeMap<String, CanonicalSeries>,
    cards: &mut BTreeMap<(String, String), CanonicalCard>,
) -> SourceReport {
    let mut report = SourceReport {
        source: source.source.clone(),
        ..Default::default()
    };

    // First set per English name wins
    let mut by_name: BTreeMap<&str, &AuxiliarySet> = BTreeMap::new();
    for aux in &source.sets {
        let name = aux.names.get("en");
        if !name.is_empty() {
            by_name.entry(name).or_insert(aux);
        }
    }
    report.duplicate_names = duplicate_names(source.sets.iter().map(|s| s.names.get("en")));
    for name in &report.duplicate_names {
        log::warn!(
            "Source '{}' has several sets named '{}'; the first is used",
            source.source,
            name
        );
    }

    // Auxiliary set id -> canonical set ids it supplemented
    let mut matches: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (id, draft) in drafts.iter_mut() {
        let Some(aux) = by_name.get(draft.set.names.get("en")).copied() else {
            continue;
        };
        report.matched_sets += 1;
        supplement_set(draft, aux);
        if let Some(entry) = series.get_mut(&draft.set.series_id) {
            entry.names.fill_from(&aux.series_names);
        }
        matches.entry(aux.id.as_str()).or_default().push(id.clone());
    }
    report.unmatched_sets = source
        .sets
        .iter()
        .filter(|s| !matches.contains_key(s.id.as_str()))
        .count();
    if report.unmatched_sets > 0 {
        log::debug!(
            "Source '{}': {} sets matched no catalog set",
            source.source,
            report.unmatched_sets
        );
    }

    for aux in &source.cards {
        let Some(set_ids) = matches.get(aux.set_id.as_str()) else {
            continue;
        };
        for set_id in set_ids {
            let Some(card) = find_card(cards, set_id, &aux.id, &aux.number) else {
                continue;
            };
            card.names.fill_from(&aux.names);
            union_properties(&mut card.third_party, &aux.third_party);
            report.supplemented_cards += 1;
        }
    }

    log::info!(
        "Source '{}': {} sets matched, {} unmatched, {} cards supplemented",
        report.source,
        report.matched_sets,
        report.unmatched_sets,
        report.supplemented_cards
    );
    report
}

fn supplement_set(draft: &mut SetDraft, aux: &AuxiliarySet) {
    let set = &mut draft.set;
    set.names.fill_from(&aux.names);
    fill_text(&mut draft.platform_code, &aux.platform_code);
    union_properties(&mut draft.abbreviations, &aux.abbreviations);
    fill_count(&mut set.official_count, aux.official_count);
    fill_count(&mut set.total_count, aux.total_count);
    fill_text(&mut set.release_date, &aux.release_date);
    union_properties(&mut set.third_party, &aux.third_party);
}

/// Match an auxiliary card inside a canonical set by id, then by number.
fn find_card<'a>(
    cards: &'a mut BTreeMap<(String, String), CanonicalCard>,
    set_id: &str,
    id: &str,
    number: &str,
) -> Option<&'a mut CanonicalCard> {
    let key = (set_id.to_string(), id.to_string());
    if cards.contains_key(&key) {
        return cards.get_mut(&key);
    }
    if number.is_empty() {
        return None;
    }
    let range_start = (set_id.to_string(), String::new());
    cards
        .range_mut(range_start..)
        .take_while(|((s, _), _)| s == set_id)
        .map(|(_, card)| card)
        .find(|card| card.number == number)
}
