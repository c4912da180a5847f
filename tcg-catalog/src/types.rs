//! Data model types for the card catalog.
//!
//! Three families of types live here: the raw records assembled from the text
//! dump (`SeriesRecord` / `SetRecord` / `CardRecord`), the partial records
//! contributed by auxiliary sources, and the canonical and persisted forms
//! produced by reconciliation and normalization.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Languages carried by persisted entities, in column order.
pub const PERSISTED_LANGUAGES: [&str; 3] = ["de", "en", "fr"];

/// Flat attribute map recovered from an object literal.
pub type PropertyMap = BTreeMap<String, String>;

// ── Localized Text ──────────────────────────────────────────────────────────

/// Mapping from language code to text. Lookups of absent languages yield `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// A text with a single language entry.
    pub fn single(language: impl Into<String>, value: impl Into<String>) -> Self {
        let mut text = Self::new();
        text.set(language, value);
        text
    }

    /// The value for `language`, or `""` when absent.
    pub fn get(&self, language: &str) -> &str {
        self.0.get(language).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, language: impl Into<String>, value: impl Into<String>) {
        self.0.insert(language.into(), value.into());
    }

    /// True when no language carries a non-empty value.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// First non-empty value in language order.
    pub fn first_non_empty(&self) -> Option<&str> {
        self.0.values().map(String::as_str).find(|v| !v.is_empty())
    }

    /// Fill every language that is empty here from `other`.
    ///
    /// Non-empty values are never overwritten. Returns the number of
    /// languages that were filled.
    pub fn fill_from(&mut self, other: &LocalizedText) -> usize {
        let mut filled = 0;
        for (language, value) in other.iter() {
            if value.is_empty() || !self.get(language).is_empty() {
                continue;
            }
            self.set(language, value);
            filled += 1;
        }
        filled
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ── Dump Records ────────────────────────────────────────────────────────────

/// A card as recovered from one card file of the text dump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardRecord {
    /// Unique within the owning set.
    pub id: String,
    pub names: LocalizedText,
    /// Printed number, not necessarily numeric ("12", "SV045", "TG01").
    pub number: String,
    pub supertype: String,
    pub subtypes: Vec<String>,
    pub rarity: String,
    pub hp: String,
    pub types: Vec<String>,
    pub evolves_from: LocalizedText,
    pub stage: String,
    pub abilities: Vec<PropertyMap>,
    pub attacks: Vec<PropertyMap>,
    pub weaknesses: Vec<PropertyMap>,
    pub resistances: Vec<PropertyMap>,
    pub retreat_cost: Vec<String>,
    pub retreat: Option<i64>,
    pub converted_retreat_cost: Option<i64>,
    pub artist: String,
    pub description: LocalizedText,
    /// Provider name -> external id, e.g. "cardmarket" -> "273699".
    pub third_party: PropertyMap,
    pub dex_ids: Vec<i64>,
    /// Diagnostic only; never persisted.
    pub source_file: PathBuf,
}

/// A set folder of the dump together with its cards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetRecord {
    pub id: String,
    pub names: LocalizedText,
    pub series_id: String,
    /// `None` means unknown, to be filled by reconciliation.
    pub official_count: Option<u32>,
    pub total_count: Option<u32>,
    /// `YYYY-MM-DD HH:mm:ss.SSS` or empty.
    pub release_date: String,
    /// Legacy trading-card-game-online code.
    pub platform_code: String,
    pub abbreviations: PropertyMap,
    pub third_party: PropertyMap,
    pub images: PropertyMap,
    pub cards: BTreeMap<String, CardRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesRecord {
    pub id: String,
    pub names: LocalizedText,
    pub sets: BTreeMap<String, SetRecord>,
}

/// The full series -> set -> card tree assembled from the dump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub series: BTreeMap<String, SeriesRecord>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// All sets across every series, in series then set id order.
    pub fn sets(&self) -> impl Iterator<Item = &SetRecord> {
        self.series.values().flat_map(|s| s.sets.values())
    }

    pub fn set_count(&self) -> usize {
        self.series.values().map(|s| s.sets.len()).sum()
    }

    pub fn card_count(&self) -> usize {
        self.sets().map(|s| s.cards.len()).sum()
    }

    pub fn find_set(&self, set_id: &str) -> Option<&SetRecord> {
        self.series.values().find_map(|s| s.sets.get(set_id))
    }
}

// ── Auxiliary Records ───────────────────────────────────────────────────────

/// A partial set summary from a secondary source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxiliarySet {
    /// Id in the source's own scheme; not comparable to dump ids.
    pub id: String,
    pub names: LocalizedText,
    pub series_names: LocalizedText,
    pub platform_code: String,
    pub abbreviations: PropertyMap,
    pub official_count: Option<u32>,
    pub total_count: Option<u32>,
    pub release_date: String,
    pub third_party: PropertyMap,
}

/// A partial card from a secondary source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxiliaryCard {
    pub id: String,
    /// Owning set in the source's own id scheme.
    pub set_id: String,
    pub number: String,
    pub names: LocalizedText,
    pub third_party: PropertyMap,
}

/// Everything one secondary source knows, tagged with the source name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxiliaryCatalog {
    pub source: String,
    pub sets: Vec<AuxiliarySet>,
    pub cards: Vec<AuxiliaryCard>,
}

impl AuxiliaryCatalog {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }
}

// ── Canonical Records ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalSeries {
    pub id: String,
    pub names: LocalizedText,
}

/// A reconciled set: English name and code are always present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalSet {
    pub id: String,
    pub names: LocalizedText,
    pub series_id: String,
    /// Resolved display code, never empty.
    pub code: String,
    pub abbreviation: String,
    pub official_count: Option<u32>,
    pub total_count: Option<u32>,
    pub release_date: String,
    pub third_party: PropertyMap,
    pub images: PropertyMap,
}

/// A reconciled card with its composed `"{SET_CODE} {NUMBER}"` code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalCard {
    pub id: String,
    pub set_id: String,
    pub number: String,
    pub code: String,
    pub names: LocalizedText,
    pub third_party: PropertyMap,
}

/// The reconciled catalog. Cards are keyed by `(set_id, card_id)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalCatalog {
    pub series: BTreeMap<String, CanonicalSeries>,
    pub sets: BTreeMap<String, CanonicalSet>,
    pub cards: BTreeMap<(String, String), CanonicalCard>,
}

// ── Persisted Entities ──────────────────────────────────────────────────────

/// Row of the `series` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSeries {
    pub id: String,
    pub name_de: String,
    pub name_en: String,
    pub name_fr: String,
}

/// Row of the `sets` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSet {
    pub id: String,
    pub name_de: String,
    pub name_en: String,
    pub name_fr: String,
    pub code: String,
    pub abbreviation: String,
    pub official: Option<u32>,
    pub total: Option<u32>,
    pub release_date: String,
    pub cardmarket_id: Option<String>,
    pub tcgplayer_id: Option<String>,
    pub series_id: String,
}

/// Row of the `cards` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedCard {
    pub id: String,
    pub set_id: String,
    pub number: String,
    pub name_de: String,
    pub name_en: String,
    pub name_fr: String,
    pub code: String,
    pub cardmarket_id: Option<String>,
    pub tcgplayer_id: Option<String>,
}

/// Row of the `card_search` shadow table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedCardSearch {
    pub id: String,
    pub set_id: String,
    /// The card number.
    pub code: String,
    /// German, English and French names joined by single spaces.
    pub names: String,
}
