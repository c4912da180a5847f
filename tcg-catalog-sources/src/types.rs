use serde::Deserialize;

// ── Remote API ──────────────────────────────────────────────────────────────

/// Entry of the card listing: just enough to request details.
#[derive(Debug, Clone, Deserialize)]
pub struct CardBrief {
    pub id: String,
    #[serde(default, rename = "localId")]
    pub local_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Entry of the set listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SetBrief {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "cardCount")]
    pub card_count: Option<CardCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardCount {
    #[serde(default)]
    pub official: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// Full per-language detail for one set.
#[derive(Debug, Clone, Deserialize)]
pub struct SetDetails {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "cardCount")]
    pub card_count: Option<CardCount>,
    #[serde(default)]
    pub serie: Option<SeriesRef>,
    #[serde(default)]
    pub abbreviation: Option<Abbreviation>,
    #[serde(default, rename = "tcgOnline")]
    pub tcg_online: Option<String>,
    #[serde(default, rename = "releaseDate")]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Abbreviation {
    #[serde(default)]
    pub official: Option<String>,
}

/// Full per-language detail for one card.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDetails {
    pub id: String,
    #[serde(default, rename = "localId")]
    pub local_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub set: Option<SetRef>,
}

/// The owning set as embedded in card details.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "cardCount")]
    pub card_count: Option<CardCount>,
}

// ── Legacy Archive ──────────────────────────────────────────────────────────

/// Flat set summary stored in the legacy archive (English only).
#[derive(Debug, Clone, Deserialize)]
pub struct LegacySetSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub series: String,
    #[serde(default, rename = "printedTotal")]
    pub printed_total: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default, rename = "ptcgoCode")]
    pub ptcgo_code: Option<String>,
    #[serde(default, rename = "releaseDate")]
    pub release_date: Option<String>,
}
