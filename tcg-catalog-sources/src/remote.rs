//! Build an auxiliary catalog from a remote card-catalog API.
//!
//! Sets and cards are fetched with bounded fan-out. Each entity is requested
//! once per configured language through the detail caches, and the
//! per-language answers are merged into one partial record. A failed fetch
//! never aborts the run: a set whose fetches all fail contributes nothing,
//! and a card whose fetches all fail is skipped.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt};
use tcg_catalog::types::{AuxiliaryCard, AuxiliaryCatalog, AuxiliarySet};
use tcg_catalog::walker::normalize_release_date;

use crate::cache::DetailCache;
use crate::client::CardCatalogApi;
use crate::error::SourceError;
use crate::types::{CardDetails, SetDetails};

/// Source name attached to the remote auxiliary catalog.
pub const REMOTE_SOURCE: &str = "remote";

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Languages requested per entity, in merge order.
    pub languages: Vec<String>,
    /// Language used for the listing calls.
    pub list_language: String,
    /// Maximum concurrent entity fetches.
    pub concurrency: usize,
    /// Fetch at most this many sets and this many cards.
    pub limit: Option<usize>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            languages: vec!["de".to_string(), "en".to_string(), "fr".to_string()],
            list_language: "en".to_string(),
            concurrency: 8,
            limit: None,
        }
    }
}

/// Counters from one remote fetch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchStats {
    pub sets_fetched: usize,
    pub sets_failed: usize,
    pub cards_fetched: usize,
    pub cards_failed: usize,
    /// Individual (entity, language) requests that failed.
    pub requests_failed: usize,
}

pub struct RemoteFetcher<'a, A> {
    api: &'a A,
    set_cache: &'a DetailCache<SetDetails>,
    card_cache: &'a DetailCache<CardDetails>,
    options: FetchOptions,
    requests_failed: AtomicUsize,
}

impl<'a, A: CardCatalogApi> RemoteFetcher<'a, A> {
    pub fn new(
        api: &'a A,
        set_cache: &'a DetailCache<SetDetails>,
        card_cache: &'a DetailCache<CardDetails>,
        options: FetchOptions,
    ) -> Self {
        Self {
            api,
            set_cache,
            card_cache,
            options,
            requests_failed: AtomicUsize::new(0),
        }
    }

    /// Fetch every set and card the listings name.
    ///
    /// Only a failed listing call is an error; entity failures are counted.
    pub async fn fetch(&self) -> Result<(AuxiliaryCatalog, FetchStats), SourceError> {
        let mut stats = FetchStats::default();
        let mut catalog = AuxiliaryCatalog::new(REMOTE_SOURCE);
        let concurrency = self.options.concurrency.max(1);
        let limit = self.options.limit.unwrap_or(usize::MAX);

        let set_ids: Vec<String> = self
            .api
            .list_sets(&self.options.list_language)
            .await?
            .into_iter()
            .map(|s| s.id)
            .take(limit)
            .collect();
        log::info!("Fetching {} sets from remote API", set_ids.len());

        let sets: Vec<Option<AuxiliarySet>> = stream::iter(set_ids)
            .map(|id| async move { self.fetch_set(&id).await })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        for set in sets {
            match set {
                Some(set) => {
                    stats.sets_fetched += 1;
                    catalog.sets.push(set);
                }
                None => stats.sets_failed += 1,
            }
        }

        let card_ids: Vec<String> = self
            .api
            .list_cards(&self.options.list_language)
            .await?
            .into_iter()
            .map(|c| c.id)
            .take(limit)
            .collect();
        log::info!("Fetching {} cards from remote API", card_ids.len());

        let cards: Vec<Option<AuxiliaryCard>> = stream::iter(card_ids)
            .map(|id| async move { self.fetch_card(&id).await })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        for card in cards {
            match card {
                Some(card) => {
                    stats.cards_fetched += 1;
                    catalog.cards.push(card);
                }
                None => stats.cards_failed += 1,
            }
        }

        // Completion order is arbitrary
        catalog.sets.sort_by(|a, b| a.id.cmp(&b.id));
        catalog
            .cards
            .sort_by(|a, b| (&a.set_id, &a.id).cmp(&(&b.set_id, &b.id)));

        stats.requests_failed = self.requests_failed.load(Ordering::Relaxed);
        log::info!(
            "Remote fetch: {} sets ({} failed), {} cards ({} failed)",
            stats.sets_fetched,
            stats.sets_failed,
            stats.cards_fetched,
            stats.cards_failed
        );
        Ok((catalog, stats))
    }

    /// Fetch one set in every language and merge the answers.
    pub async fn fetch_set(&self, id: &str) -> Option<AuxiliarySet> {
        let mut set = AuxiliarySet {
            id: id.to_string(),
            ..Default::default()
        };
        let mut any = false;

        for language in &self.options.languages {
            let result = self
                .set_cache
                .get_or_fetch(id, language, || self.api.set(id, language))
                .await;
            let details = match result {
                Ok(details) => details,
                Err(e) => {
                    self.record_failure("set", id, language, &e);
                    continue;
                }
            };
            any = true;
            merge_set(&mut set, language, &details);
        }

        any.then_some(set)
    }

    /// Fetch one card in every language and merge the answers.
    pub async fn fetch_card(&self, id: &str) -> Option<AuxiliaryCard> {
        let mut card = AuxiliaryCard {
            id: id.to_string(),
            ..Default::default()
        };
        let mut any = false;

        for language in &self.options.languages {
            let result = self
                .card_cache
                .get_or_fetch(id, language, || self.api.card(id, language))
                .await;
            let details = match result {
                Ok(details) => details,
                Err(e) => {
                    self.record_failure("card", id, language, &e);
                    continue;
                }
            };
            any = true;
            if let Some(name) = non_empty(details.name.as_deref()) {
                card.names.set(language.clone(), name);
            }
            if card.number.is_empty() {
                card.number = non_empty(details.local_id.as_deref()).unwrap_or_default();
            }
            if card.set_id.is_empty() {
                if let Some(set) = &details.set {
                    card.set_id = set.id.clone();
                }
            }
        }

        any.then_some(card)
    }

    fn record_failure(&self, kind: &str, id: &str, language: &str, error: &SourceError) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
        log::warn!("Failed to fetch {} '{}' ({}): {}", kind, id, language, error);
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Fold one language's set details into the partial record. Scalars keep
/// the first non-empty answer; names are recorded per language.
fn merge_set(set: &mut AuxiliarySet, language: &str, details: &SetDetails) {
    if let Some(name) = non_empty(details.name.as_deref()) {
        set.names.set(language, name);
    }
    if let Some(serie) = &details.serie {
        if let Some(name) = non_empty(serie.name.as_deref()) {
            if set.series_names.get(language).is_empty() {
                set.series_names.set(language, name);
            }
        }
    }
    if set.platform_code.is_empty() {
        set.platform_code = non_empty(details.tcg_online.as_deref()).unwrap_or_default();
    }
    if let Some(abbreviation) = details
        .abbreviation
        .as_ref()
        .and_then(|a| non_empty(a.official.as_deref()))
    {
        set.abbreviations
            .entry(language.to_string())
            .or_insert(abbreviation);
    }
    if let Some(count) = &details.card_count {
        set.official_count = set.official_count.or(count.official);
        set.total_count = set.total_count.or(count.total);
    }
    if set.release_date.is_empty() {
        if let Some(date) = &details.release_date {
            set.release_date = normalize_release_date(date);
        }
    }
}
