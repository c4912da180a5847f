//! End-to-end catalog build: walk, reconcile, persist.

use std::fmt;
use std::path::PathBuf;

use rusqlite::Connection;
use tcg_catalog::types::AuxiliaryCatalog;
use tcg_catalog::walker::{WalkOptions, walk_catalog};
use tcg_catalog_sources::{
    CardCatalogApi, DetailCache, FetchOptions, FetchStats, RemoteFetcher, TcgdexClient,
    read_archive,
};
use thiserror::Error;

use crate::persist::{PersistError, PersistStats, persist};
use crate::progress::PipelineProgress;
use crate::reconcile::{ReconcileError, ReconcileReport, reconcile};

/// The three stages of a run, for user-facing failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Catalog,
    Reconciliation,
    Persistence,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Catalog => "catalog assembly",
            Stage::Reconciliation => "reconciliation",
            Stage::Persistence => "persistence",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No series found under {}", path.display())]
    EmptyCatalog { path: PathBuf },
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl PipelineError {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::EmptyCatalog { .. } => Stage::Catalog,
            PipelineError::Reconcile(_) => Stage::Reconciliation,
            PipelineError::Persist(_) => Stage::Persistence,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub data_dir: PathBuf,
    pub walk: WalkOptions,
    /// Legacy set archive. An unreadable archive fails the run.
    pub archive_path: Option<PathBuf>,
    /// Treat an empty walked catalog as success (and empty the store).
    pub allow_empty_catalog: bool,
}

impl PipelineOptions {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            walk: WalkOptions::default(),
            archive_path: None,
            allow_empty_catalog: false,
        }
    }
}

/// A remote API to consult, with its fetch settings.
pub struct RemoteSource<'a, A> {
    pub api: &'a A,
    pub options: FetchOptions,
}

/// Counts from a completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub walked_series: usize,
    pub walked_sets: usize,
    pub walked_cards: usize,
    pub fetch: Option<FetchStats>,
    pub report: ReconcileReport,
    pub persisted: PersistStats,
}

/// Run the pipeline with the local sources only.
pub async fn run_local(
    conn: &Connection,
    options: &PipelineOptions,
    progress: &dyn PipelineProgress,
) -> Result<RunSummary, PipelineError> {
    run_pipeline::<TcgdexClient>(conn, options, None, progress).await
}

/// Walk the dump, gather auxiliary sources, reconcile, and rebuild the store.
pub async fn run_pipeline<A: CardCatalogApi>(
    conn: &Connection,
    options: &PipelineOptions,
    remote: Option<RemoteSource<'_, A>>,
    progress: &dyn PipelineProgress,
) -> Result<RunSummary, PipelineError> {
    let mut summary = RunSummary::default();

    progress.on_stage(
        Stage::Catalog,
        &format!("Reading catalog from {}", options.data_dir.display()),
    );
    let catalog = walk_catalog(&options.data_dir, &options.walk);
    if catalog.is_empty() && !options.allow_empty_catalog {
        return Err(PipelineError::EmptyCatalog {
            path: options.data_dir.clone(),
        });
    }
    summary.walked_series = catalog.series.len();
    summary.walked_sets = catalog.set_count();
    summary.walked_cards = catalog.card_count();

    progress.on_stage(Stage::Reconciliation, "Gathering auxiliary sources");
    let mut sources: Vec<AuxiliaryCatalog> = Vec::new();
    if let Some(path) = &options.archive_path {
        let archive = read_archive(path).map_err(ReconcileError::Archive)?;
        sources.push(archive);
    }
    if let Some(remote) = remote {
        let set_cache = DetailCache::new();
        let card_cache = DetailCache::new();
        let fetcher = RemoteFetcher::new(remote.api, &set_cache, &card_cache, remote.options);
        let (fetched, stats) = fetcher.fetch().await.map_err(ReconcileError::Remote)?;
        summary.fetch = Some(stats);
        sources.push(fetched);
    }
    let (canonical, report) = reconcile(&catalog, &sources);
    summary.report = report;

    progress.on_stage(Stage::Persistence, "Rebuilding store");
    summary.persisted = persist(conn, &canonical, Some(progress))?;

    progress.on_complete(&format!(
        "Stored {} series, {} sets, {} cards",
        summary.persisted.series, summary.persisted.sets, summary.persisted.cards
    ));
    Ok(summary)
}
