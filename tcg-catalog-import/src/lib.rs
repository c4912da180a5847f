//! Build the card catalog store from the dump and its auxiliary sources.
//!
//! This crate owns the pipeline: walking the dump, reconciling it with the
//! legacy archive and the remote API, and rebuilding the SQLite store.

pub mod merge;
pub mod persist;
pub mod pipeline;
pub mod progress;
pub mod reconcile;

pub use merge::{ensure_english_name, fill_count, fill_text, union_properties};
pub use persist::{PersistError, PersistStats, StoreRows, normalize, persist, search_names};
pub use pipeline::{
    PipelineError, PipelineOptions, RemoteSource, RunSummary, Stage, run_local, run_pipeline,
};
pub use progress::{LogProgress, PipelineProgress, SilentProgress};
pub use reconcile::{
    ReconcileError, ReconcileReport, SourceReport, card_code, reconcile, resolve_set_code,
};
