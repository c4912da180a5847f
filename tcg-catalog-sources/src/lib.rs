//! Auxiliary catalog sources: the legacy set archive and the remote
//! card-catalog API, plus the shared detail cache used by remote fetches.

pub mod archive;
pub mod cache;
pub mod client;
pub mod error;
pub mod remote;
pub mod types;

pub use archive::{ARCHIVE_SOURCE, read_archive, read_archive_from};
pub use cache::DetailCache;
pub use client::{CardCatalogApi, DEFAULT_BASE_URL, TcgdexClient};
pub use error::SourceError;
pub use remote::{FetchOptions, FetchStats, REMOTE_SOURCE, RemoteFetcher};
