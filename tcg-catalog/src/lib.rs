//! Card catalog data model, lenient object-literal extraction, and the
//! directory walker that assembles a catalog from a text dump.
//!
//! This crate has no database or network dependencies. The reconciler and
//! persister in `tcg-catalog-import` consume the types defined here.

pub mod error;
pub mod extract;
pub mod types;
pub mod walker;

pub use error::CatalogError;
pub use extract::Document;
pub use types::*;
pub use walker::{
    SeriesFolderConvention, WalkOptions, normalize_release_date, parse_card, walk_catalog,
};
