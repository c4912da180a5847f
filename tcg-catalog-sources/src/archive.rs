//! Reader for the legacy set archive: a zip container holding JSON arrays of
//! flat English-only set summaries.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tcg_catalog::types::{AuxiliaryCatalog, AuxiliarySet, LocalizedText};
use tcg_catalog::walker::normalize_release_date;

use crate::error::SourceError;
use crate::types::LegacySetSummary;

/// Source name attached to the archive's auxiliary catalog.
pub const ARCHIVE_SOURCE: &str = "archive";

/// Read every `.json` entry of the archive at `path`.
///
/// An entry that fails to decode or parse is logged and skipped; only a
/// missing or corrupt container is an error.
pub fn read_archive(path: &Path) -> Result<AuxiliaryCatalog, SourceError> {
    let file = File::open(path)?;
    let catalog = read_archive_from(BufReader::new(file))?;
    log::info!(
        "Read {} set summaries from {}",
        catalog.sets.len(),
        path.display()
    );
    Ok(catalog)
}

pub fn read_archive_from<R: Read + Seek>(reader: R) -> Result<AuxiliaryCatalog, SourceError> {
    let mut zip = zip::ZipArchive::new(reader)?;
    let mut catalog = AuxiliaryCatalog::new(ARCHIVE_SOURCE);

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let name = entry.name().to_string();
        if entry.is_dir() || !name.to_ascii_lowercase().ends_with(".json") {
            continue;
        }
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        // Invalid UTF-8 surfaces as a JSON error and skips only this entry
        match serde_json::from_slice::<Vec<LegacySetSummary>>(&bytes) {
            Ok(summaries) => catalog.sets.extend(summaries.into_iter().map(to_auxiliary)),
            Err(e) => log::warn!("Skipping archive entry {}: {}", name, e),
        }
    }

    Ok(catalog)
}

fn to_auxiliary(summary: LegacySetSummary) -> AuxiliarySet {
    let mut names = LocalizedText::new();
    if !summary.name.trim().is_empty() {
        names.set("en", summary.name.trim());
    }
    let mut series_names = LocalizedText::new();
    if !summary.series.trim().is_empty() {
        series_names.set("en", summary.series.trim());
    }
    AuxiliarySet {
        id: summary.id,
        names,
        series_names,
        platform_code: summary.ptcgo_code.unwrap_or_default().trim().to_string(),
        official_count: summary.printed_total,
        total_count: summary.total,
        release_date: summary
            .release_date
            .as_deref()
            .map(normalize_release_date)
            .unwrap_or_default(),
        ..Default::default()
    }
}
