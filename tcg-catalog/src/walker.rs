//! Assemble a [`Catalog`] from the on-disk text dump.
//!
//! Expected layout under the base directory:
//!
//! ```text
//! <base>/<Series>.<ext>                  series metadata
//! <base>/<series-folder>/<Set>/          one folder per set
//! <base>/<series-folder>/<Set>/<Set>.<ext>   set metadata (or index.<ext>,
//!                                        or <base>/<series-folder>/<Set>.<ext>)
//! <base>/<series-folder>/<Set>/<card>.<ext>  one file per card
//! ```
//!
//! A missing base directory yields an empty catalog. Unreadable files are
//! logged and skipped; missing metadata falls back to names derived from
//! folder and file names.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::extract::Document;
use crate::types::{Catalog, CardRecord, LocalizedText, SeriesRecord, SetRecord};

/// How a series metadata file is associated with its folder of sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesFolderConvention {
    /// The folder is named after the series id declared inside the file.
    #[default]
    SeriesId,
    /// The folder is named after the metadata file's base name.
    #[serde(rename = "file-name")]
    MetadataFileName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// Source file extension without the dot.
    pub extension: String,
    pub convention: SeriesFolderConvention,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            extension: "ts".to_string(),
            convention: SeriesFolderConvention::default(),
        }
    }
}

/// Normalize a `YYYY-MM-DD` release date to `YYYY-MM-DD 00:00:00.000`.
/// Anything unparseable becomes `""`.
pub fn normalize_release_date(raw: &str) -> String {
    let raw = raw.trim();
    ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| chrono::NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|date| date.format("%Y-%m-%d 00:00:00.000").to_string())
        .unwrap_or_default()
}

/// Walk `base` and build the catalog tree.
pub fn walk_catalog(base: &Path, options: &WalkOptions) -> Catalog {
    let mut catalog = Catalog::default();
    if !base.is_dir() {
        log::warn!("Catalog directory {} does not exist", base.display());
        return catalog;
    }
    let listing = match list_dir(base) {
        Ok(listing) => listing,
        Err(e) => {
            log::warn!("{}", e);
            return catalog;
        }
    };

    // Series declared by metadata files, paired with the folder holding their sets
    let mut roots: Vec<(SeriesRecord, PathBuf)> = Vec::new();
    let mut claimed: HashSet<String> = HashSet::new();
    for path in listing.files_with_extension(&options.extension) {
        let Some(text) = read_or_warn(&path) else {
            continue;
        };
        let stem = file_stem(&path);
        let doc = Document::parse(&text);
        let id = doc.own_id().unwrap_or_else(|| stem.clone());
        let mut names = doc.localized_map("name");
        if names.is_empty() {
            names = LocalizedText::single("en", doc.display_name().unwrap_or_else(|| stem.clone()));
        }
        let folder = match options.convention {
            SeriesFolderConvention::SeriesId => id.clone(),
            SeriesFolderConvention::MetadataFileName => stem,
        };
        if roots.iter().any(|(s, _)| s.id == id) {
            log::warn!("Duplicate series id '{}' in {}, skipping", id, path.display());
            continue;
        }
        claimed.insert(folder.clone());
        roots.push((
            SeriesRecord {
                id,
                names,
                sets: BTreeMap::new(),
            },
            base.join(folder),
        ));
    }

    // Folders no metadata file claimed become series named after the folder
    for dir in &listing.dirs {
        let folder = file_name(dir);
        if claimed.contains(&folder) {
            continue;
        }
        if roots.iter().any(|(s, _)| s.id == folder) {
            log::warn!(
                "Folder {} collides with an existing series id, skipping",
                dir.display()
            );
            continue;
        }
        log::debug!("Series folder {} has no metadata file", dir.display());
        roots.push((
            SeriesRecord {
                id: folder.clone(),
                names: LocalizedText::single("en", folder),
                sets: BTreeMap::new(),
            },
            dir.clone(),
        ));
    }

    let mut seen_sets: HashSet<String> = HashSet::new();
    for (mut series, folder) in roots {
        if folder.is_dir() {
            match list_dir(&folder) {
                Ok(series_listing) => {
                    for set_dir in &series_listing.dirs {
                        let set = walk_set(&folder, set_dir, &series.id, options);
                        if !seen_sets.insert(set.id.clone()) {
                            log::warn!(
                                "Duplicate set id '{}' at {}, keeping the first",
                                set.id,
                                set_dir.display()
                            );
                            continue;
                        }
                        series.sets.insert(set.id.clone(), set);
                    }
                }
                Err(e) => log::warn!("{}", e),
            }
        }
        log::debug!("Series '{}': {} sets", series.id, series.sets.len());
        catalog.series.insert(series.id.clone(), series);
    }

    log::info!(
        "Walked {}: {} series, {} sets, {} cards",
        base.display(),
        catalog.series.len(),
        catalog.set_count(),
        catalog.card_count()
    );
    catalog
}

/// Locate set metadata: `<set>/<set>.<ext>`, `<set>/index.<ext>`, then the
/// sibling `<series>/<set>.<ext>`.
fn find_set_metadata(series_dir: &Path, set_dir: &Path, folder: &str, ext: &str) -> Option<PathBuf> {
    [
        set_dir.join(format!("{folder}.{ext}")),
        set_dir.join(format!("index.{ext}")),
        series_dir.join(format!("{folder}.{ext}")),
    ]
    .into_iter()
    .find(|p| p.is_file())
}

fn walk_set(series_dir: &Path, set_dir: &Path, series_id: &str, options: &WalkOptions) -> SetRecord {
    let folder = file_name(set_dir);
    let ext = options.extension.as_str();
    let metadata_path = find_set_metadata(series_dir, set_dir, &folder, ext);

    let mut set = SetRecord {
        id: folder.clone(),
        names: LocalizedText::single("en", folder.clone()),
        series_id: series_id.to_string(),
        ..Default::default()
    };

    if let Some(text) = metadata_path.as_deref().and_then(read_or_warn) {
        let doc = Document::parse(&text);
        if let Some(id) = doc.own_id() {
            set.id = id;
        }
        let names = doc.localized_map("name");
        if !names.is_empty() {
            set.names = names;
        } else if let Some(name) = doc.display_name() {
            set.names = LocalizedText::single("en", name);
        }
        let counts = doc.sub_object("cardCount");
        set.official_count = counts.get("official").and_then(|v| v.parse().ok());
        set.total_count = counts.get("total").and_then(|v| v.parse().ok());
        set.release_date = normalize_release_date(&doc.string("releaseDate"));
        set.platform_code = doc.string("tcgOnline");
        if set.platform_code.is_empty() {
            set.platform_code = doc.string("ptcgoCode");
        }
        set.abbreviations = doc.sub_object("abbreviations");
        set.third_party = doc.sub_object("thirdParty");
        set.images = doc.images();
    } else if metadata_path.is_none() {
        log::debug!("Set folder {} has no metadata file", set_dir.display());
    }

    let listing = match list_dir(set_dir) {
        Ok(listing) => listing,
        Err(e) => {
            log::warn!("{}", e);
            return set;
        }
    };
    for path in listing.files_with_extension(ext) {
        if metadata_path.as_deref() == Some(path.as_path()) {
            continue;
        }
        let Some(text) = read_or_warn(&path) else {
            continue;
        };
        let card = parse_card(&path, &text);
        if set.cards.contains_key(&card.id) {
            log::warn!(
                "Duplicate card id '{}' in set '{}' ({}), keeping the first",
                card.id,
                set.id,
                path.display()
            );
            continue;
        }
        set.cards.insert(card.id.clone(), card);
    }
    set
}

/// Build a card record from one card file's text.
pub fn parse_card(path: &Path, text: &str) -> CardRecord {
    let doc = Document::parse(text);
    let stem = file_stem(path);
    let id = doc.own_id().unwrap_or(stem);

    let mut names = doc.localized_map("name");
    if names.is_empty() {
        names = LocalizedText::single("en", doc.display_name().unwrap_or_else(|| id.clone()));
    }

    let number = ["number", "localId"]
        .iter()
        .map(|key| doc.string(key))
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| id.clone());

    let supertype = first_non_empty(&doc, &["supertype", "category"]);
    let mut evolves_from = doc.localized_map("evolveFrom");
    if evolves_from.is_empty() {
        evolves_from = doc.localized_map("evolvesFrom");
    }

    CardRecord {
        id,
        names,
        number,
        supertype,
        subtypes: doc.string_list("subtypes"),
        rarity: doc.string("rarity"),
        hp: doc.string("hp"),
        types: doc.string_list("types"),
        evolves_from,
        stage: doc.string("stage"),
        abilities: doc.object_list("abilities"),
        attacks: doc.object_list("attacks"),
        weaknesses: doc.object_list("weaknesses"),
        resistances: doc.object_list("resistances"),
        retreat_cost: doc.string_list("retreatCost"),
        retreat: doc.integer("retreat"),
        converted_retreat_cost: doc.integer("convertedRetreatCost"),
        artist: first_non_empty(&doc, &["illustrator", "artist"]),
        description: doc.localized_map("description"),
        third_party: doc.sub_object("thirdParty"),
        dex_ids: doc.integer_list("dexId"),
        source_file: path.to_path_buf(),
    }
}

fn first_non_empty(doc: &Document<'_>, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| doc.string(key))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

// ── Filesystem helpers ──────────────────────────────────────────────────────

/// Sorted directory contents split into files and subdirectories.
struct Listing {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl Listing {
    fn files_with_extension(&self, ext: &str) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(ext))
            })
            .cloned()
            .collect()
    }
}

fn list_dir(dir: &Path) -> Result<Listing, CatalogError> {
    let read = fs::read_dir(dir).map_err(|e| CatalogError::list(dir, e))?;
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| CatalogError::list(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        } else if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    dirs.sort();
    Ok(Listing { files, dirs })
}

fn read_source(path: &Path) -> Result<String, CatalogError> {
    let bytes = fs::read(path).map_err(|e| CatalogError::read(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_or_warn(path: &Path) -> Option<String> {
    match read_source(path) {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_date_normalization() {
        assert_eq!(normalize_release_date("1999-01-09"), "1999-01-09 00:00:00.000");
        assert_eq!(normalize_release_date(" 2003/07/18 "), "2003-07-18 00:00:00.000");
        assert_eq!(normalize_release_date("January 1999"), "");
        assert_eq!(normalize_release_date(""), "");
    }

    #[test]
    fn card_number_falls_back_to_local_id_then_id() {
        let card = parse_card(Path::new("s/7.ts"), "id: 'c7', localId: '7'");
        assert_eq!(card.number, "7");

        let card = parse_card(Path::new("s/7.ts"), "id: 'c7'");
        assert_eq!(card.number, "c7");
    }

    #[test]
    fn card_without_id_uses_file_stem() {
        let card = parse_card(Path::new("set/card1.ts"), "hp: 60");
        assert_eq!(card.id, "card1");
        assert_eq!(card.names.get("en"), "card1");
        assert_eq!(card.number, "card1");
    }

    #[test]
    fn non_numeric_retreat_is_absent() {
        let card = parse_card(Path::new("x.ts"), "id: 'x', retreat: 'X'");
        assert_eq!(card.retreat, None);
    }
}
