use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tcg_catalog_db::{find_card_by_code, load_cards, load_search_rows, load_series, load_sets};
use tcg_catalog_import::{
    PipelineError, PipelineOptions, RemoteSource, SilentProgress, Stage, run_local, run_pipeline,
};
use tcg_catalog_sources::types::{CardBrief, CardDetails, SetBrief, SetDetails, SetRef};
use tcg_catalog_sources::{CardCatalogApi, FetchOptions, SourceError};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn write_dump(root: &Path) {
    write(root, "Base.ts", "id:'base' name:{en:'Base Series'}");
    write(
        root,
        "base/set1/set1.ts",
        "id:'set1' name:{en:'First Set'} cardCount:{official:100} ptcgoCode:'P1'",
    );
    write(root, "base/set1/card1.ts", "id:'card1' name:{en:'Pikachu'} number:'12'");
    write(
        root,
        "base/set1/card2.ts",
        "const card: Card = { name: { en: 'Raichu', fr: 'Raichu' }, localId: '13' }",
    );
    write(root, "base/jungle/jungle.ts", "id:'jungle' name:{en:'Jungle'}");
    write(root, "base/jungle/1.ts", "name:{en:'Clefable'} number:'1'");
}

fn write_archive(dir: &Path) -> PathBuf {
    let path = dir.join("sets.zip");
    let file = fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("sets/en.json", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(
        br#"[
            {"id": "base2", "name": "Jungle", "series": "Base", "printedTotal": 64,
             "total": 64, "ptcgoCode": "JU", "releaseDate": "1999/06/16"},
            {"id": "base1", "name": "First Set", "printedTotal": 999, "total": 102}
        ]"#,
    )
    .unwrap();
    zip.finish().unwrap();
    path
}

/// Remote API with German names for the Jungle set and its first card.
#[derive(Default)]
struct FakeApi {
    sets: HashMap<(String, String), SetDetails>,
    cards: HashMap<(String, String), CardDetails>,
    fail_listing: bool,
}

impl FakeApi {
    fn jungle() -> Self {
        let mut api = FakeApi::default();
        for (language, set_name, card_name) in [
            ("de", "Dschungel", "Pixi"),
            ("en", "Jungle", "Clefable"),
        ] {
            api.sets.insert(
                ("r-ju".to_string(), language.to_string()),
                SetDetails {
                    id: "r-ju".to_string(),
                    name: Some(set_name.to_string()),
                    card_count: None,
                    serie: None,
                    abbreviation: None,
                    tcg_online: None,
                    release_date: None,
                },
            );
            api.cards.insert(
                ("r-ju-1".to_string(), language.to_string()),
                CardDetails {
                    id: "r-ju-1".to_string(),
                    local_id: Some("1".to_string()),
                    name: Some(card_name.to_string()),
                    set: Some(SetRef {
                        id: "r-ju".to_string(),
                        name: None,
                        card_count: None,
                    }),
                },
            );
        }
        api
    }
}

fn missing(id: &str) -> SourceError {
    SourceError::NotFound {
        url: id.to_string(),
    }
}

impl CardCatalogApi for FakeApi {
    async fn list_cards(&self, _language: &str) -> Result<Vec<CardBrief>, SourceError> {
        Ok(vec![CardBrief {
            id: "r-ju-1".to_string(),
            local_id: None,
            name: None,
        }])
    }

    async fn list_sets(&self, _language: &str) -> Result<Vec<SetBrief>, SourceError> {
        if self.fail_listing {
            return Err(SourceError::Status {
                status: 503,
                url: "sets".to_string(),
            });
        }
        Ok(vec![SetBrief {
            id: "r-ju".to_string(),
            name: None,
            card_count: None,
        }])
    }

    async fn card(&self, id: &str, language: &str) -> Result<CardDetails, SourceError> {
        self.cards
            .get(&(id.to_string(), language.to_string()))
            .cloned()
            .ok_or_else(|| missing(id))
    }

    async fn set(&self, id: &str, language: &str) -> Result<SetDetails, SourceError> {
        self.sets
            .get(&(id.to_string(), language.to_string()))
            .cloned()
            .ok_or_else(|| missing(id))
    }
}

#[tokio::test]
async fn local_run_builds_the_store() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    write_dump(&data);

    let conn = tcg_catalog_db::open_memory().unwrap();
    let summary = run_local(&conn, &PipelineOptions::new(&data), &SilentProgress)
        .await
        .unwrap();

    assert_eq!(summary.walked_series, 1);
    assert_eq!(summary.walked_sets, 2);
    assert_eq!(summary.walked_cards, 3);
    assert!(summary.fetch.is_none());
    assert_eq!(summary.persisted.cards, 3);

    let pikachu = find_card_by_code(&conn, "P1 12").unwrap().unwrap();
    assert_eq!(pikachu.id, "card1");
    assert_eq!(pikachu.set_id, "set1");
    assert_eq!(pikachu.name_en, "Pikachu");

    let raichu = find_card_by_code(&conn, "P1 13").unwrap().unwrap();
    assert_eq!(raichu.id, "card2");
    assert_eq!(raichu.name_fr, "Raichu");

    let sets = load_sets(&conn).unwrap();
    let set1 = sets.iter().find(|s| s.id == "set1").unwrap();
    assert_eq!(set1.official, Some(100));
    assert_eq!(set1.code, "P1");

    let series = load_series(&conn).unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].name_en, "Base Series");
}

#[tokio::test]
async fn all_sources_merge_in_priority_order() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    write_dump(&data);
    let mut options = PipelineOptions::new(&data);
    options.archive_path = Some(write_archive(tmp.path()));

    let api = FakeApi::jungle();
    let remote = RemoteSource {
        api: &api,
        options: FetchOptions::default(),
    };
    let conn = tcg_catalog_db::open_memory().unwrap();
    let summary = run_pipeline(&conn, &options, Some(remote), &SilentProgress)
        .await
        .unwrap();

    let fetch = summary.fetch.unwrap();
    assert_eq!(fetch.sets_fetched, 1);
    assert_eq!(fetch.cards_fetched, 1);
    assert_eq!(summary.report.sources.len(), 2);
    assert_eq!(summary.report.sources[0].source, "archive");
    assert_eq!(summary.report.sources[1].source, "remote");

    let sets = load_sets(&conn).unwrap();
    let set1 = sets.iter().find(|s| s.id == "set1").unwrap();
    // Dump count wins; the archive only fills the total
    assert_eq!(set1.official, Some(100));
    assert_eq!(set1.total, Some(102));

    let jungle = sets.iter().find(|s| s.id == "jungle").unwrap();
    assert_eq!(jungle.code, "JU");
    assert_eq!(jungle.official, Some(64));
    assert_eq!(jungle.release_date, "1999-06-16 00:00:00.000");
    assert_eq!(jungle.name_de, "Dschungel");

    let clefable = find_card_by_code(&conn, "JU 1").unwrap().unwrap();
    assert_eq!(clefable.name_en, "Clefable");
    assert_eq!(clefable.name_de, "Pixi");

    let search = load_search_rows(&conn).unwrap();
    let row = search.iter().find(|s| s.set_id == "jungle").unwrap();
    assert_eq!(row.names, "Pixi Clefable ");
    assert_eq!(row.code, "1");
}

#[tokio::test]
async fn rerun_on_unchanged_input_is_identical() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    write_dump(&data);
    let mut options = PipelineOptions::new(&data);
    options.archive_path = Some(write_archive(tmp.path()));
    let db_path = tmp.path().join("catalog.db");

    let snapshot = |conn: &rusqlite::Connection| {
        (
            load_series(conn).unwrap(),
            load_sets(conn).unwrap(),
            load_cards(conn).unwrap(),
            load_search_rows(conn).unwrap(),
        )
    };

    let conn = tcg_catalog_db::open_database(&db_path).unwrap();
    run_local(&conn, &options, &SilentProgress).await.unwrap();
    let first = snapshot(&conn);
    drop(conn);

    let conn = tcg_catalog_db::open_database(&db_path).unwrap();
    run_local(&conn, &options, &SilentProgress).await.unwrap();
    assert_eq!(snapshot(&conn), first);
}

#[tokio::test]
async fn empty_catalog_fails_in_catalog_stage() {
    let tmp = TempDir::new().unwrap();
    let conn = tcg_catalog_db::open_memory().unwrap();
    let err = run_local(
        &conn,
        &PipelineOptions::new(tmp.path().join("missing")),
        &SilentProgress,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PipelineError::EmptyCatalog { .. }));
    assert_eq!(err.stage(), Stage::Catalog);
}

#[tokio::test]
async fn allowed_empty_catalog_clears_the_store() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    write_dump(&data);
    let conn = tcg_catalog_db::open_memory().unwrap();
    run_local(&conn, &PipelineOptions::new(&data), &SilentProgress)
        .await
        .unwrap();

    let mut options = PipelineOptions::new(tmp.path().join("missing"));
    options.allow_empty_catalog = true;
    let summary = run_local(&conn, &options, &SilentProgress).await.unwrap();
    assert_eq!(summary.persisted.cards, 0);
    assert!(load_cards(&conn).unwrap().is_empty());
    assert!(load_series(&conn).unwrap().is_empty());
}

#[tokio::test]
async fn unreadable_archive_fails_in_reconciliation_and_keeps_store() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    write_dump(&data);
    let conn = tcg_catalog_db::open_memory().unwrap();
    run_local(&conn, &PipelineOptions::new(&data), &SilentProgress)
        .await
        .unwrap();

    let mut options = PipelineOptions::new(&data);
    options.archive_path = Some(tmp.path().join("absent.zip"));
    let err = run_local(&conn, &options, &SilentProgress)
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Reconciliation);
    assert_eq!(load_cards(&conn).unwrap().len(), 3);
}

#[tokio::test]
async fn remote_listing_failure_fails_in_reconciliation() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    write_dump(&data);

    let api = FakeApi {
        fail_listing: true,
        ..FakeApi::jungle()
    };
    let remote = RemoteSource {
        api: &api,
        options: FetchOptions::default(),
    };
    let conn = tcg_catalog_db::open_memory().unwrap();
    let err = run_pipeline(&conn, &PipelineOptions::new(&data), Some(remote), &SilentProgress)
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Reconciliation);
    assert!(load_cards(&conn).unwrap().is_empty());
}
