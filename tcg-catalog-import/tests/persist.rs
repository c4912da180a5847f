use tcg_catalog::types::{
    CanonicalCard, CanonicalCatalog, CanonicalSeries, CanonicalSet, LocalizedText, PropertyMap,
};
use tcg_catalog_db::{
    find_card_by_code, load_cards, load_search_rows, load_series, load_sets, open_memory,
    store_stats,
};
use tcg_catalog_import::{SilentProgress, normalize, persist};

fn names(pairs: &[(&str, &str)]) -> LocalizedText {
    pairs.iter().copied().collect()
}

fn sample() -> CanonicalCatalog {
    let mut catalog = CanonicalCatalog::default();
    catalog.series.insert(
        "base".to_string(),
        CanonicalSeries {
            id: "base".to_string(),
            names: names(&[("en", "Base"), ("de", "Basis")]),
        },
    );
    catalog.sets.insert(
        "base1".to_string(),
        CanonicalSet {
            id: "base1".to_string(),
            names: names(&[("en", "Base Set"), ("fr", "Set de Base")]),
            series_id: "base".to_string(),
            code: "BS".to_string(),
            abbreviation: "BS".to_string(),
            official_count: Some(102),
            total_count: Some(102),
            release_date: "1999-01-09 00:00:00.000".to_string(),
            third_party: PropertyMap::from([("cardmarket".to_string(), "1".to_string())]),
            ..Default::default()
        },
    );
    // No cards, so never stored
    catalog.sets.insert(
        "empty".to_string(),
        CanonicalSet {
            id: "empty".to_string(),
            names: names(&[("en", "Empty")]),
            series_id: "other".to_string(),
            code: "EMPTY".to_string(),
            ..Default::default()
        },
    );
    for (id, number, en, de) in [("4", "4", "Charizard", "Glurak"), ("58", "58", "Pikachu", "")] {
        catalog.cards.insert(
            ("base1".to_string(), id.to_string()),
            CanonicalCard {
                id: id.to_string(),
                set_id: "base1".to_string(),
                number: number.to_string(),
                code: format!("BS {}", number),
                names: names(&[("en", en), ("de", de)]),
                third_party: PropertyMap::from([
                    ("tcgplayer".to_string(), format!("tp-{}", id)),
                    ("cardmarket".to_string(), " ".to_string()),
                ]),
            },
        );
    }
    catalog
}

#[test]
fn normalize_is_card_driven() {
    let rows = normalize(&sample(), None);

    assert_eq!(rows.series.len(), 1);
    assert_eq!(rows.series[0].name_de, "Basis");
    assert_eq!(rows.series[0].name_fr, "");

    assert_eq!(rows.sets.len(), 1);
    let set = &rows.sets[0];
    assert_eq!(set.id, "base1");
    assert_eq!(set.name_fr, "Set de Base");
    assert_eq!(set.cardmarket_id.as_deref(), Some("1"));
    assert_eq!(set.tcgplayer_id, None);

    assert_eq!(rows.cards.len(), 2);
    assert_eq!(rows.search.len(), 2);
    assert_eq!(rows.skipped_cards, 0);

    let charizard = rows.cards.iter().find(|c| c.id == "4").unwrap();
    assert_eq!(charizard.tcgplayer_id.as_deref(), Some("tp-4"));
    assert_eq!(charizard.cardmarket_id, None);
}

#[test]
fn search_rows_join_names_in_fixed_order() {
    let rows = normalize(&sample(), None);
    let charizard = rows.search.iter().find(|s| s.id == "4").unwrap();
    assert_eq!(charizard.names, "Glurak Charizard ");
    assert_eq!(charizard.code, "4");

    let pikachu = rows.search.iter().find(|s| s.id == "58").unwrap();
    assert_eq!(pikachu.names, " Pikachu ");
}

#[test]
fn cards_of_unknown_sets_are_skipped() {
    let mut catalog = sample();
    catalog.cards.insert(
        ("ghost".to_string(), "1".to_string()),
        CanonicalCard {
            id: "1".to_string(),
            set_id: "ghost".to_string(),
            number: "1".to_string(),
            code: "GHOST 1".to_string(),
            ..Default::default()
        },
    );
    let rows = normalize(&catalog, None);
    assert_eq!(rows.skipped_cards, 1);
    assert_eq!(rows.cards.len(), 2);
}

#[test]
fn series_without_canonical_entry_gets_empty_names() {
    let mut catalog = sample();
    catalog.series.clear();
    let rows = normalize(&catalog, None);
    assert_eq!(rows.series.len(), 1);
    assert_eq!(rows.series[0].id, "base");
    assert_eq!(rows.series[0].name_en, "");
}

#[test]
fn persist_round_trip() {
    let conn = open_memory().unwrap();
    let stats = persist(&conn, &sample(), Some(&SilentProgress)).unwrap();
    assert_eq!(stats.series, 1);
    assert_eq!(stats.sets, 1);
    assert_eq!(stats.cards, 2);
    assert_eq!(stats.search_rows, 2);

    let rows = normalize(&sample(), None);
    assert_eq!(load_series(&conn).unwrap(), rows.series);
    assert_eq!(load_sets(&conn).unwrap(), rows.sets);
    assert_eq!(load_cards(&conn).unwrap().len(), 2);
    assert_eq!(load_search_rows(&conn).unwrap().len(), 2);

    let card = find_card_by_code(&conn, "BS 58").unwrap().unwrap();
    assert_eq!(card.name_en, "Pikachu");
    assert!(find_card_by_code(&conn, "BS 999").unwrap().is_none());
}

#[test]
fn persist_replaces_previous_contents() {
    let conn = open_memory().unwrap();
    persist(&conn, &sample(), None).unwrap();
    let first_cards = load_cards(&conn).unwrap();

    persist(&conn, &sample(), None).unwrap();
    assert_eq!(load_cards(&conn).unwrap(), first_cards);

    let mut smaller = sample();
    smaller
        .cards
        .remove(&("base1".to_string(), "58".to_string()));
    persist(&conn, &smaller, None).unwrap();
    let stats = store_stats(&conn).unwrap();
    assert_eq!(stats.cards, 1);
    assert_eq!(stats.search_rows, 1);

    persist(&conn, &CanonicalCatalog::default(), None).unwrap();
    let stats = store_stats(&conn).unwrap();
    assert_eq!((stats.series, stats.sets, stats.cards), (0, 0, 0));
}

#[test]
fn failed_rebuild_keeps_previous_store() {
    let conn = open_memory().unwrap();
    persist(&conn, &sample(), None).unwrap();

    // The clear fails after the cards are already deleted
    conn.execute_batch("DROP TABLE card_search").unwrap();
    assert!(persist(&conn, &CanonicalCatalog::default(), None).is_err());
    // No transaction is left open on the connection
    assert!(conn.is_autocommit());
    conn.execute_batch(
        "CREATE TABLE card_search (id TEXT NOT NULL, set_id TEXT NOT NULL,
         code TEXT NOT NULL, names TEXT NOT NULL, PRIMARY KEY (set_id, id))",
    )
    .unwrap();

    let stats = store_stats(&conn).unwrap();
    assert_eq!(stats.cards, 2);
    assert_eq!(stats.sets, 1);
}

#[test]
fn persist_runs_after_a_failed_rebuild() {
    let conn = open_memory().unwrap();
    conn.execute_batch("DROP TABLE card_search").unwrap();
    assert!(persist(&conn, &sample(), None).is_err());
    assert!(conn.is_autocommit());

    conn.execute_batch(
        "CREATE TABLE card_search (id TEXT NOT NULL, set_id TEXT NOT NULL,
         code TEXT NOT NULL, names TEXT NOT NULL, PRIMARY KEY (set_id, id))",
    )
    .unwrap();
    let stats = persist(&conn, &sample(), None).unwrap();
    assert_eq!(stats.cards, 2);
}
