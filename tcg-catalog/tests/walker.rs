use std::fs;
use std::path::Path;

use tcg_catalog::{SeriesFolderConvention, WalkOptions, walk_catalog};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn end_to_end_layout() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();
    write(data, "Base.ts", "id:'base' name:{en:'Base Series'}");
    write(
        data,
        "base/set1/set1.ts",
        "id:'set1' name:{en:'First Set'} cardCount:{official:100} ptcgoCode:'P1'",
    );
    write(data, "base/set1/card1.ts", "id:'card1' name:{en:'Pikachu'} number:'12'");

    let catalog = walk_catalog(data, &WalkOptions::default());
    let series = &catalog.series["base"];
    assert_eq!(series.names.get("en"), "Base Series");

    let set = &series.sets["set1"];
    assert_eq!(set.names.get("en"), "First Set");
    assert_eq!(set.official_count, Some(100));
    assert_eq!(set.total_count, None);
    assert_eq!(set.platform_code, "P1");
    assert_eq!(set.series_id, "base");

    // The set metadata file is not a card
    assert_eq!(set.cards.len(), 1);
    let card = &set.cards["card1"];
    assert_eq!(card.names.get("en"), "Pikachu");
    assert_eq!(card.number, "12");
}

#[test]
fn missing_base_directory_yields_empty_catalog() {
    let tmp = TempDir::new().unwrap();
    let catalog = walk_catalog(&tmp.path().join("nope"), &WalkOptions::default());
    assert!(catalog.is_empty());

    let file = tmp.path().join("file.ts");
    fs::write(&file, "id: 'x'").unwrap();
    assert!(walk_catalog(&file, &WalkOptions::default()).is_empty());
}

#[test]
fn set_without_metadata_uses_folder_name() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();
    write(data, "Base.ts", "id:'base'");
    write(data, "base/SetA/card1.ts", "hp: 50");

    let catalog = walk_catalog(data, &WalkOptions::default());
    let set = &catalog.series["base"].sets["SetA"];
    assert_eq!(set.id, "SetA");
    assert_eq!(set.names.get("en"), "SetA");
    assert_eq!(set.official_count, None);
    assert_eq!(set.total_count, None);
    assert_eq!(set.release_date, "");

    let card = &set.cards["card1"];
    assert_eq!(card.id, "card1");
    assert_eq!(card.names.get("en"), "card1");
}

#[test]
fn series_without_metadata_file_is_created_from_folder() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();
    write(data, "Promos/p1/index.ts", "id: 'p1', name: { en: 'Promo One' }");

    let catalog = walk_catalog(data, &WalkOptions::default());
    let series = &catalog.series["Promos"];
    assert_eq!(series.names.get("en"), "Promos");
    assert_eq!(series.sets["p1"].names.get("en"), "Promo One");
    assert_eq!(series.sets["p1"].series_id, "Promos");
}

#[test]
fn series_folder_by_metadata_file_name() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();
    write(data, "Base.ts", "id: 'base', name: { en: 'Base' }");
    write(data, "Base/base1/base1.ts", "id: 'base1', name: { en: 'Base Set' }");

    let by_file = WalkOptions {
        convention: SeriesFolderConvention::MetadataFileName,
        ..WalkOptions::default()
    };
    let catalog = walk_catalog(data, &by_file);
    assert_eq!(catalog.series.len(), 1);
    assert!(catalog.series["base"].sets.contains_key("base1"));

    // Under the id convention the folder is unclaimed and becomes its own series
    let catalog = walk_catalog(data, &WalkOptions::default());
    assert!(catalog.series["base"].sets.is_empty());
    assert!(catalog.series["Base"].sets.contains_key("base1"));
}

#[test]
fn sibling_set_metadata_and_field_fallbacks() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();
    write(data, "Base.ts", "const serie = { id: 'base', name: { en: 'Base', fr: 'Base' } }");
    write(
        data,
        "base/Jungle.ts",
        "const set: Set = { id: 'base2', name: { en: 'Jungle' }, tcgOnline: 'JU', \
         releaseDate: '1999-06-16', cardCount: { official: 64, total: 64 }, \
         abbreviations: { official: 'JU' }, thirdParty: { cardmarket: 1234 } }",
    );
    write(
        data,
        "base/Jungle/1.ts",
        "const card: Card = { localId: '1', name: { en: 'Clefable' }, category: 'Pokemon', \
         illustrator: 'Ken Sugimori', evolveFrom: { en: 'Clefairy' }, retreat: 2, \
         subtypes: ['Stage 1'], thirdParty: { cardmarket: 9, tcgplayer: 10 } }",
    );

    let catalog = walk_catalog(data, &WalkOptions::default());
    let set = &catalog.series["base"].sets["base2"];
    assert_eq!(set.platform_code, "JU");
    assert_eq!(set.release_date, "1999-06-16 00:00:00.000");
    assert_eq!(set.official_count, Some(64));
    assert_eq!(set.total_count, Some(64));
    assert_eq!(set.abbreviations["official"], "JU");
    assert_eq!(set.third_party["cardmarket"], "1234");

    let card = &set.cards["1"];
    assert_eq!(card.number, "1");
    assert_eq!(card.supertype, "Pokemon");
    assert_eq!(card.artist, "Ken Sugimori");
    assert_eq!(card.evolves_from.get("en"), "Clefairy");
    assert_eq!(card.retreat, Some(2));
    assert_eq!(card.subtypes, vec!["Stage 1"]);
    assert_eq!(card.third_party["tcgplayer"], "10");
}

#[test]
fn duplicate_set_ids_keep_the_first() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();
    write(data, "A.ts", "id: 'a'");
    write(data, "B.ts", "id: 'b'");
    write(data, "a/one/one.ts", "id: 'dup', name: { en: 'First' }");
    write(data, "b/two/two.ts", "id: 'dup', name: { en: 'Second' }");

    let catalog = walk_catalog(data, &WalkOptions::default());
    assert_eq!(catalog.set_count(), 1);
    assert_eq!(catalog.find_set("dup").unwrap().names.get("en"), "First");
}

#[test]
fn other_extensions_are_ignored() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();
    write(data, "Base.ts", "id: 'base'");
    write(data, "base/s/c.ts", "id: 'c'");
    write(data, "base/s/README.md", "id: 'readme'");

    let catalog = walk_catalog(data, &WalkOptions::default());
    let set = &catalog.series["base"].sets["s"];
    assert_eq!(set.cards.keys().collect::<Vec<_>>(), vec!["c"]);
}

#[test]
fn embedded_set_reference_does_not_become_card_id() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();
    write(data, "Base.ts", "id: 'base'");
    write(data, "base/set1/1.ts", "set: { id: 'set1' }, name: { en: 'Alakazam' }");
    write(data, "base/set1/2.ts", "set: { id: 'set1' }, name: { en: 'Blastoise' }");

    let catalog = walk_catalog(data, &WalkOptions::default());
    let set = &catalog.series["base"].sets["set1"];
    assert_eq!(set.cards.keys().collect::<Vec<_>>(), vec!["1", "2"]);
    assert_eq!(set.cards["2"].names.get("en"), "Blastoise");
}

#[test]
fn embedded_series_reference_does_not_become_set_id() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path();
    write(data, "Base.ts", "id: 'base'");
    write(data, "base/one/one.ts", "serie: { id: 'base' }, name: { en: 'One' }");
    write(data, "base/two/two.ts", "serie: { id: 'base' }, name: { en: 'Two' }");

    let catalog = walk_catalog(data, &WalkOptions::default());
    let sets = &catalog.series["base"].sets;
    assert_eq!(sets.keys().collect::<Vec<_>>(), vec!["one", "two"]);
    assert_eq!(sets["two"].names.get("en"), "Two");
}
