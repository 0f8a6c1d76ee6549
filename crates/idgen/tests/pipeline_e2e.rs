//! File in, mapping out: extraction, review, generation and export together.

use idgen::ids::{content_hash, HashSettings, IdStrategy};
use idgen::names::{analyze, normalize, resolve_all, DuplicateChoice, Rejection};
use idgen::pipeline::generate;
use idgen::protocol::{ExportFormat, HashAlgorithm, IdGenConfig};
use idgen::sinks::{write_export, ExportOptions};
use idgen::source::{extract, SourceLimits};
use proptest::prelude::*;
use std::collections::HashSet;
use std::fs;
use tempfile::tempdir;

fn ids(generation: &idgen::Generation) -> Vec<&str> {
    generation.records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn test_validity_boundary() {
    assert_eq!(normalize("123"), Err(Rejection::Numeric));
    assert!(normalize("!!!").is_err());
    assert_eq!(normalize("  john   doe  ").unwrap().as_str(), "John Doe");
}

#[test]
fn test_duplicates_survive_to_export() {
    let analysis = analyze(&["Ann", "ann", "Bob"]);
    assert_eq!(analysis.total(), 3);
    assert_eq!(analysis.duplicate_group_count(), 1);
    let group = &analysis.groups[0];
    assert_eq!(group.name.as_str(), "Ann");
    assert_eq!(group.count, 2);
    assert_eq!(group.positions, vec![0, 1]);

    let curated = resolve_all(&analysis, DuplicateChoice::KeepAll);
    assert_eq!(curated.len(), 3);

    let generation = generate(curated.names(), &IdStrategy::default()).unwrap();
    let anns: Vec<_> = generation.records.iter().filter(|r| r.name == "Ann").collect();
    assert_eq!(anns.len(), 2);
    assert_eq!(anns[0].id, anns[1].id);
    assert!(generation.uniqueness.is_unique);
}

#[test]
fn test_keep_one_drops_repeats() {
    let analysis = analyze(&["Ann", "ann", "Bob", "ANN"]);
    let curated = resolve_all(&analysis, DuplicateChoice::KeepOne);
    let names: Vec<&str> = curated.names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names, ["Ann", "Bob"]);

    let removed = resolve_all(&analysis, DuplicateChoice::RemoveAll);
    let names: Vec<&str> = removed.names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names, ["Bob"]);
}

#[test]
fn test_sequential_ignores_content() {
    let analysis = analyze(&["Zed", "Zed", "Amy"]);
    let curated = resolve_all(&analysis, DuplicateChoice::KeepAll);
    let generation = generate(curated.names(), &IdStrategy::sequential()).unwrap();
    assert_eq!(ids(&generation), ["ID001", "ID002", "ID003"]);
}

#[test]
fn test_hash_is_stable_across_runs_and_case() {
    let settings = HashSettings::new(HashAlgorithm::Sha256).with_salt("study-7");
    let strategy = IdStrategy::ContentHash(settings.clone());

    let first = generate(&analyze(&["mary jones", "Bob"]).valid_names, &strategy).unwrap();
    let second = generate(&analyze(&["MARY JONES", "bob"]).valid_names, &strategy).unwrap();
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first.records[0].id, content_hash("Mary Jones", &settings));
    assert_eq!(first.records[0].id.len(), 64);
    assert_ne!(first.run_id, second.run_id);
}

#[test]
fn test_csv_column_priority() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("roster.csv");
    fs::write(
        &path,
        "Subject,Name,Trial\nS1,ann lee,T1\nS2,Bob Ray,T1\nS3,  carla   diaz ,T2\n",
    )
    .unwrap();

    let extraction = extract(&path, &SourceLimits::default()).unwrap();
    assert_eq!(extraction.column.as_deref(), Some("Name"));
    assert_eq!(extraction.names, ["ann lee", "Bob Ray", "carla diaz"]);
}

#[test]
fn test_txt_truncation_notice() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("names.txt");
    let body: String = (0..25).map(|i| format!("Person {}\n", (b'A' + i) as char)).collect();
    fs::write(&path, body).unwrap();

    let limits = SourceLimits {
        max_names: 10,
        ..SourceLimits::default()
    };
    let extraction = extract(&path, &limits).unwrap();
    assert_eq!(extraction.names.len(), 10);
    assert_eq!(extraction.truncated_from, Some(25));
    assert_eq!(extraction.message, "File contains 25 names. Showing first 10.");
}

#[test]
fn test_xlsx_export_reads_back() {
    let temp = tempdir().unwrap();
    let input = temp.path().join("names.txt");
    fs::write(&input, "bob ray, ann lee\nÉlodie Brun\n42\n").unwrap();

    let extraction = extract(&input, &SourceLimits::default()).unwrap();
    let analysis = analyze(&extraction.names);
    assert_eq!(analysis.total(), 3);

    let curated = resolve_all(&analysis, DuplicateChoice::KeepAll);
    let generation = generate(curated.names(), &IdStrategy::default()).unwrap();

    let output = temp.path().join("out").join("mapping.xlsx");
    let artifact = write_export(
        &generation.records,
        &output,
        ExportFormat::Xlsx,
        &ExportOptions::from_config(&IdGenConfig::default()),
    )
    .unwrap();
    assert_eq!(artifact.records, 3);

    let reread = extract(&output, &SourceLimits::default()).unwrap();
    assert_eq!(reread.column.as_deref(), Some("Name"));
    assert_eq!(reread.names, ["Ann Lee", "Bob Ray", "Élodie Brun"]);
}

#[test]
fn test_unsupported_extension_is_rejected_before_reading() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("names.json");
    fs::write(&path, "[\"Ann\"]").unwrap();
    let err = extract(&path, &SourceLimits::default()).unwrap_err();
    assert!(err.to_string().contains(".json"));
}

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(raw in "\\PC{0,30}") {
        if let Ok(once) = normalize(&raw) {
            let twice = normalize(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn prop_order_and_count_preserved(
        raw in prop::collection::vec("[a-z]{2,8}( [a-z]{2,8})?", 1..40)
    ) {
        let analysis = analyze(&raw);
        let generation = generate(&analysis.valid_names, &IdStrategy::sequential()).unwrap();
        prop_assert_eq!(generation.records.len(), analysis.valid_names.len());
        for (record, name) in generation.records.iter().zip(&analysis.valid_names) {
            prop_assert_eq!(record.name.as_str(), name.as_str());
        }
    }

    #[test]
    fn prop_distinct_names_get_distinct_ids(
        raw in prop::collection::hash_set("[a-z]{2,10}", 1..50)
    ) {
        let raw: Vec<String> = raw.into_iter().collect();
        let analysis = analyze(&raw);
        let strategies = [
            IdStrategy::default(),
            IdStrategy::sequential(),
            IdStrategy::RandomUnique,
        ];
        for strategy in strategies {
            let generation = generate(&analysis.valid_names, &strategy).unwrap();
            let distinct: HashSet<&str> = ids(&generation).into_iter().collect();
            prop_assert_eq!(distinct.len(), generation.records.len());
            prop_assert!(generation.uniqueness.is_unique);
        }
    }
}
