//! Tests for Store
//!
//! These tests verify:
//! - add / remove / update / find / list semantics
//! - Every successful mutation is persisted, failed ones write nothing
//! - Reopening a store sees the last successful mutation
//! - Save failure policies (log vs propagate)
//! - Corrupt files and interrupted saves at open time
//! - Both formats behave the same through the store

use std::fs;
use std::path::{Path, PathBuf};

use stockpile::codec::{Codec, JsonCodec};
use stockpile::store::{temp_path, StagedWrite};
use stockpile::{
    Config, Format, MalformedLinePolicy, Record, RecordMap, SaveFailurePolicy, StockError, Store,
    WriteMode,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn json_config(path: &Path) -> Config {
    Config::builder().backing_path(path).format(Format::Json).build()
}

fn delimited_config(path: &Path) -> Config {
    Config::builder()
        .backing_path(path)
        .format(Format::Delimited)
        .build()
}

fn setup_temp_store() -> (TempDir, PathBuf, Store) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.json");
    let store = Store::open(json_config(&path));
    (temp_dir, path, store)
}

fn bolt() -> Record {
    Record::new("P1", "Bolt", 10, 0.5)
}

fn ids(records: &[&Record]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_missing_file_is_empty() {
    let (_temp, path, store) = setup_temp_store();

    assert!(store.is_empty());
    assert_eq!(store.path(), path.as_path());
    assert!(store.load_report().load_error.is_none());
    // Opening alone writes nothing
    assert!(!path.exists());
}

#[test]
fn test_open_path_uses_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("stock.db");

    let store = Store::open_path(&path);

    assert_eq!(store.config().format, Format::Json);
    assert_eq!(store.config().write_mode, WriteMode::Atomic);
    assert_eq!(store.path(), path.as_path());
}

#[test]
fn test_open_corrupt_json_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.json");
    fs::write(&path, b"{\"P1\": [1, 2,").unwrap();

    let store = Store::open(json_config(&path));

    assert!(store.is_empty());
    assert!(store
        .load_report()
        .load_error
        .as_ref()
        .is_some_and(StockError::is_recoverable));
}

#[test]
fn test_corrupt_file_is_overwritten_by_next_save() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.json");
    fs::write(&path, b"garbage").unwrap();

    let mut store = Store::open(json_config(&path));
    assert!(store.add(bolt()).unwrap());

    let reopened = Store::open(json_config(&path));
    assert_eq!(reopened.find_by_id("P1"), Some(&bolt()));
}

// =============================================================================
// Add Tests
// =============================================================================

#[test]
fn test_add_and_find() {
    let (_temp, _path, mut store) = setup_temp_store();

    assert!(store.add(bolt()).unwrap());

    assert_eq!(store.find_by_id("P1"), Some(&bolt()));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_add_duplicate_id_is_rejected() {
    let (_temp, path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();
    let saved = fs::read(&path).unwrap();

    let added = store.add(Record::new("P1", "Other", 99, 9.99)).unwrap();

    assert!(!added);
    assert_eq!(store.find_by_id("P1"), Some(&bolt()));
    assert_eq!(store.len(), 1);
    assert_eq!(fs::read(&path).unwrap(), saved);
}

#[test]
fn test_add_persists() {
    let (_temp, path, mut store) = setup_temp_store();

    store.add(bolt()).unwrap();

    let reopened = Store::open(json_config(&path));
    assert_eq!(reopened.find_by_id("P1"), Some(&bolt()));
}

// =============================================================================
// Remove Tests
// =============================================================================

#[test]
fn test_remove_existing() {
    let (_temp, path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();

    assert!(store.remove("P1").unwrap());

    assert!(store.find_by_id("P1").is_none());
    let reopened = Store::open(json_config(&path));
    assert!(reopened.is_empty());
}

#[test]
fn test_remove_missing_writes_nothing() {
    let (_temp, path, mut store) = setup_temp_store();

    assert!(!store.remove("nope").unwrap());
    assert!(!path.exists());
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_quantity_only() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();

    assert!(store.update("P1", Some(5), None).unwrap());

    let record = store.find_by_id("P1").unwrap();
    assert_eq!(record.quantity, 5);
    assert_eq!(record.price, 0.5);
    assert_eq!(record.name, "Bolt");
}

#[test]
fn test_update_price_only() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();

    assert!(store.update("P1", None, Some(0.75)).unwrap());

    let record = store.find_by_id("P1").unwrap();
    assert_eq!(record.quantity, 10);
    assert_eq!(record.price, 0.75);
}

#[test]
fn test_update_both_fields_persists() {
    let (_temp, path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();

    store.update("P1", Some(1), Some(2.5)).unwrap();

    let reopened = Store::open(json_config(&path));
    assert_eq!(reopened.find_by_id("P1"), Some(&Record::new("P1", "Bolt", 1, 2.5)));
}

#[test]
fn test_update_missing_returns_false_and_writes_nothing() {
    let (_temp, path, mut store) = setup_temp_store();

    assert!(!store.update("nope", Some(5), None).unwrap());
    assert!(!path.exists());
}

// =============================================================================
// Search Tests
// =============================================================================

#[test]
fn test_find_by_name_is_case_insensitive_substring() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.add(Record::new("A1", "Widget A", 1, 1.0)).unwrap();
    store.add(Record::new("B1", "gadget B", 2, 2.0)).unwrap();

    let found = store.find_by_name("widget");

    assert_eq!(ids(&found), vec!["A1"]);
    assert_eq!(ids(&store.find_by_name("DGET")), vec!["B1"]);
    assert_eq!(ids(&store.find_by_name("get")), vec!["A1", "B1"]);
}

#[test]
fn test_find_by_name_no_match_is_empty() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();

    assert!(store.find_by_name("sprocket").is_empty());
}

#[test]
fn test_find_by_name_empty_term_matches_all() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();
    store.add(Record::new("P2", "", 1, 1.0)).unwrap();

    assert_eq!(store.find_by_name("").len(), 2);
}

#[test]
fn test_find_by_id_is_exact() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();

    assert!(store.find_by_id("p1").is_none());
    assert!(store.find_by_id("P").is_none());
}

#[test]
fn test_list_all_in_id_order() {
    let (_temp, _path, mut store) = setup_temp_store();
    store.add(Record::new("C", "c", 1, 1.0)).unwrap();
    store.add(Record::new("A", "a", 1, 1.0)).unwrap();
    store.add(Record::new("B", "b", 1, 1.0)).unwrap();

    assert_eq!(ids(&store.list_all()), vec!["A", "B", "C"]);
}

// =============================================================================
// Save Failure Policy Tests
// =============================================================================

#[test]
fn test_propagate_policy_returns_save_error() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("not-yet");
    let path = dir.join("inventory.json");
    let mut store = Store::open(json_config(&path));

    let err = store.add(bolt()).unwrap_err();

    match err {
        StockError::Persistence { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("expected persistence error, got {other}"),
    }
    assert!(!temp_path(&path).exists());

    // Memory is ahead of disk until a retry succeeds
    assert_eq!(store.find_by_id("P1"), Some(&bolt()));
    fs::create_dir(&dir).unwrap();
    store.persist().unwrap();
    let reopened = Store::open(json_config(&path));
    assert_eq!(reopened.find_by_id("P1"), Some(&bolt()));
}

#[test]
fn test_log_policy_reports_success() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("not-yet").join("inventory.txt");
    let mut store = Store::open(delimited_config(&path));
    assert_eq!(store.config().on_save_failure, SaveFailurePolicy::Log);

    assert!(store.add(bolt()).unwrap());
    assert!(store.update("P1", Some(3), None).unwrap());

    assert_eq!(store.find_by_id("P1").unwrap().quantity, 3);
    assert!(!path.exists());
    // persist itself still reports the failure
    assert!(matches!(store.persist(), Err(StockError::Persistence { .. })));
}

#[test]
fn test_unencodable_record_under_propagate() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.txt");
    let config = Config::builder()
        .backing_path(&path)
        .format(Format::Delimited)
        .on_save_failure(SaveFailurePolicy::Propagate)
        .build();
    let mut store = Store::open(config);

    let err = store.add(Record::new("P1", "Bolt|Nut", 1, 1.0)).unwrap_err();

    assert!(matches!(err, StockError::Serialization(_)));
    assert!(!path.exists());
}

#[test]
fn test_unencodable_add_under_log_leaves_store_usable() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.txt");
    let mut store = Store::open(delimited_config(&path));
    assert_eq!(store.config().on_save_failure, SaveFailurePolicy::Log);

    assert!(store.add(bolt()).unwrap());
    let err = store.add(Record::new("P2", "A|B", 1, 1.0)).unwrap_err();
    assert!(matches!(err, StockError::Serialization(_)));
    assert!(store.find_by_id("P2").is_none());

    // Later mutations still reach the file
    assert!(store.add(Record::new("P3", "Nut", 5, 0.1)).unwrap());
    assert!(store.update("P1", Some(99), None).unwrap());

    let reopened = Store::open(delimited_config(&path));
    assert_eq!(ids(&reopened.list_all()), vec!["P1", "P3"]);
    assert_eq!(reopened.find_by_id("P1").unwrap().quantity, 99);
}

#[test]
fn test_non_finite_price_is_refused_and_file_unchanged() {
    let (_temp, path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();
    let before = fs::read(&path).unwrap();

    let err = store
        .add(Record::new("P2", "Nut", 1, f64::INFINITY))
        .unwrap_err();
    assert!(matches!(err, StockError::Serialization(_)));
    assert!(store.find_by_id("P2").is_none());
    assert_eq!(fs::read(&path).unwrap(), before);

    let reopened = Store::open(json_config(&path));
    assert_eq!(ids(&reopened.list_all()), vec!["P1"]);
}

#[test]
fn test_update_to_non_finite_price_leaves_record_unchanged() {
    let (_temp, path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();
    let before = fs::read(&path).unwrap();

    let err = store.update("P1", Some(7), Some(f64::NAN)).unwrap_err();

    assert!(matches!(err, StockError::Serialization(_)));
    assert_eq!(store.find_by_id("P1"), Some(&bolt()));
    assert_eq!(fs::read(&path).unwrap(), before);
}

// =============================================================================
// Crash Tests
// =============================================================================

#[test]
fn test_crash_between_stage_and_commit_keeps_old_state() {
    let (_temp, path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();
    let before = fs::read(&path).unwrap();

    // Stage a newer image, then "die" before commit
    let mut newer = RecordMap::new();
    newer.insert("P2".to_string(), Record::new("P2", "Nut", 1, 0.1));
    let staged = StagedWrite::stage(&path, &JsonCodec::new().encode(&newer).unwrap()).unwrap();
    std::mem::forget(staged);

    assert_eq!(fs::read(&path).unwrap(), before);

    let reopened = Store::open(json_config(&path));
    assert!(reopened.load_report().discarded_temp);
    assert_eq!(reopened.find_by_id("P1"), Some(&bolt()));
    assert!(reopened.find_by_id("P2").is_none());
    assert!(!temp_path(&path).exists());
}

#[test]
fn test_crash_after_target_removed_recovers_new_state() {
    let (_temp, path, mut store) = setup_temp_store();
    store.add(bolt()).unwrap();

    let mut newer = RecordMap::new();
    newer.insert("P1".to_string(), Record::new("P1", "Bolt", 20, 0.5));
    let staged = StagedWrite::stage(&path, &JsonCodec::new().encode(&newer).unwrap()).unwrap();
    std::mem::forget(staged);
    fs::remove_file(&path).unwrap();

    let reopened = Store::open(json_config(&path));

    assert!(reopened.load_report().recovered_from_temp);
    assert_eq!(reopened.find_by_id("P1").unwrap().quantity, 20);
    assert!(path.exists());
}

// =============================================================================
// Delimited Store Tests
// =============================================================================

#[test]
fn test_delimited_store_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.txt");

    let mut store = Store::open(delimited_config(&path));
    store.add(bolt()).unwrap();
    store.add(Record::new("P2", "Hex Nut", 200, 0.05)).unwrap();
    store.remove("P1").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "P2|Hex Nut|200|0.05\n");

    let reopened = Store::open(delimited_config(&path));
    assert_eq!(reopened.list_all(), vec![&Record::new("P2", "Hex Nut", 200, 0.05)]);
}

#[test]
fn test_delimited_store_skips_bad_lines_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.txt");
    fs::write(&path, "P1|Bolt|10|0.5\nP2|Nut\nP3|Gear|1|4\n").unwrap();

    let store = Store::open(delimited_config(&path));

    assert_eq!(ids(&store.list_all()), vec!["P1", "P3"]);
    assert_eq!(store.load_report().lines_skipped, 1);
}

#[test]
fn test_delimited_store_stop_policy() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.txt");
    fs::write(&path, "P1|Bolt|10|0.5\nP2|Nut\nP3|Gear|1|4\n").unwrap();
    let config = Config::builder()
        .backing_path(&path)
        .format(Format::Delimited)
        .on_malformed_line(MalformedLinePolicy::Stop)
        .build();

    let store = Store::open(config);

    assert_eq!(ids(&store.list_all()), vec!["P1"]);
    assert!(store.load_report().stopped_early);
}

#[test]
fn test_delimited_store_with_atomic_writes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.txt");
    let config = Config::builder()
        .backing_path(&path)
        .format(Format::Delimited)
        .write_mode(WriteMode::Atomic)
        .build();

    let mut store = Store::open(config.clone());
    store.add(bolt()).unwrap();

    assert!(!temp_path(&path).exists());
    assert_eq!(Store::open(config).find_by_id("P1"), Some(&bolt()));
}

// =============================================================================
// Scenario
// =============================================================================

#[test]
fn test_add_find_update_reopen_scenario() {
    for format in [Format::Json, Format::Delimited] {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("inventory");
        let config = Config::builder().backing_path(&path).format(format).build();

        let mut store = Store::open(config.clone());
        assert!(store.add(Record::new("P1", "Bolt", 10, 0.5)).unwrap());
        assert_eq!(store.find_by_id("P1"), Some(&Record::new("P1", "Bolt", 10, 0.5)));
        assert!(store.update("P1", Some(20), None).unwrap());

        let reopened = Store::open(config);
        let record = reopened.find_by_id("P1").unwrap();
        assert_eq!(record.quantity, 20, "format {format}");
        assert_eq!(record.price, 0.5, "format {format}");
    }
}
