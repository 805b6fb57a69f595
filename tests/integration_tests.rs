//! Integration tests for CaskDB

use caskdb::record::Recovery;
use caskdb::DiskStore;
use tempfile::TempDir;

// =============================================================================
// End-to-end Scenario
// =============================================================================

#[test]
fn test_books_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db");

    let store = DiskStore::open_path(&path).unwrap();
    store.set("othello", "shakespeare").unwrap();
    assert_eq!(store.get("othello").unwrap(), Some("shakespeare".to_string()));

    store.set("othello", "revised").unwrap();
    assert_eq!(store.get("othello").unwrap(), Some("revised".to_string()));
    store.close().unwrap();

    let store = DiskStore::open_path(&path).unwrap();
    assert_eq!(store.get("othello").unwrap(), Some("revised".to_string()));
    assert_eq!(store.get("missing").unwrap(), None);
    store.close().unwrap();

    // both records are still on disk, only the latest is indexed
    let report = Recovery::verify(&path).unwrap();
    assert_eq!(report.records_scanned, 2);
    assert_eq!(report.live_keys, 1);
}

#[test]
fn test_reopen_many_times() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db");

    for round in 0..5 {
        let store = DiskStore::open_path(&path).unwrap();
        if round > 0 {
            assert_eq!(store.get("round").unwrap(), Some((round - 1).to_string()));
        }
        store.set("round", &round.to_string()).unwrap();
        store.set(&format!("seen{}", round), "yes").unwrap();
        store.close().unwrap();
    }

    let store = DiskStore::open_path(&path).unwrap();
    assert_eq!(store.len().unwrap(), 6);
    assert_eq!(store.get("round").unwrap(), Some("4".to_string()));
}
