/*!
 * Persistence Tests
 * File-backed store, record codec and self-healing decode
 */

use super::common::{registry, RunLog};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use tick_kernel::persistence::{PersistedState, ProcessRecord};
use tick_kernel::{
    FileStore, FixedBudget, Kernel, MemoryStore, Priority, SleepDuration, SleepInfo, Store,
    StoreError,
};

#[test]
fn test_file_store_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path().join("state.json")).unwrap();

    assert_eq!(store.document(), json!({}));
    assert_eq!(store.get("pidCounter"), None);
}

#[test]
fn test_file_store_flush_and_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("state.json");

    let mut store = FileStore::open(&path).unwrap();
    store.set("pidCounter", json!(3));
    store.set("processTable", json!([[0, 0, "Recorder", 0]]));
    store.flush().unwrap();

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.document(), store.document());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn test_file_store_rejects_malformed_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, "{ not json").unwrap();

    let result = FileStore::open(&path);
    assert!(matches!(result, Err(StoreError::Json { .. })));
}

#[test]
fn test_kernel_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let log = RunLog::default();
    let budget = FixedBudget::unlimited();

    {
        let mut store = FileStore::open(&path).unwrap();
        store.set(
            "processTable",
            json!([[0, 0, "Recorder", 0], [1, 0, "Spawner", 2]]),
        );
        let mut kernel = Kernel::new(registry(&log, &budget));
        kernel.tick(&mut store).unwrap();
        store.flush().unwrap();
    }

    let mut store = FileStore::open(&path).unwrap();
    let mut kernel = Kernel::new(registry(&log, &budget));
    let report = kernel.load(&mut store);

    assert_eq!(report.loaded, 3);
    assert!(report.repaired.is_empty());
    assert_eq!(store.get("processMemory").unwrap()["1"], json!({"child": 2}));
}

#[test]
fn test_record_codec_shapes() {
    let awake = ProcessRecord::new(4, 1, "Recorder", Priority::High);
    let asleep = ProcessRecord::new(5, 1, "Recorder", Priority::Low)
        .with_sleep(SleepInfo::new(9, SleepDuration::Ticks(3)));

    assert_eq!(serde_json::to_value(&awake).unwrap(), json!([4, 1, "Recorder", 1]));
    assert_eq!(
        serde_json::to_value(&asleep).unwrap(),
        json!([5, 1, "Recorder", 3, {"start": 9, "duration": 3}])
    );

    let with_null: ProcessRecord =
        serde_json::from_value(json!([4, 1, "Recorder", 1, null])).unwrap();
    assert_eq!(with_null, awake);
}

#[test]
fn test_decode_keeps_good_records_around_bad_ones() {
    let store = MemoryStore::from_document(json!({
        "pidCounter": 2,
        "processTable": [[0, 0, "Recorder", 0], ["x"], [2, 0, "Recorder", 9]],
        "processMemory": {"0": {"k": "v"}}
    }));

    let state = PersistedState::decode(&store);

    assert_eq!(state.records.len(), 2);
    assert_eq!(state.records[1].priority, Priority::Low);
    assert_eq!(state.memory[&0], json!({"k": "v"}));
    assert!(state.repaired.is_empty());
}

#[test]
fn test_malformed_sleep_info_keeps_subtree() {
    let mut store = MemoryStore::from_document(json!({
        "pidCounter": 2,
        "processTable": [
            [0, 0, "Recorder", 0],
            [1, 0, "Recorder", 2, {"start": 1}],
            [2, 1, "Recorder", 2]
        ],
        "processMemory": {}
    }));
    let log = RunLog::default();
    let mut kernel = Kernel::new(registry(&log, &FixedBudget::unlimited()));

    kernel.tick(&mut store).unwrap();

    let ran: Vec<_> = log.lock().iter().map(|(_, pid)| *pid).collect();
    assert_eq!(ran, vec![0, 1, 2]);
    assert_eq!(
        store.get("processTable"),
        Some(json!([[0, 0, "Recorder", 0], [1, 0, "Recorder", 2], [2, 1, "Recorder", 2]]))
    );
}
