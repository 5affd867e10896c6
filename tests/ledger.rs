// tests/ledger.rs
mod common;

use std::{fs, thread, time::Duration};

use common::tmp_dir;
use threes_check::{
    config::options::LedgerOptions,
    error::LedgerError,
    store::{LedgerStore, Recorder},
};

fn store_in(name: &str) -> LedgerStore {
    LedgerStore::new(&LedgerOptions {
        path: tmp_dir(name).join("results.json"),
        backoff: Duration::from_millis(20),
        attempts: 50,
        ..Default::default()
    })
}

#[test]
fn concurrent_writers_lose_nothing() {
    let store = store_in("concurrent");
    store.initialize().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|w| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..5 {
                    store.record(&format!("P{w}-{i}"), (w + i) % 2 == 0).unwrap();
                }
            })
        })
        .collect();
    handles.into_iter().for_each(|h| h.join().unwrap());

    let ledger = store.read();
    assert_eq!(ledger.recorded(), 40);
    assert!(ledger.passed.iter().all(|n| !ledger.failed.contains(n)));
}

#[test]
fn recorder_drains_before_finish_returns() {
    let store = store_in("recorder");
    store.initialize().unwrap();

    let recorder = Recorder::spawn(store.clone());
    recorder.send("Luka Doncic".into(), true);
    recorder.send("Dante Exum".into(), false);
    recorder.send("Luka Doncic".into(), false);
    let stats = recorder.finish();

    assert_eq!((stats.recorded, stats.duplicates, stats.lost), (2, 1, 0));
    let ledger = store.read();
    assert_eq!(ledger.passed, ["Luka Doncic"]);
    assert_eq!(ledger.failed, ["Dante Exum"]);
}

#[test]
fn stale_lock_is_reclaimed() {
    let dir = tmp_dir("stale");
    let path = dir.join("results.json");
    let store = LedgerStore::new(&LedgerOptions {
        path: path.clone(),
        stale_lock: Duration::ZERO,
        attempts: 3,
        backoff: Duration::from_millis(5),
        ..Default::default()
    });
    fs::write(dir.join("results.json.lock"), "12345\n").unwrap();
    thread::sleep(Duration::from_millis(20));

    assert!(store.record("A", true).unwrap());
    assert!(!dir.join("results.json.lock").exists());
}

#[test]
fn held_lock_reports_contention() {
    let dir = tmp_dir("held");
    let store = LedgerStore::new(&LedgerOptions {
        path: dir.join("results.json"),
        attempts: 3,
        backoff: Duration::from_millis(1),
        stale_lock: Duration::from_secs(3600),
        ..Default::default()
    });
    fs::write(dir.join("results.json.lock"), "12345\n").unwrap();

    match store.record("A", true) {
        Err(LedgerError::Contention { attempts }) => assert_eq!(attempts, 3),
        other => panic!("expected contention, got {other:?}"),
    }
    assert_eq!(store.read().recorded(), 0);
}

#[test]
fn initialize_replaces_previous_run() {
    let store = store_in("reinit");
    store.initialize().unwrap();
    store.record("A", true).unwrap();
    let first = store.read().timestamp;

    thread::sleep(Duration::from_millis(5));
    let fresh = store.initialize().unwrap();
    assert_eq!(store.read().recorded(), 0);
    assert!(fresh.timestamp >= first);
}

#[test]
fn ledger_file_shape() {
    let store = store_in("shape");
    store.initialize().unwrap();
    store.record("Kyrie Irving", true).unwrap();

    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert!(v["timestamp"].is_string());
    assert_eq!(v["passed"], serde_json::json!(["Kyrie Irving"]));
    assert_eq!(v["failed"], serde_json::json!([]));
}
