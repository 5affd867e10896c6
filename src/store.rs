// src/store.rs
// Shared pass/fail ledger on disk.
//
// Every writer takes `<ledger>.lock` (create-new) before its read-modify-write
// and replaces the ledger by renaming a temp file over it, so readers never
// see a half-written document. Inside one process all writes go through a
// single `Recorder` thread. The lock file holds its owner's token and only the
// owner removes it. A stale lock is renamed to a unique name before removal.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc,
    },
    thread,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::options::LedgerOptions;
use crate::error::LedgerError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub passed: Vec<String>,
    #[serde(default)]
    pub failed: Vec<String>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self { timestamp: Utc::now(), passed: Vec::new(), failed: Vec::new() }
    }

    /// Some(true) passed, Some(false) failed, None not recorded.
    pub fn outcome(&self, name: &str) -> Option<bool> {
        if self.passed.iter().any(|n| n == name) {
            Some(true)
        } else if self.failed.iter().any(|n| n == name) {
            Some(false)
        } else {
            None
        }
    }

    /// Insert unless the name is already in either set. True if inserted.
    pub fn insert(&mut self, name: &str, passed: bool) -> bool {
        if self.outcome(name).is_some() {
            return false;
        }
        let set = if passed { &mut self.passed } else { &mut self.failed };
        set.push(name.to_string());
        true
    }

    pub fn recorded(&self) -> usize {
        self.passed.len() + self.failed.len()
    }
}

/// Anything the summary can poll for the current ledger.
pub trait LedgerSource {
    fn read(&self) -> Ledger;
}

#[derive(Clone, Debug)]
pub struct LedgerStore {
    path: PathBuf,
    lock_path: PathBuf,
    attempts: u32,
    backoff: Duration,
    stale_lock: Duration,
}

impl LedgerStore {
    pub fn new(opts: &LedgerOptions) -> Self {
        Self {
            path: opts.path.clone(),
            lock_path: sibling(&opts.path, "lock"),
            attempts: opts.attempts.max(1),
            backoff: opts.backoff,
            stale_lock: opts.stale_lock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replace the ledger with an empty one stamped now.
    pub fn initialize(&self) -> Result<Ledger, LedgerError> {
        let _lock = self.lock()?;
        let ledger = Ledger::new();
        self.write(&ledger)?;
        logd!("ledger initialized at {}", self.path.display());
        Ok(ledger)
    }

    /// Record one outcome. Ok(false) when the name was already present.
    pub fn record(&self, name: &str, passed: bool) -> Result<bool, LedgerError> {
        let _lock = self.lock()?;
        let mut ledger = self.read();
        if !ledger.insert(name, passed) {
            return Ok(false);
        }
        self.write(&ledger)?;
        Ok(true)
    }

    /// Current ledger; an empty one when the file is missing or unreadable.
    pub fn read(&self) -> Ledger {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    logd!("ledger read {}: {e}", self.path.display());
                }
                return Ledger::new();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            logd!("ledger parse {}: {e}", self.path.display());
            Ledger::new()
        })
    }

    fn write(&self, ledger: &Ledger) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| LedgerError::io(parent, e))?;
            }
        }
        let body = serde_json::to_string_pretty(ledger)?;
        let tmp = sibling(&self.path, &format!("{}.tmp", std::process::id()));
        fs::write(&tmp, body).map_err(|e| LedgerError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            LedgerError::io(&self.path, e)
        })
    }

    /// Take the lock file, retrying with a fixed backoff while another writer holds it.
    fn lock(&self) -> Result<LockGuard, LedgerError> {
        let token = lock_token();
        for attempt in 1..=self.attempts {
            match OpenOptions::new().write(true).create_new(true).open(&self.lock_path) {
                Ok(mut f) => {
                    if let Err(e) = writeln!(f, "{token}") {
                        let _ = fs::remove_file(&self.lock_path);
                        return Err(LedgerError::io(&self.lock_path, e));
                    }
                    return Ok(LockGuard { path: self.lock_path.clone(), token });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if self.reclaim_stale_lock() {
                        continue;
                    }
                    logd!("ledger locked (attempt {attempt}/{})", self.attempts);
                    if attempt < self.attempts {
                        thread::sleep(self.backoff);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    // Lock lives next to the ledger; create the directory once.
                    let dir = self.lock_path.parent().unwrap_or(Path::new("."));
                    fs::create_dir_all(dir).map_err(|e| LedgerError::io(dir, e))?;
                }
                Err(e) => return Err(LedgerError::io(&self.lock_path, e)),
            }
        }
        Err(LedgerError::Contention { attempts: self.attempts })
    }

    /// Remove a lock left behind by a writer that died. True if removed.
    fn reclaim_stale_lock(&self) -> bool {
        let age = fs::metadata(&self.lock_path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| SystemTime::now().duration_since(t).ok());
        match age {
            Some(age) if age > self.stale_lock => {}
            _ => return false,
        }

        let seen = fs::read_to_string(&self.lock_path).unwrap_or_default();
        let parked = sibling(&self.lock_path, &format!("stale.{}", lock_token().replace(':', "-")));
        // Only one reclaimer wins the rename.
        if fs::rename(&self.lock_path, &parked).is_err() {
            return false;
        }
        if !self.release_parked(&parked, &seen) {
            return false;
        }
        logf!("removed stale ledger lock ({}s old)", age.map_or(0, |a| a.as_secs()));
        true
    }

    /// Delete a parked lock if it is the stale one that was inspected. A lock
    /// taken in between is put back (without overwriting a newer one).
    fn release_parked(&self, parked: &Path, seen: &str) -> bool {
        let moved = fs::read_to_string(parked).unwrap_or_default();
        if moved != seen {
            logd!("ledger lock changed hands during reclaim; restoring it");
            let _ = fs::hard_link(parked, &self.lock_path);
            let _ = fs::remove_file(parked);
            return false;
        }
        fs::remove_file(parked).is_ok()
    }
}

impl LedgerSource for LedgerStore {
    fn read(&self) -> Ledger {
        LedgerStore::read(self)
    }
}

struct LockGuard {
    path: PathBuf,
    token: String,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        match fs::read_to_string(&self.path) {
            Ok(held) if held.trim() == self.token => {
                let _ = fs::remove_file(&self.path);
            }
            Ok(_) => logd!("ledger lock no longer ours; leaving it"),
            Err(_) => {}
        }
    }
}

static LOCK_SEQ: AtomicU64 = AtomicU64::new(0);

/// `pid:nanos:seq`, unique per lock attempt across processes and threads.
fn lock_token() -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_nanos());
    let seq = LOCK_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}:{nanos}:{seq}", std::process::id())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/* ---------------- In-process aggregation ---------------- */

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordStats {
    pub recorded: usize,
    pub duplicates: usize,
    /// Outcomes that never reached the file (contention or io).
    pub lost: usize,
}

/// Single writer thread for this process; evaluations send outcomes to it.
pub struct Recorder {
    tx: mpsc::Sender<(String, bool)>,
    handle: thread::JoinHandle<RecordStats>,
}

impl Recorder {
    pub fn spawn(store: LedgerStore) -> Self {
        let (tx, rx) = mpsc::channel::<(String, bool)>();
        let handle = thread::spawn(move || {
            let mut stats = RecordStats::default();
            for (name, passed) in rx {
                match store.record(&name, passed) {
                    Ok(true) => stats.recorded += 1,
                    Ok(false) => stats.duplicates += 1,
                    Err(e) => {
                        stats.lost += 1;
                        loge!("{name}: result not recorded: {e}");
                    }
                }
            }
            stats
        });
        Self { tx, handle }
    }

    pub fn send(&self, name: String, passed: bool) {
        if self.tx.send((name, passed)).is_err() {
            loge!("ledger recorder stopped; outcome dropped");
        }
    }

    /// Close the channel and wait for queued outcomes to be written.
    pub fn finish(self) -> RecordStats {
        drop(self.tx);
        self.handle.join().unwrap_or_else(|_| {
            loge!("ledger recorder panicked");
            RecordStats::default()
        })
    }
}
