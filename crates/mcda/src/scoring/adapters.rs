use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use super::repository::{record_id, NewRecord, ResultStore, StoreError, StoredRecord};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
}

/// Process-local store, used by default and as the test fake.
#[derive(Debug, Default, Clone)]
pub struct InMemoryResultStore {
    records: Arc<Mutex<Vec<StoredRecord>>>,
}

impl InMemoryResultStore {
    /// Number of stored records. A poisoned lock reads as empty; `add` and `stream` report it
    /// as `StoreError::Unavailable` instead.
    pub fn len(&self) -> usize {
        self.records.lock().map_or(0, |guard| guard.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for InMemoryResultStore {
    fn add(&self, record: NewRecord) -> Result<StoredRecord, StoreError> {
        let mut guard = lock(&self.records)?;
        let stored = StoredRecord::from_new(record_id(guard.len() as u64 + 1), record);
        guard.push(stored.clone());
        Ok(stored)
    }

    fn stream(&self) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(lock(&self.records)?.clone())
    }
}

/// Append-only file holding one JSON document per line.
#[derive(Debug)]
pub struct JsonLinesResultStore {
    path: PathBuf,
    next_sequence: Mutex<u64>,
}

impl JsonLinesResultStore {
    /// Opens (creating if needed) the results file and resumes id numbering after its last line.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&path)?;

        let existing = BufReader::new(File::open(&path)?)
            .lines()
            .filter(|line| line.as_ref().map_or(true, |line| !line.trim().is_empty()))
            .count() as u64;

        Ok(Self {
            path,
            next_sequence: Mutex::new(existing + 1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for JsonLinesResultStore {
    fn add(&self, record: NewRecord) -> Result<StoredRecord, StoreError> {
        let mut sequence = lock(&self.next_sequence)?;
        let stored = StoredRecord::from_new(record_id(*sequence), record);
        let mut line = serde_json::to_string(&stored)?;
        line.push('\n');

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        *sequence += 1;
        Ok(stored)
    }

    fn stream(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let _guard = lock(&self.next_sequence)?;
        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StoredRecord>(&line) {
                Ok(record) => records.push(record),
                Err(err) => warn!(
                    path = %self.path.display(),
                    line = number + 1,
                    error = %err,
                    "skipping unreadable result record"
                ),
            }
        }
        Ok(records)
    }
}
