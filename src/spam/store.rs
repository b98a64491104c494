use dashmap::DashMap;
use thiserror::Error;

use super::record::SubmissionRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),
    #[error("record decode error: {0}")]
    Decode(#[from] bincode::Error),
}

/// Minimal key-value contract the spam guard needs from persistence.
///
/// Backends only promise get/put/delete by string key plus a bulk purge for
/// the cleanup sweep; swapping the in-memory map for anything else is the
/// caller's concern.
pub trait RecordStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<SubmissionRecord>, StoreError>;
    fn put(&self, key: &str, record: &SubmissionRecord) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
    /// Delete every record whose `last_submission_ms` is older than
    /// `cutoff_ms`, skipping records with an unexpired block (the evaluator
    /// checks the block before staleness, so the sweep must too).
    fn purge_stale(&self, cutoff_ms: i64, now_ms: i64) -> Result<usize, StoreError>;
    /// Live record count, for the metrics gauge.
    fn len(&self) -> usize;
}

/// In-memory backend shared across request handlers within one process.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, SubmissionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<SubmissionRecord>, StoreError> {
        Ok(self.records.get(key).map(|r| r.clone()))
    }

    fn put(&self, key: &str, record: &SubmissionRecord) -> Result<(), StoreError> {
        self.records.insert(key.to_string(), record.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.records.remove(key);
        Ok(())
    }

    fn purge_stale(&self, cutoff_ms: i64, now_ms: i64) -> Result<usize, StoreError> {
        let mut to_remove: Vec<String> = Vec::new();
        for entry in self.records.iter() {
            let rec = entry.value();
            if rec.last_submission_ms < cutoff_ms && !rec.is_blocked(now_ms) {
                to_remove.push(entry.key().clone());
            }
        }
        let removed = to_remove.len();
        for k in to_remove {
            self.records.remove(&k);
        }
        Ok(removed)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Persistent backend over a sled tree with bincode values.
pub struct SledStore {
    tree: sled::Tree,
}

impl SledStore {
    pub fn open(db: &sled::Db) -> Result<Self, StoreError> {
        let tree = db.open_tree("spam_records")?;
        Ok(Self { tree })
    }
}

impl RecordStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<SubmissionRecord>, StoreError> {
        match self.tree.get(key.as_bytes())? {
            Some(raw) => Ok(Some(bincode::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, record: &SubmissionRecord) -> Result<(), StoreError> {
        let value = bincode::serialize(record)?;
        self.tree.insert(key.as_bytes(), value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.tree.remove(key.as_bytes())?;
        Ok(())
    }

    fn purge_stale(&self, cutoff_ms: i64, now_ms: i64) -> Result<usize, StoreError> {
        let mut removed = 0usize;
        for item in self.tree.iter() {
            let (key, raw) = item?;
            // A value that no longer decodes is junk; purge it too.
            match bincode::deserialize::<SubmissionRecord>(&raw) {
                Ok(rec) => {
                    if rec.last_submission_ms < cutoff_ms && !rec.is_blocked(now_ms) {
                        self.tree.remove(key)?;
                        removed += 1;
                    }
                }
                Err(_) => {
                    self.tree.remove(key)?;
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    fn len(&self) -> usize {
        self.tree.len()
    }
}
