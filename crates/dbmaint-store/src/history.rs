//! Append-only execution history in sled.

use dbmaint_core::{ExecutionStatus, ScriptRecord, StoreError};
use rkyv::{Archive, Deserialize, Serialize};
use std::path::Path;

/// On-disk form of a [`ScriptRecord`].
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
struct StoredRecord {
    identifier: String,
    checksum: String,
    name: String,
    status: String,
    executed_at: Option<u64>,
    duration_millis: u64,
}

impl StoredRecord {
    fn from_record(record: &ScriptRecord) -> Self {
        Self {
            identifier: record.identifier.clone(),
            checksum: record.checksum.clone(),
            name: record.name.clone(),
            status: record.status.as_str().to_string(),
            executed_at: record.executed_at,
            duration_millis: record.duration_millis,
        }
    }

    fn into_record(self) -> Result<ScriptRecord, StoreError> {
        let status = self
            .status
            .parse::<ExecutionStatus>()
            .map_err(StoreError::corrupted)?;
        Ok(ScriptRecord {
            identifier: self.identifier,
            checksum: self.checksum,
            name: self.name,
            status,
            executed_at: self.executed_at,
            duration_millis: self.duration_millis,
        })
    }

    fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| StoreError::persistence(format!("serialization error: {}", e)))
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let mut aligned: rkyv::util::AlignedVec<16> = rkyv::util::AlignedVec::new();
        aligned.extend_from_slice(bytes);
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned)
            .map_err(|e| StoreError::corrupted(format!("deserialization error: {}", e)))
    }
}

fn unavailable(e: sled::Error) -> StoreError {
    StoreError::unavailable(e.to_string())
}

fn persistence(e: sled::Error) -> StoreError {
    StoreError::persistence(e.to_string())
}

/// Execution history kept in a sled tree.
///
/// Records are never overwritten: each one is keyed by a fresh id from
/// [`sled::Db::generate_id`], so iteration yields them in recording order.
pub struct SledHistory {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledHistory {
    /// Tree name for execution history.
    pub const TREE_NAME: &'static str = "execution:history";

    /// Open or create the history at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref()).map_err(unavailable)?;
        Self::from_db(db)
    }

    /// Open a history that is deleted when dropped.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(unavailable)?;
        Self::from_db(db)
    }

    /// Open the history tree of an existing database.
    pub fn from_db(db: sled::Db) -> Result<Self, StoreError> {
        let tree = db.open_tree(Self::TREE_NAME).map_err(unavailable)?;
        Ok(Self { db, tree })
    }

    /// All records, oldest first.
    pub fn list(&self) -> Result<Vec<ScriptRecord>, StoreError> {
        let mut records = Vec::new();
        for result in self.tree.iter() {
            let (_, value) = result.map_err(unavailable)?;
            records.push(StoredRecord::from_bytes(&value)?.into_record()?);
        }
        Ok(records)
    }

    /// Append a record and flush it to disk.
    pub fn append(&self, record: &ScriptRecord) -> Result<(), StoreError> {
        let id = self.db.generate_id().map_err(persistence)?;
        let value = StoredRecord::from_record(record).to_bytes()?;
        self.tree
            .insert(id.to_be_bytes(), value)
            .map_err(persistence)?;
        self.tree.flush().map_err(persistence)?;
        Ok(())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}
