//! # File-Backed Ledger
//!
//! A [`MemoryLedger`] that rewrites a JSON snapshot after every successful
//! mutation. Used by the CLI so that state survives between invocations.
//!
//! The snapshot is written to a sibling temporary file and renamed over the
//! target, so a crash mid-write leaves the previous snapshot intact. If the
//! snapshot cannot be written, the in-memory tables are rolled back to their
//! state before the mutation, so memory and disk never disagree.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tradeflow_core::StoreError;

use crate::batch::WriteBatch;
use crate::memory::{MemoryLedger, Snapshot};
use crate::row::{Row, RowKey, TableSchema};
use crate::store::{LedgerStore, RowIter};

/// JSON-snapshot [`LedgerStore`].
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    inner: MemoryLedger,
    // Serializes mutate-then-persist so snapshots land in commit order.
    write_guard: Mutex<()>,
}

impl FileLedger {
    /// Open the ledger at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = if path.exists() {
            let raw = std::fs::read(&path)?;
            let snapshot: Snapshot = serde_json::from_slice(&raw)?;
            MemoryLedger::from_snapshot(snapshot)?
        } else {
            MemoryLedger::new()
        };
        tracing::debug!(path = %path.display(), "opened file ledger");
        Ok(Self {
            path,
            inner,
            write_guard: Mutex::new(()),
        })
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` against the in-memory tables and persist if it reports a
    /// change. A failed persist restores the tables to their prior state.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&MemoryLedger) -> Result<(T, bool), StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.write_guard.lock();
        let before = self.inner.snapshot();
        let (out, changed) = op(&self.inner)?;
        if changed {
            if let Err(err) = self.persist() {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "snapshot write failed; rolling back in-memory ledger"
                );
                self.inner.restore(before)?;
                return Err(err);
            }
        }
        Ok(out)
    }

    fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&self.inner.snapshot())?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::trace!(path = %self.path.display(), "persisted ledger snapshot");
        Ok(())
    }
}

impl LedgerStore for FileLedger {
    fn create_table(&self, schema: &TableSchema) -> Result<(), StoreError> {
        self.mutate(|inner| inner.create_table(schema).map(|()| ((), true)))
    }

    fn insert_row(&self, table: &str, row: Row) -> Result<bool, StoreError> {
        self.mutate(|inner| {
            let inserted = inner.insert_row(table, row)?;
            Ok((inserted, inserted))
        })
    }

    fn get_row(&self, table: &str, key: &RowKey) -> Result<Option<Row>, StoreError> {
        self.inner.get_row(table, key)
    }

    fn delete_row(&self, table: &str, key: &RowKey) -> Result<(), StoreError> {
        self.mutate(|inner| inner.delete_row(table, key).map(|()| ((), true)))
    }

    fn scan(&self, table: &str, tag: &str) -> Result<RowIter, StoreError> {
        self.inner.scan(table, tag)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.mutate(|inner| inner.commit(batch).map(|()| ((), true)))
    }
}
