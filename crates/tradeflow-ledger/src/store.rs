//! # LedgerStore Trait
//!
//! The persistence collaborator. Implementations must give read-your-writes
//! within a command and apply each [`WriteBatch`] atomically; the workflow
//! relies on nothing else.

use tradeflow_core::StoreError;

use crate::batch::WriteBatch;
use crate::row::{Row, RowKey, TableSchema};

/// A finite scan over rows captured when the scan was opened.
pub type RowIter = Box<dyn Iterator<Item = Row> + Send>;

/// Table/row store used by every workflow component.
pub trait LedgerStore: Send + Sync {
    /// Create a table. Creating an existing table with the same schema is a
    /// no-op; a different schema is a `SchemaMismatch`.
    fn create_table(&self, schema: &TableSchema) -> Result<(), StoreError>;

    /// Insert a row. `Ok(false)` if a row with the same key already exists.
    fn insert_row(&self, table: &str, row: Row) -> Result<bool, StoreError>;

    /// Fetch a row by key.
    fn get_row(&self, table: &str, key: &RowKey) -> Result<Option<Row>, StoreError>;

    /// Delete a row by key. Absent keys are ignored.
    fn delete_row(&self, table: &str, key: &RowKey) -> Result<(), StoreError>;

    /// All rows of `table` whose key tag equals `tag`, in key order.
    ///
    /// Each call opens a fresh scan.
    fn scan(&self, table: &str, tag: &str) -> Result<RowIter, StoreError>;

    /// Apply every operation of `batch`, or none of them.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
