//! # In-Memory Ledger
//!
//! Thread-safe, cloneable ledger store. Clones share the same tables.
//!
//! All operations are synchronous and take a `parking_lot::RwLock`, which
//! is non-poisoning. A batch commit holds the write lock for its whole
//! duration and rolls back its own partial effects on failure, so readers
//! never observe half a batch.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tradeflow_core::StoreError;

use crate::batch::{WriteBatch, WriteOp};
use crate::row::{Row, RowKey, TableSchema};
use crate::store::{LedgerStore, RowIter};

#[derive(Debug, Clone)]
struct Table {
    schema: TableSchema,
    rows: BTreeMap<RowKey, Row>,
}

/// Serializable image of every table, used by [`crate::FileLedger`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tables: Vec<TableSnapshot>,
}

/// One table inside a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub schema: TableSchema,
    pub rows: Vec<Row>,
}

/// Undo record for one applied batch operation.
enum Undo {
    Inserted { table: String, key: RowKey },
    Deleted { table: String, row: Row },
    Nothing,
}

/// In-memory [`LedgerStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    tables: Arc<RwLock<BTreeMap<String, Table>>>,
}

impl MemoryLedger {
    /// Create an empty ledger with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        Ok(Self {
            tables: Arc::new(RwLock::new(build_tables(snapshot)?)),
        })
    }

    /// Replace every table with the contents of `snapshot`.
    pub fn restore(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        let tables = build_tables(snapshot)?;
        *self.tables.write() = tables;
        Ok(())
    }

    /// Capture every table.
    pub fn snapshot(&self) -> Snapshot {
        let tables = self.tables.read();
        Snapshot {
            tables: tables
                .values()
                .map(|t| TableSnapshot {
                    schema: t.schema.clone(),
                    rows: t.rows.values().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Number of rows in `table`, or `None` if the table does not exist.
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.tables.read().get(table).map(|t| t.rows.len())
    }
}

fn build_tables(snapshot: Snapshot) -> Result<BTreeMap<String, Table>, StoreError> {
    let mut tables = BTreeMap::new();
    for table in snapshot.tables {
        let mut rows = BTreeMap::new();
        for row in table.rows {
            table.schema.check(&row)?;
            rows.insert(row.key.clone(), row);
        }
        tables.insert(
            table.schema.name.clone(),
            Table {
                schema: table.schema,
                rows,
            },
        );
    }
    Ok(tables)
}

fn table_mut<'a>(
    tables: &'a mut BTreeMap<String, Table>,
    name: &str,
) -> Result<&'a mut Table, StoreError> {
    tables
        .get_mut(name)
        .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
}

fn apply(tables: &mut BTreeMap<String, Table>, op: WriteOp) -> Result<Undo, StoreError> {
    match op {
        WriteOp::Insert { table, row } => {
            let t = table_mut(tables, &table)?;
            t.schema.check(&row)?;
            if t.rows.contains_key(&row.key) {
                return Err(StoreError::Conflict {
                    table,
                    key: row.key.to_string(),
                });
            }
            let key = row.key.clone();
            t.rows.insert(key.clone(), row);
            Ok(Undo::Inserted { table, key })
        }
        WriteOp::Delete { table, key } => {
            let t = table_mut(tables, &table)?;
            Ok(match t.rows.remove(&key) {
                Some(row) => Undo::Deleted { table, row },
                None => Undo::Nothing,
            })
        }
    }
}

fn rollback(tables: &mut BTreeMap<String, Table>, undo: Vec<Undo>) {
    for entry in undo.into_iter().rev() {
        match entry {
            Undo::Inserted { table, key } => {
                if let Some(t) = tables.get_mut(&table) {
                    t.rows.remove(&key);
                }
            }
            Undo::Deleted { table, row } => {
                if let Some(t) = tables.get_mut(&table) {
                    t.rows.insert(row.key.clone(), row);
                }
            }
            Undo::Nothing => {}
        }
    }
}

impl LedgerStore for MemoryLedger {
    fn create_table(&self, schema: &TableSchema) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        match tables.get(&schema.name) {
            Some(existing) if existing.schema == *schema => Ok(()),
            Some(_) => Err(StoreError::SchemaMismatch {
                table: schema.name.clone(),
                reason: "table exists with a different layout".to_string(),
            }),
            None => {
                tables.insert(
                    schema.name.clone(),
                    Table {
                        schema: schema.clone(),
                        rows: BTreeMap::new(),
                    },
                );
                Ok(())
            }
        }
    }

    fn insert_row(&self, table: &str, row: Row) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        let t = table_mut(&mut tables, table)?;
        t.schema.check(&row)?;
        if t.rows.contains_key(&row.key) {
            return Ok(false);
        }
        t.rows.insert(row.key.clone(), row);
        Ok(true)
    }

    fn get_row(&self, table: &str, key: &RowKey) -> Result<Option<Row>, StoreError> {
        let tables = self.tables.read();
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        Ok(t.rows.get(key).cloned())
    }

    fn delete_row(&self, table: &str, key: &RowKey) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        table_mut(&mut tables, table)?.rows.remove(key);
        Ok(())
    }

    fn scan(&self, table: &str, tag: &str) -> Result<RowIter, StoreError> {
        let tables = self.tables.read();
        let t = tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let rows: Vec<Row> = t
            .rows
            .values()
            .filter(|row| row.key.tag == tag)
            .cloned()
            .collect();
        Ok(Box::new(rows.into_iter()))
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let mut undo = Vec::with_capacity(batch.len());
        for op in batch.into_ops() {
            match apply(&mut tables, op) {
                Ok(entry) => undo.push(entry),
                Err(err) => {
                    rollback(&mut tables, undo);
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}
