//! # Rows and Table Schemas
//!
//! A row is a key plus a positional list of typed columns. The table schema
//! fixes the number, order, and kind of those columns; stores reject rows
//! that do not match it.

use serde::{Deserialize, Serialize};
use tradeflow_core::StoreError;

/// A single typed cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Column {
    Str(String),
    Bytes(Vec<u8>),
}

impl Column {
    /// The column kind.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Str(_) => ColumnKind::Str,
            Self::Bytes(_) => ColumnKind::Bytes,
        }
    }

    /// The string value, if this is a string column.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Bytes(_) => None,
        }
    }

    /// The byte value, if this is a bytes column.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            Self::Str(_) => None,
        }
    }
}

/// Declared kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Str,
    Bytes,
}

/// Named column declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnDef {
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// Primary key of a row: type tag and unique id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey {
    pub tag: String,
    pub uid: String,
}

impl RowKey {
    pub fn new(tag: &str, uid: &str) -> Self {
        Self {
            tag: tag.to_string(),
            uid: uid.to_string(),
        }
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.tag, self.uid)
    }
}

/// A stored row. `columns` excludes the two key columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub key: RowKey,
    pub columns: Vec<Column>,
}

/// Layout of a table. The key columns (`Type`, `UID`) are implicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Check that `row` has exactly the declared columns, in order.
    pub fn check(&self, row: &Row) -> Result<(), StoreError> {
        if row.columns.len() != self.columns.len() {
            return Err(StoreError::SchemaMismatch {
                table: self.name.clone(),
                reason: format!(
                    "expected {} columns, got {}",
                    self.columns.len(),
                    row.columns.len()
                ),
            });
        }
        for (def, col) in self.columns.iter().zip(&row.columns) {
            if def.kind != col.kind() {
                return Err(StoreError::SchemaMismatch {
                    table: self.name.clone(),
                    reason: format!("column {} expects {:?}", def.name, def.kind),
                });
            }
        }
        Ok(())
    }
}
