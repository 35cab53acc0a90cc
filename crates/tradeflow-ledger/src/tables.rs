//! # Table Layouts
//!
//! Two layouts cover every table the workflow writes:
//!
//! | Table          | Tag   | Columns after `Type`, `UID`                                  |
//! |----------------|-------|--------------------------------------------------------------|
//! | `BPTable`      | `BP`  | Status, four party names, four certificates, CreatedAt       |
//! | `POTable` etc. | `DOC` | Payload, Status                                              |
//! | `bindingTable` | `TX`  | Function, RecordedAt                                         |
//!
//! [`ContractRow`] and [`DocumentRow`] are the only code that knows column
//! positions. Everything above this module works with the typed structs.

use tradeflow_core::{ContractId, DocumentKind, Role, StoreError, Timestamp};

use crate::row::{Column, ColumnDef, ColumnKind, Row, RowKey, TableSchema};

/// Contract table name.
pub const CONTRACT_TABLE: &str = "BPTable";
/// Key tag of contract rows.
pub const CONTRACT_TAG: &str = "BP";
/// Key tag of document rows, shared by all document tables.
pub const DOCUMENT_TAG: &str = "DOC";
/// Table of consumed call bindings.
pub const BINDING_TABLE: &str = "bindingTable";
/// Key tag of binding rows.
pub const BINDING_TAG: &str = "TX";

const NAME_COLUMNS: [&str; 4] = [
    "ImporterName",
    "ExporterName",
    "ImporterBankName",
    "ExporterBankName",
];
const CERT_COLUMNS: [&str; 4] = [
    "ImporterCert",
    "ExporterCert",
    "ImporterBankCert",
    "ExporterBankCert",
];

/// Schema of the contract table.
pub fn contract_table() -> TableSchema {
    let mut columns = vec![ColumnDef::new("Status", ColumnKind::Str)];
    columns.extend(NAME_COLUMNS.iter().map(|n| ColumnDef::new(n, ColumnKind::Str)));
    columns.extend(CERT_COLUMNS.iter().map(|n| ColumnDef::new(n, ColumnKind::Bytes)));
    columns.push(ColumnDef::new("CreatedAt", ColumnKind::Str));
    TableSchema {
        name: CONTRACT_TABLE.to_string(),
        columns,
    }
}

/// Schema of the table holding documents of `kind`.
pub fn document_table(kind: DocumentKind) -> TableSchema {
    TableSchema {
        name: kind.table_name().to_string(),
        columns: vec![
            ColumnDef::new("Payload", ColumnKind::Bytes),
            ColumnDef::new("Status", ColumnKind::Str),
        ],
    }
}

/// Schema of the consumed-binding table: one row per signed command,
/// keyed by the binding digest.
pub fn binding_table() -> TableSchema {
    TableSchema {
        name: BINDING_TABLE.to_string(),
        columns: vec![
            ColumnDef::new("Function", ColumnKind::Str),
            ColumnDef::new("RecordedAt", ColumnKind::Str),
        ],
    }
}

fn role_index(role: Role) -> usize {
    match role {
        Role::Importer => 0,
        Role::Exporter => 1,
        Role::ImporterBank => 2,
        Role::ExporterBank => 3,
    }
}

fn mismatch(table: &str, reason: impl Into<String>) -> StoreError {
    StoreError::SchemaMismatch {
        table: table.to_string(),
        reason: reason.into(),
    }
}

fn str_at<'a>(row: &'a Row, idx: usize, table: &str) -> Result<&'a str, StoreError> {
    row.columns
        .get(idx)
        .and_then(Column::as_str)
        .ok_or_else(|| mismatch(table, format!("column {idx} is not a string")))
}

fn bytes_at<'a>(row: &'a Row, idx: usize, table: &str) -> Result<&'a [u8], StoreError> {
    row.columns
        .get(idx)
        .and_then(Column::as_bytes)
        .ok_or_else(|| mismatch(table, format!("column {idx} is not bytes")))
}

fn contract_id_of(row: &Row, table: &str) -> Result<ContractId, StoreError> {
    ContractId::new(row.key.uid.clone()).map_err(|e| mismatch(table, e.to_string()))
}

// ─── Contract Row ────────────────────────────────────────────────────

/// Typed view of a contract row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRow {
    pub id: ContractId,
    pub status: String,
    /// Party names indexed in [`Role::ALL`] order.
    pub names: [String; 4],
    /// Party certificates indexed in [`Role::ALL`] order.
    pub certificates: [Vec<u8>; 4],
    pub created_at: Timestamp,
}

impl ContractRow {
    /// Row key of the contract `id`.
    pub fn key(id: &ContractId) -> RowKey {
        RowKey::new(CONTRACT_TAG, id.as_str())
    }

    /// Name registered for `role`.
    pub fn name(&self, role: Role) -> &str {
        &self.names[role_index(role)]
    }

    /// Certificate registered for `role`.
    pub fn certificate(&self, role: Role) -> &[u8] {
        &self.certificates[role_index(role)]
    }

    /// Encode as a ledger row.
    pub fn to_row(&self) -> Row {
        let mut columns = vec![Column::Str(self.status.clone())];
        columns.extend(self.names.iter().cloned().map(Column::Str));
        columns.extend(self.certificates.iter().cloned().map(Column::Bytes));
        columns.push(Column::Str(self.created_at.to_iso8601()));
        Row {
            key: Self::key(&self.id),
            columns,
        }
    }

    /// Decode a ledger row.
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        if row.key.tag != CONTRACT_TAG {
            return Err(mismatch(CONTRACT_TABLE, format!("unexpected tag {}", row.key.tag)));
        }
        let name = |i: usize| str_at(row, 1 + i, CONTRACT_TABLE).map(str::to_string);
        let cert = |i: usize| bytes_at(row, 5 + i, CONTRACT_TABLE).map(<[u8]>::to_vec);
        let created_at = Timestamp::parse(str_at(row, 9, CONTRACT_TABLE)?)
            .map_err(|e| mismatch(CONTRACT_TABLE, e.to_string()))?;
        Ok(Self {
            id: contract_id_of(row, CONTRACT_TABLE)?,
            status: str_at(row, 0, CONTRACT_TABLE)?.to_string(),
            names: [name(0)?, name(1)?, name(2)?, name(3)?],
            certificates: [cert(0)?, cert(1)?, cert(2)?, cert(3)?],
            created_at,
        })
    }
}

// ─── Document Row ────────────────────────────────────────────────────

/// Typed view of a document row of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub kind: DocumentKind,
    pub id: ContractId,
    pub payload: Vec<u8>,
    pub status: String,
}

impl DocumentRow {
    /// Row key of the document for contract `id`.
    pub fn key(id: &ContractId) -> RowKey {
        RowKey::new(DOCUMENT_TAG, id.as_str())
    }

    /// Encode as a ledger row.
    pub fn to_row(&self) -> Row {
        Row {
            key: Self::key(&self.id),
            columns: vec![
                Column::Bytes(self.payload.clone()),
                Column::Str(self.status.clone()),
            ],
        }
    }

    /// Decode a ledger row read from the table of `kind`.
    pub fn from_row(kind: DocumentKind, row: &Row) -> Result<Self, StoreError> {
        let table = kind.table_name();
        if row.key.tag != DOCUMENT_TAG {
            return Err(mismatch(table, format!("unexpected tag {}", row.key.tag)));
        }
        Ok(Self {
            kind,
            id: contract_id_of(row, table)?,
            payload: bytes_at(row, 0, table)?.to_vec(),
            status: str_at(row, 1, table)?.to_string(),
        })
    }
}
