//! # tradeflow-ledger: Row Store
//!
//! The workflow persists everything as rows in named tables, each row keyed
//! by a (type tag, unique id) pair. This crate defines that storage model
//! and the [`LedgerStore`] seam the workflow talks to.
//!
//! ## Modules
//!
//! - **row**: columns, row keys, rows, and table schemas.
//! - **batch**: [`WriteBatch`], an ordered list of deletes and inserts that
//!   a store applies all-or-nothing.
//! - **store**: the [`LedgerStore`] trait.
//! - **memory**: [`MemoryLedger`], a `parking_lot::RwLock`-guarded
//!   implementation. Every commit runs under one write lock.
//! - **file**: [`FileLedger`], a `MemoryLedger` persisted to a JSON snapshot
//!   after each mutation.
//! - **tables**: the contract, document, and consumed-binding table
//!   layouts with typed row codecs.

pub mod batch;
pub mod file;
pub mod memory;
pub mod row;
pub mod store;
pub mod tables;

pub use batch::{WriteBatch, WriteOp};
pub use file::FileLedger;
pub use memory::{MemoryLedger, Snapshot, TableSnapshot};
pub use row::{Column, ColumnDef, ColumnKind, Row, RowKey, TableSchema};
pub use store::{LedgerStore, RowIter};
pub use tables::{
    binding_table, contract_table, document_table, ContractRow, DocumentRow, BINDING_TABLE,
    BINDING_TAG, CONTRACT_TABLE, CONTRACT_TAG, DOCUMENT_TAG,
};
