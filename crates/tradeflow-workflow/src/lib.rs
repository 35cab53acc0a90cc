//! # tradeflow-workflow: Trade Document Workflow
//!
//! Coordinates a purchase order and three export documents (bill of
//! lading, invoice, packing list) through a shared status lifecycle on
//! behalf of four parties: importer, exporter, and their two banks.
//!
//! ## Components (leaves first)
//!
//! - [`DocumentMachine`]: submit, transition, and read one document kind.
//!   Instantiated once per export kind.
//! - [`PurchaseOrderBook`]: the purchase order table.
//! - [`ContractRegistry`]: one row per trade: party names, certificates,
//!   creation status.
//! - [`AccessGate`]: checks that a caller holds the certificate of a role
//!   (or of any participant) on a contract, and that a signed payload names
//!   the call being run.
//! - [`BindingLog`]: refuses a second signed invoke with the same binding.
//! - [`Orchestrator`]: gated mutating commands, fanning out to every export
//!   kind under the configured [`FanOutPolicy`].
//! - [`AuditQueries`]: read-only listings joining contracts with live
//!   bill-of-lading status.
//! - [`TradeWorkflow`]: the named command/query surface (`initTrade`,
//!   `acceptED`, `listContracts`, ...) with arity checks and JSON replies.
//!
//! ## Execution Model
//!
//! Every command runs to completion on the calling thread. All writes go
//! through the injected [`LedgerStore`](tradeflow_ledger::LedgerStore);
//! components hold no state of their own beyond configuration.

pub mod access;
pub mod audit;
pub mod binding;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod metrics;
pub mod orchestrator;
pub mod purchase_order;
pub mod registry;

use std::sync::Arc;

use tradeflow_core::{DocumentKind, TradeError};
use tradeflow_ledger::{binding_table, contract_table, document_table, LedgerStore};

pub use access::{call_payload, AccessGate, AccessPolicy, CallerProof};
pub use audit::{AuditQueries, ContractListing, ContractSummary};
pub use binding::BindingLog;
pub use config::{ConfigError, FanOutPolicy, WorkflowConfig};
pub use dispatch::{Invocation, Query, TradeWorkflow};
pub use document::{DocumentMachine, StagedTransition};
pub use metrics::{MetricsSnapshot, WorkflowMetrics};
pub use orchestrator::{ExportPayloads, Orchestrator};
pub use purchase_order::PurchaseOrderBook;
pub use registry::{ContractRegistry, NewContract, Participant, Party};

/// Ledger store shared by every component of one workflow.
pub type SharedStore = Arc<dyn LedgerStore>;

/// Create every table the workflow writes: contracts, bindings, and one
/// table per document kind.
///
/// Safe to call on every start; existing tables are left as they are.
pub fn ensure_tables(store: &dyn LedgerStore) -> Result<(), TradeError> {
    store.create_table(&contract_table())?;
    store.create_table(&binding_table())?;
    for kind in DocumentKind::ALL {
        store.create_table(&document_table(kind))?;
    }
    Ok(())
}
