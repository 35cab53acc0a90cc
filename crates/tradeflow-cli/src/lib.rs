//! # tradeflow-cli: Trade Workflow Command Line
//!
//! Drives a [`TradeWorkflow`] backed by a JSON-file ledger, so a sequence
//! of shell commands can play the four parties of a trade:
//!
//! ```bash
//! tradeflow keygen --output keys --prefix ib
//! tradeflow invoke initTrade 1000 @po.json Imp Exp IB EB \
//!     @keys/imp.pub @keys/exp.pub @keys/ib.pub @keys/eb.pub
//! tradeflow invoke submitED 1000 @bl.pdf @inv.pdf @pl.pdf --key keys/eb.key
//! tradeflow invoke acceptED 1000 --key keys/ib.key
//! tradeflow query getEDStatus 1000 --key keys/ib.key
//! ```
//!
//! An argument of the form `@path` is replaced by the file's bytes.

pub mod call;
pub mod keys;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tradeflow_crypto::Ed25519Verifier;
use tradeflow_ledger::FileLedger;
use tradeflow_workflow::{TradeWorkflow, WorkflowConfig};

/// Default snapshot path when `--ledger` is not given.
pub const DEFAULT_LEDGER: &str = "tradeflow-ledger.json";

/// Open the ledger at `path` and build an initialised workflow over it.
pub fn open_workflow(path: &Path, config: WorkflowConfig) -> Result<TradeWorkflow> {
    let ledger = FileLedger::open(path)
        .with_context(|| format!("failed to open ledger: {}", path.display()))?;
    let workflow = TradeWorkflow::new(Arc::new(ledger), Arc::new(Ed25519Verifier), config);
    workflow
        .init()
        .with_context(|| format!("failed to initialise ledger: {}", path.display()))?;
    Ok(workflow)
}
