//! # Workflow Orchestrator
//!
//! The mutating commands of a trade. Each command checks the caller's role
//! through the [`AccessGate`] and then drives the registry, the purchase
//! order book, and the three export [`DocumentMachine`]s.
//!
//! Commands that touch several documents honour the configured
//! [`FanOutPolicy`]. Under `Atomic` every write is staged and validated
//! before a single [`WriteBatch`] commit. Under `Sequential` each kind is
//! written on its own in bill of lading, invoice, packing list order, and a
//! failure partway leaves the earlier kinds written.

use tradeflow_core::{ContractId, DocumentKind, Role, TradeError};
use tradeflow_ledger::WriteBatch;
use tradeflow_state::{DocumentStatus, StatusError};

use crate::access::{AccessGate, CallerProof};
use crate::config::FanOutPolicy;
use crate::document::DocumentMachine;
use crate::purchase_order::PurchaseOrderBook;
use crate::registry::{ContractRegistry, NewContract};
use crate::SharedStore;

/// Payloads of one export-document submission. An empty payload skips
/// its kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPayloads {
    pub bill_of_lading: Vec<u8>,
    pub invoice: Vec<u8>,
    pub packing_list: Vec<u8>,
}

impl ExportPayloads {
    pub fn new(
        bill_of_lading: impl Into<Vec<u8>>,
        invoice: impl Into<Vec<u8>>,
        packing_list: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            bill_of_lading: bill_of_lading.into(),
            invoice: invoice.into(),
            packing_list: packing_list.into(),
        }
    }

    /// The payload for an export kind. The purchase order has none here.
    pub fn get(&self, kind: DocumentKind) -> &[u8] {
        match kind {
            DocumentKind::BillOfLading => &self.bill_of_lading,
            DocumentKind::Invoice => &self.invoice,
            DocumentKind::PackingList => &self.packing_list,
            DocumentKind::PurchaseOrder => &[],
        }
    }
}

/// Gated mutating commands over one ledger store.
#[derive(Clone)]
pub struct Orchestrator {
    store: SharedStore,
    registry: ContractRegistry,
    purchase_orders: PurchaseOrderBook,
    bill_of_lading: DocumentMachine,
    invoice: DocumentMachine,
    packing_list: DocumentMachine,
    gate: AccessGate,
    fan_out: FanOutPolicy,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("gate", &self.gate)
            .field("fan_out", &self.fan_out)
            .finish()
    }
}

impl Orchestrator {
    pub fn new(store: SharedStore, gate: AccessGate, fan_out: FanOutPolicy) -> Self {
        Self {
            registry: ContractRegistry::new(store.clone()),
            purchase_orders: PurchaseOrderBook::new(store.clone()),
            bill_of_lading: DocumentMachine::new(DocumentKind::BillOfLading, store.clone()),
            invoice: DocumentMachine::new(DocumentKind::Invoice, store.clone()),
            packing_list: DocumentMachine::new(DocumentKind::PackingList, store.clone()),
            store,
            gate,
            fan_out,
        }
    }

    pub fn fan_out(&self) -> FanOutPolicy {
        self.fan_out
    }

    /// The machine for an export kind.
    pub fn machine(&self, kind: DocumentKind) -> Option<&DocumentMachine> {
        match kind {
            DocumentKind::BillOfLading => Some(&self.bill_of_lading),
            DocumentKind::Invoice => Some(&self.invoice),
            DocumentKind::PackingList => Some(&self.packing_list),
            DocumentKind::PurchaseOrder => None,
        }
    }

    fn export_machines(&self) -> [&DocumentMachine; 3] {
        [&self.bill_of_lading, &self.invoice, &self.packing_list]
    }

    /// Register a contract and store its purchase order.
    ///
    /// Open to any caller.
    pub fn initiate_trade(
        &self,
        id: &ContractId,
        po_payload: &[u8],
        contract: &NewContract,
    ) -> Result<(), TradeError> {
        match self.fan_out {
            FanOutPolicy::Atomic => {
                let (_, mut batch) = self.registry.stage_create(id, contract)?;
                batch.extend(self.purchase_orders.stage_submit(id, po_payload)?);
                self.store.commit(batch)?;
            }
            FanOutPolicy::Sequential => {
                self.registry.create(id, contract)?;
                self.purchase_orders.submit(id, po_payload)?;
            }
        }
        tracing::info!(contract = %id, fan_out = %self.fan_out, "trade initiated");
        Ok(())
    }

    /// Replace the purchase order payload. Importer bank only.
    pub fn update_po(
        &self,
        id: &ContractId,
        po_payload: &[u8],
        caller: &CallerProof,
    ) -> Result<(), TradeError> {
        self.gate.require_role(id, Role::ImporterBank, caller)?;
        self.purchase_orders.update(id, po_payload)
    }

    /// Submit every non-empty export payload. Exporter bank only.
    pub fn submit_export_documents(
        &self,
        id: &ContractId,
        payloads: &ExportPayloads,
        caller: &CallerProof,
    ) -> Result<(), TradeError> {
        self.gate.require_role(id, Role::ExporterBank, caller)?;
        let targets: Vec<&DocumentMachine> = self
            .export_machines()
            .into_iter()
            .filter(|m| !payloads.get(m.kind()).is_empty())
            .collect();
        if targets.is_empty() {
            tracing::debug!(contract = %id, "no export documents to submit");
            return Ok(());
        }
        match self.fan_out {
            FanOutPolicy::Atomic => {
                let mut batch = WriteBatch::new();
                for machine in &targets {
                    batch.extend(machine.stage_submit(id, payloads.get(machine.kind()))?);
                }
                self.store.commit(batch)?;
                tracing::info!(
                    contract = %id,
                    documents = targets.len(),
                    "export documents submitted"
                );
            }
            FanOutPolicy::Sequential => {
                for (done, machine) in targets.iter().enumerate() {
                    if let Err(e) = machine.submit(id, payloads.get(machine.kind())) {
                        warn_divergence(id, machine.kind(), done, &e);
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }

    /// Advance all three export documents one step along the payment
    /// chain. Importer bank only. Returns the new status.
    ///
    /// The step is computed from the bill of lading's status.
    pub fn accept_export_documents(
        &self,
        id: &ContractId,
        caller: &CallerProof,
    ) -> Result<DocumentStatus, TradeError> {
        self.gate.require_role(id, Role::ImporterBank, caller)?;
        let current = self
            .bill_of_lading
            .get_status(id)?
            .ok_or_else(|| TradeError::NotFound {
                kind: DocumentKind::BillOfLading.to_string(),
                id: id.to_string(),
            })?;
        let next = current.next_on_accept().ok_or_else(|| {
            StatusError::TerminalState(current).for_document(DocumentKind::BillOfLading, id)
        })?;
        self.fan_out_transition(id, next)?;
        Ok(next)
    }

    /// Move all three export documents to `REJECTED_BY_IB`. Importer bank
    /// only.
    pub fn reject_export_documents(
        &self,
        id: &ContractId,
        caller: &CallerProof,
    ) -> Result<(), TradeError> {
        self.gate.require_role(id, Role::ImporterBank, caller)?;
        self.fan_out_transition(id, DocumentStatus::RejectedByIb)
    }

    fn fan_out_transition(&self, id: &ContractId, to: DocumentStatus) -> Result<(), TradeError> {
        match self.fan_out {
            FanOutPolicy::Atomic => {
                let mut batch = WriteBatch::new();
                for machine in self.export_machines() {
                    batch.extend(machine.stage_transition(id, to)?.into_batch());
                }
                self.store.commit(batch)?;
                tracing::info!(contract = %id, %to, "export documents moved");
            }
            FanOutPolicy::Sequential => {
                for (done, machine) in self.export_machines().into_iter().enumerate() {
                    if let Err(e) = machine.transition(id, to) {
                        warn_divergence(id, machine.kind(), done, &e);
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }
}

fn warn_divergence(id: &ContractId, kind: DocumentKind, applied: usize, err: &TradeError) {
    if applied > 0 {
        tracing::warn!(
            contract = %id,
            failed = %kind,
            applied,
            error = %err,
            "sequential fan-out stopped partway; earlier documents keep their new status"
        );
    }
}
