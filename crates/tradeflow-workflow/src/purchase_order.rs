//! # Purchase Order Book
//!
//! The purchase order shares the document row layout but not the export
//! lifecycle: it is submitted once at trade initiation with status
//! `SUBMITTED_BY_IB`, after which only its payload is replaced.

use tradeflow_core::{ContractId, DocumentKind, TradeError};
use tradeflow_crypto::fingerprint;
use tradeflow_ledger::{DocumentRow, WriteBatch};
use tradeflow_state::PURCHASE_ORDER_INITIAL_STATUS;

use crate::SharedStore;

const KIND: DocumentKind = DocumentKind::PurchaseOrder;

/// Purchase order table access.
#[derive(Clone)]
pub struct PurchaseOrderBook {
    store: SharedStore,
}

impl std::fmt::Debug for PurchaseOrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PurchaseOrderBook")
    }
}

fn require_payload(payload: &[u8]) -> Result<(), TradeError> {
    if payload.is_empty() {
        return Err(TradeError::InvalidArgument(
            "purchase order payload must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl PurchaseOrderBook {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn load(&self, id: &ContractId) -> Result<Option<DocumentRow>, TradeError> {
        let row = self.store.get_row(KIND.table_name(), &DocumentRow::key(id))?;
        Ok(row.map(|r| DocumentRow::from_row(KIND, &r)).transpose()?)
    }

    fn new_row(id: &ContractId, payload: &[u8]) -> DocumentRow {
        DocumentRow {
            kind: KIND,
            id: id.clone(),
            payload: payload.to_vec(),
            status: PURCHASE_ORDER_INITIAL_STATUS.to_string(),
        }
    }

    /// Validate a submission and return the insert that performs it.
    pub fn stage_submit(
        &self,
        id: &ContractId,
        payload: &[u8],
    ) -> Result<WriteBatch, TradeError> {
        require_payload(payload)?;
        if self.load(id)?.is_some() {
            return Err(TradeError::AlreadyExists {
                kind: KIND.to_string(),
                id: id.to_string(),
            });
        }
        let mut batch = WriteBatch::new();
        batch.insert(KIND.table_name(), Self::new_row(id, payload).to_row());
        Ok(batch)
    }

    /// Store the purchase order for a new trade.
    pub fn submit(&self, id: &ContractId, payload: &[u8]) -> Result<(), TradeError> {
        self.store.commit(self.stage_submit(id, payload)?)?;
        tracing::info!(contract = %id, payload = %fingerprint(payload), "purchase order submitted");
        Ok(())
    }

    /// Replace the purchase order payload, keeping its status.
    pub fn update(&self, id: &ContractId, payload: &[u8]) -> Result<(), TradeError> {
        require_payload(payload)?;
        let mut doc = self.load(id)?.ok_or_else(|| TradeError::NotFound {
            kind: KIND.to_string(),
            id: id.to_string(),
        })?;
        doc.payload = payload.to_vec();
        let mut batch = WriteBatch::new();
        batch.replace(KIND.table_name(), doc.to_row());
        self.store.commit(batch)?;
        tracing::info!(contract = %id, payload = %fingerprint(payload), "purchase order updated");
        Ok(())
    }

    /// The purchase order payload, or `None` if absent.
    pub fn get_payload(&self, id: &ContractId) -> Result<Option<Vec<u8>>, TradeError> {
        Ok(self.load(id)?.map(|doc| doc.payload))
    }

    /// The purchase order status, or `None` if absent.
    pub fn get_status(&self, id: &ContractId) -> Result<Option<String>, TradeError> {
        Ok(self.load(id)?.map(|doc| doc.status))
    }
}
