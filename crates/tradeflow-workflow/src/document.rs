//! # Document State Machine
//!
//! One generic machine, instantiated per export document kind. Each
//! instance owns the rows of its kind's table.
//!
//! Transitions are split in two steps so the orchestrator can fan out
//! atomically: [`DocumentMachine::stage_transition`] validates against the
//! current row without writing, and [`StagedTransition::into_batch`] yields
//! the delete-then-reinsert that applies it. [`DocumentMachine::transition`]
//! does both for a single document.

use tradeflow_core::{ContractId, DocumentKind, TradeError};
use tradeflow_crypto::fingerprint;
use tradeflow_ledger::{DocumentRow, WriteBatch};
use tradeflow_state::{validate_transition, DocumentStatus};

use crate::SharedStore;

/// A validated, not yet committed status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedTransition {
    pub kind: DocumentKind,
    pub id: ContractId,
    pub from: DocumentStatus,
    pub to: DocumentStatus,
    row: DocumentRow,
}

impl StagedTransition {
    /// The delete-then-reinsert that applies this transition.
    pub fn into_batch(self) -> WriteBatch {
        let mut batch = WriteBatch::new();
        batch.replace(self.kind.table_name(), self.row.to_row());
        batch
    }
}

/// Submit/transition/read operations for one export document kind.
#[derive(Clone)]
pub struct DocumentMachine {
    kind: DocumentKind,
    store: SharedStore,
}

impl std::fmt::Debug for DocumentMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentMachine")
            .field("kind", &self.kind)
            .finish()
    }
}

impl DocumentMachine {
    pub fn new(kind: DocumentKind, store: SharedStore) -> Self {
        Self { kind, store }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    fn load(&self, id: &ContractId) -> Result<Option<DocumentRow>, TradeError> {
        let row = self
            .store
            .get_row(self.kind.table_name(), &DocumentRow::key(id))?;
        Ok(row
            .map(|r| DocumentRow::from_row(self.kind, &r))
            .transpose()?)
    }

    fn not_found(&self, id: &ContractId) -> TradeError {
        TradeError::NotFound {
            kind: self.kind.to_string(),
            id: id.to_string(),
        }
    }

    fn stored_status(&self, doc: &DocumentRow) -> Result<DocumentStatus, TradeError> {
        doc.status.parse::<DocumentStatus>().map_err(|e| {
            TradeError::UpstreamFailure(format!(
                "stored status of {} {} is unreadable: {e}",
                self.kind, doc.id
            ))
        })
    }

    /// Validate a submission and return the insert that performs it.
    pub fn stage_submit(
        &self,
        id: &ContractId,
        payload: &[u8],
    ) -> Result<WriteBatch, TradeError> {
        if payload.is_empty() {
            return Err(TradeError::InvalidArgument(format!(
                "{} payload must not be empty",
                self.kind
            )));
        }
        if self.load(id)?.is_some() {
            return Err(TradeError::AlreadyExists {
                kind: self.kind.to_string(),
                id: id.to_string(),
            });
        }
        let row = DocumentRow {
            kind: self.kind,
            id: id.clone(),
            payload: payload.to_vec(),
            status: DocumentStatus::INITIAL.to_string(),
        };
        let mut batch = WriteBatch::new();
        batch.insert(self.kind.table_name(), row.to_row());
        Ok(batch)
    }

    /// Store a new document with status `SUBMITTED_BY_EB`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `payload` is empty.
    /// - `AlreadyExists` if a document is already stored for `id`; the
    ///   first payload is kept.
    pub fn submit(&self, id: &ContractId, payload: &[u8]) -> Result<(), TradeError> {
        self.store.commit(self.stage_submit(id, payload)?)?;
        tracing::info!(
            kind = %self.kind,
            contract = %id,
            payload = %fingerprint(payload),
            "document submitted"
        );
        Ok(())
    }

    /// Validate `current -> to` without writing.
    pub fn stage_transition(
        &self,
        id: &ContractId,
        to: DocumentStatus,
    ) -> Result<StagedTransition, TradeError> {
        let mut row = self.load(id)?.ok_or_else(|| self.not_found(id))?;
        let from = self.stored_status(&row)?;
        validate_transition(from, to).map_err(|e| e.for_document(self.kind, id))?;
        row.status = to.to_string();
        Ok(StagedTransition {
            kind: self.kind,
            id: id.clone(),
            from,
            to,
            row,
        })
    }

    /// Move the document to `to`, leaving its payload untouched.
    ///
    /// On any error the stored row is unchanged. Returns the previous status.
    pub fn transition(
        &self,
        id: &ContractId,
        to: DocumentStatus,
    ) -> Result<DocumentStatus, TradeError> {
        let staged = self.stage_transition(id, to)?;
        let from = staged.from;
        self.store.commit(staged.into_batch())?;
        tracing::info!(kind = %self.kind, contract = %id, %from, %to, "document status changed");
        Ok(from)
    }

    /// The stored payload, or `None` if nothing was submitted.
    pub fn get_payload(&self, id: &ContractId) -> Result<Option<Vec<u8>>, TradeError> {
        Ok(self.load(id)?.map(|doc| doc.payload))
    }

    /// The current status, or `None` if nothing was submitted.
    pub fn get_status(&self, id: &ContractId) -> Result<Option<DocumentStatus>, TradeError> {
        self.load(id)?
            .map(|doc| self.stored_status(&doc))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tradeflow_ledger::MemoryLedger;

    fn machine(kind: DocumentKind) -> DocumentMachine {
        let store: SharedStore = Arc::new(MemoryLedger::new());
        crate::ensure_tables(store.as_ref()).unwrap();
        DocumentMachine::new(kind, store)
    }

    fn cid(s: &str) -> ContractId {
        ContractId::new(s).unwrap()
    }

    #[test]
    fn submit_then_status_is_submitted_by_eb() {
        let bl = machine(DocumentKind::BillOfLading);
        bl.submit(&cid("1000"), b"BL PDF").unwrap();
        assert_eq!(
            bl.get_status(&cid("1000")).unwrap(),
            Some(DocumentStatus::SubmittedByEb)
        );
        assert_eq!(bl.get_payload(&cid("1000")).unwrap().unwrap(), b"BL PDF");
    }

    #[test]
    fn second_submit_keeps_first_payload() {
        let inv = machine(DocumentKind::Invoice);
        inv.submit(&cid("1000"), b"first").unwrap();
        let err = inv.submit(&cid("1000"), b"second").unwrap_err();
        assert!(matches!(err, TradeError::AlreadyExists { .. }));
        assert_eq!(inv.get_payload(&cid("1000")).unwrap().unwrap(), b"first");
    }

    #[test]
    fn empty_payload_rejected() {
        let pl = machine(DocumentKind::PackingList);
        assert!(matches!(
            pl.submit(&cid("1000"), b""),
            Err(TradeError::InvalidArgument(_))
        ));
        assert!(pl.get_status(&cid("1000")).unwrap().is_none());
    }

    #[test]
    fn absent_document_reads_empty() {
        let bl = machine(DocumentKind::BillOfLading);
        assert!(bl.get_payload(&cid("nope")).unwrap().is_none());
        assert!(bl.get_status(&cid("nope")).unwrap().is_none());
    }

    #[test]
    fn transition_of_absent_document_is_not_found() {
        let bl = machine(DocumentKind::BillOfLading);
        let err = bl
            .transition(&cid("nope"), DocumentStatus::AcceptedByIb)
            .unwrap_err();
        assert!(matches!(err, TradeError::NotFound { .. }));
    }

    #[test]
    fn legal_transition_keeps_payload() {
        let bl = machine(DocumentKind::BillOfLading);
        bl.submit(&cid("1000"), b"BL PDF").unwrap();
        let from = bl
            .transition(&cid("1000"), DocumentStatus::AcceptedByIb)
            .unwrap();
        assert_eq!(from, DocumentStatus::SubmittedByEb);
        assert_eq!(
            bl.get_status(&cid("1000")).unwrap(),
            Some(DocumentStatus::AcceptedByIb)
        );
        assert_eq!(bl.get_payload(&cid("1000")).unwrap().unwrap(), b"BL PDF");
    }

    #[test]
    fn illegal_transition_leaves_row_unchanged() {
        let bl = machine(DocumentKind::BillOfLading);
        bl.submit(&cid("1000"), b"BL PDF").unwrap();
        let err = bl
            .transition(&cid("1000"), DocumentStatus::PaymentCompleted)
            .unwrap_err();
        assert_eq!(
            err,
            TradeError::IllegalTransition {
                kind: "BL".into(),
                id: "1000".into(),
                from: "SUBMITTED_BY_EB".into(),
                to: "PAYMENT_COMPLETED".into(),
            }
        );
        assert_eq!(
            bl.get_status(&cid("1000")).unwrap(),
            Some(DocumentStatus::SubmittedByEb)
        );
    }

    #[test]
    fn staging_does_not_write() {
        let bl = machine(DocumentKind::BillOfLading);
        bl.submit(&cid("1000"), b"BL PDF").unwrap();
        let staged = bl
            .stage_transition(&cid("1000"), DocumentStatus::RejectedByIb)
            .unwrap();
        assert_eq!(staged.to, DocumentStatus::RejectedByIb);
        assert_eq!(
            bl.get_status(&cid("1000")).unwrap(),
            Some(DocumentStatus::SubmittedByEb)
        );
        assert_eq!(staged.into_batch().len(), 2);
    }

    #[test]
    fn stage_submit_detects_existing_row() {
        let inv = machine(DocumentKind::Invoice);
        inv.submit(&cid("1000"), b"x").unwrap();
        assert!(matches!(
            inv.stage_submit(&cid("1000"), b"y"),
            Err(TradeError::AlreadyExists { .. })
        ));
        assert_eq!(inv.stage_submit(&cid("1001"), b"y").unwrap().len(), 1);
    }

    #[test]
    fn submit_fails_exactly_when_staging_does() {
        let inv = machine(DocumentKind::Invoice);
        let id = cid("1000");
        assert_eq!(
            inv.submit(&id, b"").unwrap_err(),
            inv.stage_submit(&id, b"").unwrap_err()
        );
        inv.submit(&id, b"x").unwrap();
        assert_eq!(
            inv.submit(&id, b"y").unwrap_err(),
            inv.stage_submit(&id, b"y").unwrap_err()
        );
        assert_eq!(inv.get_payload(&id).unwrap().unwrap(), b"x");
    }

    proptest::proptest! {
        #[test]
        fn transition_succeeds_iff_legal_edge(
            path in proptest::collection::vec(0usize..6, 1..6)
        ) {
            let bl = machine(DocumentKind::BillOfLading);
            let id = cid("p");
            bl.submit(&id, b"doc").unwrap();
            for idx in path {
                let to = DocumentStatus::ALL[idx];
                let before = bl.get_status(&id).unwrap().unwrap();
                let legal = before.valid_transitions().contains(&to);
                let result = bl.transition(&id, to);
                proptest::prop_assert_eq!(result.is_ok(), legal);
                let after = bl.get_status(&id).unwrap().unwrap();
                proptest::prop_assert_eq!(after, if legal { to } else { before });
            }
        }
    }
}
