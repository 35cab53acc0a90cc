//! # Audit Queries
//!
//! Read-only listings over the contract registry. The status reported for
//! a contract is the live bill of lading status, or the registry status
//! (`IN_PROGRESS`) while no bill of lading has been submitted.
//!
//! With access control enabled, listings only include contracts the caller
//! takes part in (or holds the requested role on). Gate errors abort the
//! listing rather than silently dropping rows.

use serde::Serialize;
use tradeflow_core::{ContractId, Role, TradeError};
use tradeflow_ledger::ContractRow;
use tradeflow_state::DocumentStatus;

use crate::access::{AccessGate, CallerProof};
use crate::document::DocumentMachine;
use crate::registry::{ContractRegistry, Participant};

/// One row of a contract listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractSummary {
    #[serde(rename = "contractID")]
    pub contract_id: String,
    #[serde(rename = "contractStatus")]
    pub contract_status: String,
}

/// Reply of `listContracts`, `listContractsByRole`, and `listEDsByStatus`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractListing {
    pub contracts: Vec<ContractSummary>,
}

#[derive(Clone)]
pub struct AuditQueries {
    registry: ContractRegistry,
    bill_of_lading: DocumentMachine,
    gate: AccessGate,
}

impl std::fmt::Debug for AuditQueries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditQueries").field("gate", &self.gate).finish()
    }
}

impl AuditQueries {
    pub fn new(
        registry: ContractRegistry,
        bill_of_lading: DocumentMachine,
        gate: AccessGate,
    ) -> Self {
        Self {
            registry,
            bill_of_lading,
            gate,
        }
    }

    /// Number of contracts, unfiltered.
    pub fn count_contracts(&self) -> Result<usize, TradeError> {
        self.registry.count()
    }

    fn live_status(&self, contract: &ContractRow) -> Result<String, TradeError> {
        Ok(match self.bill_of_lading.get_status(&contract.id)? {
            Some(status) => status.to_string(),
            None => contract.status.clone(),
        })
    }

    fn collect(
        &self,
        mut keep: impl FnMut(&ContractRow, &str) -> Result<bool, TradeError>,
    ) -> Result<ContractListing, TradeError> {
        let mut contracts = Vec::new();
        for contract in self.registry.list_all()? {
            let contract = contract?;
            let status = self.live_status(&contract)?;
            if keep(&contract, &status)? {
                contracts.push(ContractSummary {
                    contract_id: contract.id.to_string(),
                    contract_status: status,
                });
            }
        }
        tracing::debug!(count = contracts.len(), "contracts listed");
        Ok(ContractListing { contracts })
    }

    /// Every contract the caller takes part in.
    pub fn list_contracts(&self, caller: &CallerProof) -> Result<ContractListing, TradeError> {
        self.collect(|c, _| self.gate.is_participant(&c.id, caller))
    }

    /// Every contract on which the caller holds `role`.
    pub fn list_contracts_by_role(
        &self,
        role: Role,
        caller: &CallerProof,
    ) -> Result<ContractListing, TradeError> {
        self.collect(|c, _| self.gate.is_role(&c.id, role, caller))
    }

    /// Contracts whose bill of lading is in `status`.
    pub fn list_eds_by_status(
        &self,
        status: DocumentStatus,
        caller: &CallerProof,
    ) -> Result<ContractListing, TradeError> {
        self.collect(|c, live| {
            if live != status.as_str() {
                return Ok(false);
            }
            self.gate.is_participant(&c.id, caller)
        })
    }

    /// The contract's four parties. Participants only.
    pub fn participants(
        &self,
        id: &ContractId,
        caller: &CallerProof,
    ) -> Result<Vec<Participant>, TradeError> {
        self.gate.require_participant(id, caller)?;
        self.registry.participants(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessPolicy;
    use crate::registry::tests::sample_contract;
    use crate::SharedStore;
    use std::sync::Arc;
    use tradeflow_core::DocumentKind;
    use tradeflow_crypto::Ed25519Verifier;
    use tradeflow_ledger::MemoryLedger;

    struct Fixture {
        registry: ContractRegistry,
        bl: DocumentMachine,
        audit: AuditQueries,
    }

    fn fixture(policy: AccessPolicy) -> Fixture {
        let store: SharedStore = Arc::new(MemoryLedger::new());
        crate::ensure_tables(store.as_ref()).unwrap();
        let registry = ContractRegistry::new(store.clone());
        let bl = DocumentMachine::new(DocumentKind::BillOfLading, store);
        let gate = AccessGate::new(registry.clone(), Arc::new(Ed25519Verifier), policy);
        Fixture {
            audit: AuditQueries::new(registry.clone(), bl.clone(), gate),
            registry,
            bl,
        }
    }

    fn cid(s: &str) -> ContractId {
        ContractId::new(s).unwrap()
    }

    #[test]
    fn listing_reports_bill_of_lading_status() {
        let f = fixture(AccessPolicy::disabled());
        f.registry.create(&cid("1000"), &sample_contract()).unwrap();
        f.registry.create(&cid("1001"), &sample_contract()).unwrap();
        f.bl.submit(&cid("1001"), b"BL").unwrap();

        let json = serde_json::to_string(
            &f.audit.list_contracts(&CallerProof::anonymous()).unwrap(),
        )
        .unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"contracts":[{"contractID":"1000","contractStatus":"IN_PROGRESS"},"#,
                r#"{"contractID":"1001","contractStatus":"SUBMITTED_BY_EB"}]}"#
            )
        );
    }

    #[test]
    fn empty_registry_lists_nothing() {
        let f = fixture(AccessPolicy::disabled());
        let listing = f.audit.list_contracts(&CallerProof::anonymous()).unwrap();
        assert!(listing.contracts.is_empty());
        assert_eq!(f.audit.count_contracts().unwrap(), 0);
    }

    #[test]
    fn status_filter_matches_exactly() {
        let f = fixture(AccessPolicy::disabled());
        f.registry.create(&cid("1000"), &sample_contract()).unwrap();
        f.registry.create(&cid("1001"), &sample_contract()).unwrap();
        f.bl.submit(&cid("1000"), b"BL").unwrap();
        f.bl.submit(&cid("1001"), b"BL").unwrap();
        f.bl.transition(&cid("1001"), DocumentStatus::RejectedByIb)
            .unwrap();

        let anon = CallerProof::anonymous();
        let submitted = f
            .audit
            .list_eds_by_status(DocumentStatus::SubmittedByEb, &anon)
            .unwrap();
        assert_eq!(submitted.contracts.len(), 1);
        assert_eq!(submitted.contracts[0].contract_id, "1000");
        assert!(f
            .audit
            .list_eds_by_status(DocumentStatus::PaymentCompleted, &anon)
            .unwrap()
            .contracts
            .is_empty());
    }

    #[test]
    fn enabled_gate_hides_foreign_contracts() {
        let f = fixture(AccessPolicy::enabled());
        let kp = tradeflow_crypto::Ed25519KeyPair::generate();
        let mut contract = sample_contract();
        contract.importer.certificate = kp.public_key().to_hex().into_bytes();
        // The sample certificates are not keys; give every party a real one.
        for party in [
            &mut contract.exporter,
            &mut contract.importer_bank,
            &mut contract.exporter_bank,
        ] {
            party.certificate = tradeflow_crypto::Ed25519KeyPair::generate()
                .public_key()
                .to_hex()
                .into_bytes();
        }
        f.registry.create(&cid("1000"), &contract).unwrap();

        let mut proof =
            CallerProof::new(Vec::<u8>::new(), b"listContracts".to_vec(), b"n".to_vec());
        proof.signature = kp.sign(&proof.message()).to_hex().into_bytes();
        assert_eq!(f.audit.list_contracts(&proof).unwrap().contracts.len(), 1);
        assert_eq!(
            f.audit
                .list_contracts_by_role(Role::Importer, &proof)
                .unwrap()
                .contracts
                .len(),
            1
        );
        assert!(f
            .audit
            .list_contracts_by_role(Role::Exporter, &proof)
            .unwrap()
            .contracts
            .is_empty());

        let stranger = tradeflow_crypto::Ed25519KeyPair::generate();
        proof.signature = stranger.sign(&proof.message()).to_hex().into_bytes();
        assert!(f.audit.list_contracts(&proof).unwrap().contracts.is_empty());
        assert!(matches!(
            f.audit.participants(&cid("1000"), &proof),
            Err(TradeError::AccessDenied(_))
        ));
    }
}
