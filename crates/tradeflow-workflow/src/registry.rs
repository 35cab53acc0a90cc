//! # Contract Registry
//!
//! One row per trade, created once at initiation and never deleted. The row
//! carries the four party names and the certificate the access gate checks
//! callers against for each role. Certificates are immutable.

use serde::Serialize;
use tradeflow_core::{ContractId, Role, Timestamp, TradeError};
use tradeflow_ledger::{ContractRow, WriteBatch, CONTRACT_TABLE, CONTRACT_TAG};
use tradeflow_state::CONTRACT_INITIAL_STATUS;

use crate::SharedStore;

/// A party's display name and certificate.
#[derive(Clone, PartialEq, Eq)]
pub struct Party {
    pub name: String,
    pub certificate: Vec<u8>,
}

impl Party {
    pub fn new(name: impl Into<String>, certificate: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            certificate: certificate.into(),
        }
    }
}

impl std::fmt::Debug for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Party")
            .field("name", &self.name)
            .field("certificate", &tradeflow_crypto::fingerprint(&self.certificate))
            .finish()
    }
}

/// The four parties of a new trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContract {
    pub importer: Party,
    pub exporter: Party,
    pub importer_bank: Party,
    pub exporter_bank: Party,
}

impl NewContract {
    fn party(&self, role: Role) -> &Party {
        match role {
            Role::Importer => &self.importer,
            Role::Exporter => &self.exporter,
            Role::ImporterBank => &self.importer_bank,
            Role::ExporterBank => &self.exporter_bank,
        }
    }

    fn to_row(&self, id: &ContractId) -> ContractRow {
        ContractRow {
            id: id.clone(),
            status: CONTRACT_INITIAL_STATUS.to_string(),
            names: Role::ALL.map(|r| self.party(r).name.clone()),
            certificates: Role::ALL.map(|r| self.party(r).certificate.clone()),
            created_at: Timestamp::now(),
        }
    }
}

/// A named party of a contract, as reported by `getContractParticipants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: String,
    pub role: Role,
}

/// Contract table access.
#[derive(Clone)]
pub struct ContractRegistry {
    store: SharedStore,
}

impl std::fmt::Debug for ContractRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ContractRegistry")
    }
}

fn not_found(id: &ContractId) -> TradeError {
    TradeError::NotFound {
        kind: "contract".to_string(),
        id: id.to_string(),
    }
}

fn already_exists(id: &ContractId) -> TradeError {
    TradeError::AlreadyExists {
        kind: "contract".to_string(),
        id: id.to_string(),
    }
}

impl ContractRegistry {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Validate a new contract. Returns the row and the insert that stores it.
    pub fn stage_create(
        &self,
        id: &ContractId,
        contract: &NewContract,
    ) -> Result<(ContractRow, WriteBatch), TradeError> {
        if self.exists(id)? {
            return Err(already_exists(id));
        }
        let row = contract.to_row(id);
        let mut batch = WriteBatch::new();
        batch.insert(CONTRACT_TABLE, row.to_row());
        Ok((row, batch))
    }

    /// Insert a contract with status `IN_PROGRESS`.
    pub fn create(
        &self,
        id: &ContractId,
        contract: &NewContract,
    ) -> Result<ContractRow, TradeError> {
        let (row, batch) = self.stage_create(id, contract)?;
        self.store.commit(batch)?;
        tracing::info!(contract = %id, "contract registered");
        Ok(row)
    }

    /// Fetch a contract, or `None`.
    pub fn get(&self, id: &ContractId) -> Result<Option<ContractRow>, TradeError> {
        let row = self.store.get_row(CONTRACT_TABLE, &ContractRow::key(id))?;
        Ok(row.map(|r| ContractRow::from_row(&r)).transpose()?)
    }

    /// Fetch a contract, failing with `NotFound`.
    pub fn require(&self, id: &ContractId) -> Result<ContractRow, TradeError> {
        self.get(id)?.ok_or_else(|| not_found(id))
    }

    pub fn exists(&self, id: &ContractId) -> Result<bool, TradeError> {
        Ok(self
            .store
            .get_row(CONTRACT_TABLE, &ContractRow::key(id))?
            .is_some())
    }

    /// The stored certificate for `role`.
    pub fn certificate(&self, id: &ContractId, role: Role) -> Result<Vec<u8>, TradeError> {
        Ok(self.require(id)?.certificate(role).to_vec())
    }

    /// The four participants in Importer, Exporter, ImporterBank,
    /// ExporterBank order.
    pub fn participants(&self, id: &ContractId) -> Result<Vec<Participant>, TradeError> {
        let contract = self.require(id)?;
        Ok(Role::ALL
            .into_iter()
            .map(|role| Participant {
                id: contract.name(role).to_string(),
                role,
            })
            .collect())
    }

    /// Every contract, decoded lazily from a fresh scan.
    pub fn list_all(
        &self,
    ) -> Result<impl Iterator<Item = Result<ContractRow, TradeError>>, TradeError> {
        let rows = self.store.scan(CONTRACT_TABLE, CONTRACT_TAG)?;
        Ok(rows.map(|r| ContractRow::from_row(&r).map_err(TradeError::from)))
    }

    /// Number of contracts.
    pub fn count(&self) -> Result<usize, TradeError> {
        Ok(self.store.scan(CONTRACT_TABLE, CONTRACT_TAG)?.count())
    }
}
