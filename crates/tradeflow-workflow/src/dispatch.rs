//! # Command and Query Dispatch
//!
//! The named surface a host drives: `invoke(function, args, caller)` for
//! mutations and `query(function, args, caller)` for reads. Arguments are
//! positional byte strings. Identifiers, document types, roles, and
//! statuses must be UTF-8; payloads and certificates are opaque.
//!
//! Parsing into [`Invocation`] / [`Query`] checks the function name and the
//! exact argument count before anything touches the ledger.
//!
//! With access control on, a signed call must carry the payload
//! [`call_payload`](crate::access::call_payload) builds for that exact
//! function and argument list. A signed invoke also consumes its binding in
//! the [`BindingLog`] before it runs, so the same proof cannot run twice.

use std::sync::Arc;

use serde_json::json;
use tradeflow_core::{ContractId, DocumentKind, Role, TradeError};
use tradeflow_crypto::SignatureVerifier;
use tradeflow_state::DocumentStatus;

use crate::access::{AccessGate, CallerProof};
use crate::audit::AuditQueries;
use crate::binding::BindingLog;
use crate::config::WorkflowConfig;
use crate::document::DocumentMachine;
use crate::metrics::WorkflowMetrics;
use crate::orchestrator::{ExportPayloads, Orchestrator};
use crate::purchase_order::PurchaseOrderBook;
use crate::registry::{ContractRegistry, NewContract, Party};
use crate::SharedStore;

// ─── Argument Parsing ─────────────────────────────────────────────────

fn expect_arity(args: &[Vec<u8>], expected: usize) -> Result<(), TradeError> {
    if args.len() != expected {
        return Err(TradeError::arity(expected, args.len()));
    }
    Ok(())
}

fn text(arg: &[u8], what: &str) -> Result<String, TradeError> {
    String::from_utf8(arg.to_vec())
        .map_err(|_| TradeError::InvalidArgument(format!("{what} must be UTF-8")))
}

fn contract_id(arg: &[u8]) -> Result<ContractId, TradeError> {
    ContractId::new(text(arg, "contract id")?)
}

/// A parsed mutating command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    InitTrade {
        id: ContractId,
        po_payload: Vec<u8>,
        contract: NewContract,
    },
    UpdatePo {
        id: ContractId,
        po_payload: Vec<u8>,
    },
    SubmitEd {
        id: ContractId,
        payloads: ExportPayloads,
    },
    AcceptEd {
        id: ContractId,
    },
    RejectEd {
        id: ContractId,
    },
}

impl Invocation {
    /// Parse a function name and its positional arguments.
    pub fn parse(function: &str, args: &[Vec<u8>]) -> Result<Self, TradeError> {
        match function {
            "initTrade" => {
                expect_arity(args, 10)?;
                let party = |name: usize, cert: usize| -> Result<Party, TradeError> {
                    Ok(Party::new(text(&args[name], "party name")?, args[cert].clone()))
                };
                Ok(Self::InitTrade {
                    id: contract_id(&args[0])?,
                    po_payload: args[1].clone(),
                    contract: NewContract {
                        importer: party(2, 6)?,
                        exporter: party(3, 7)?,
                        importer_bank: party(4, 8)?,
                        exporter_bank: party(5, 9)?,
                    },
                })
            }
            "updatePO" => {
                expect_arity(args, 2)?;
                Ok(Self::UpdatePo {
                    id: contract_id(&args[0])?,
                    po_payload: args[1].clone(),
                })
            }
            "submitED" => {
                expect_arity(args, 4)?;
                Ok(Self::SubmitEd {
                    id: contract_id(&args[0])?,
                    payloads: ExportPayloads::new(
                        args[1].clone(),
                        args[2].clone(),
                        args[3].clone(),
                    ),
                })
            }
            "acceptED" => {
                expect_arity(args, 1)?;
                Ok(Self::AcceptEd {
                    id: contract_id(&args[0])?,
                })
            }
            "rejectED" => {
                expect_arity(args, 1)?;
                Ok(Self::RejectEd {
                    id: contract_id(&args[0])?,
                })
            }
            _ => Err(TradeError::InvalidArgument(
                "Invalid invoke function name.".to_string(),
            )),
        }
    }

    /// The wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitTrade { .. } => "initTrade",
            Self::UpdatePo { .. } => "updatePO",
            Self::SubmitEd { .. } => "submitED",
            Self::AcceptEd { .. } => "acceptED",
            Self::RejectEd { .. } => "rejectED",
        }
    }

    pub fn contract_id(&self) -> &ContractId {
        match self {
            Self::InitTrade { id, .. }
            | Self::UpdatePo { id, .. }
            | Self::SubmitEd { id, .. }
            | Self::AcceptEd { id }
            | Self::RejectEd { id } => id,
        }
    }
}

/// A parsed read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    GetEd { id: ContractId, kind: DocumentKind },
    GetPo { id: ContractId },
    GetEdStatus { id: ContractId },
    GetNumContracts,
    ListContracts,
    ListContractsByRole { role: Role },
    ListEdsByStatus { status: DocumentStatus },
    GetContractParticipants { id: ContractId },
}

impl Query {
    /// Parse a function name and its positional arguments.
    pub fn parse(function: &str, args: &[Vec<u8>]) -> Result<Self, TradeError> {
        match function {
            "getED" => {
                expect_arity(args, 2)?;
                Ok(Self::GetEd {
                    id: contract_id(&args[0])?,
                    kind: DocumentKind::parse_export(&text(&args[1], "document type")?)?,
                })
            }
            "getPO" => {
                expect_arity(args, 1)?;
                Ok(Self::GetPo {
                    id: contract_id(&args[0])?,
                })
            }
            "getEDStatus" => {
                expect_arity(args, 1)?;
                Ok(Self::GetEdStatus {
                    id: contract_id(&args[0])?,
                })
            }
            "getNumContracts" => {
                expect_arity(args, 0)?;
                Ok(Self::GetNumContracts)
            }
            "listContracts" => {
                expect_arity(args, 0)?;
                Ok(Self::ListContracts)
            }
            "listContractsByRole" => {
                expect_arity(args, 1)?;
                Ok(Self::ListContractsByRole {
                    role: text(&args[0], "role")?.parse()?,
                })
            }
            "listEDsByStatus" => {
                expect_arity(args, 1)?;
                let raw = text(&args[0], "status")?;
                let status = raw
                    .parse::<DocumentStatus>()
                    .map_err(|e| TradeError::InvalidArgument(e.to_string()))?;
                Ok(Self::ListEdsByStatus { status })
            }
            "getContractParticipants" => {
                expect_arity(args, 1)?;
                Ok(Self::GetContractParticipants {
                    id: contract_id(&args[0])?,
                })
            }
            _ => Err(TradeError::InvalidArgument(
                "Invalid query function name.".to_string(),
            )),
        }
    }

    /// The wire name of the query.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetEd { .. } => "getED",
            Self::GetPo { .. } => "getPO",
            Self::GetEdStatus { .. } => "getEDStatus",
            Self::GetNumContracts => "getNumContracts",
            Self::ListContracts => "listContracts",
            Self::ListContractsByRole { .. } => "listContractsByRole",
            Self::ListEdsByStatus { .. } => "listEDsByStatus",
            Self::GetContractParticipants { .. } => "getContractParticipants",
        }
    }
}

// ─── Workflow ─────────────────────────────────────────────────────────

/// One trade workflow over one ledger store.
#[derive(Clone)]
pub struct TradeWorkflow {
    store: SharedStore,
    config: WorkflowConfig,
    gate: AccessGate,
    orchestrator: Orchestrator,
    audit: AuditQueries,
    purchase_orders: PurchaseOrderBook,
    bindings: BindingLog,
    metrics: WorkflowMetrics,
}

impl std::fmt::Debug for TradeWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeWorkflow")
            .field("config", &self.config)
            .finish()
    }
}

fn to_json(value: &impl serde::Serialize) -> Result<Vec<u8>, TradeError> {
    serde_json::to_vec(value)
        .map_err(|e| TradeError::UpstreamFailure(format!("reply serialization failed: {e}")))
}

impl TradeWorkflow {
    pub fn new(
        store: SharedStore,
        verifier: Arc<dyn SignatureVerifier>,
        config: WorkflowConfig,
    ) -> Self {
        let registry = ContractRegistry::new(store.clone());
        let gate = AccessGate::new(registry.clone(), verifier, config.access);
        let orchestrator = Orchestrator::new(store.clone(), gate.clone(), config.fan_out);
        let audit = AuditQueries::new(
            registry,
            DocumentMachine::new(DocumentKind::BillOfLading, store.clone()),
            gate.clone(),
        );
        Self {
            purchase_orders: PurchaseOrderBook::new(store.clone()),
            bindings: BindingLog::new(store.clone()),
            store,
            config,
            gate,
            orchestrator,
            audit,
            metrics: WorkflowMetrics::new(),
        }
    }

    /// Create the ledger tables. Re-running is a no-op.
    pub fn init(&self) -> Result<(), TradeError> {
        crate::ensure_tables(self.store.as_ref())?;
        tracing::info!(
            access_control = self.config.access.is_enabled(),
            fan_out = %self.config.fan_out,
            "trade workflow initialised"
        );
        Ok(())
    }

    pub fn config(&self) -> WorkflowConfig {
        self.config
    }

    pub fn metrics(&self) -> &WorkflowMetrics {
        &self.metrics
    }

    /// Run a mutating command. Replies are always empty.
    pub fn invoke(
        &self,
        function: &str,
        args: &[Vec<u8>],
        caller: &CallerProof,
    ) -> Result<Option<Vec<u8>>, TradeError> {
        self.metrics.record_invocation();
        let result = Invocation::parse(function, args).and_then(|inv| {
            self.gate.check_payload(function, args, caller)?;
            self.consume_binding(function, caller)?;
            self.execute(&inv, caller)
        });
        if let Err(e) = &result {
            self.metrics.record_error(e);
            tracing::debug!(function, class = e.class(), error = %e, "invocation failed");
        }
        result
    }

    fn consume_binding(&self, function: &str, caller: &CallerProof) -> Result<(), TradeError> {
        if !self.config.access.is_enabled() || caller.signature.is_empty() {
            return Ok(());
        }
        self.bindings.consume(&caller.binding, function)
    }

    /// Run a parsed command.
    ///
    /// Skips the payload and binding checks of [`Self::invoke`].
    pub fn execute(
        &self,
        invocation: &Invocation,
        caller: &CallerProof,
    ) -> Result<Option<Vec<u8>>, TradeError> {
        match invocation {
            Invocation::InitTrade {
                id,
                po_payload,
                contract,
            } => self.orchestrator.initiate_trade(id, po_payload, contract)?,
            Invocation::UpdatePo { id, po_payload } => {
                self.orchestrator.update_po(id, po_payload, caller)?
            }
            Invocation::SubmitEd { id, payloads } => {
                self.orchestrator
                    .submit_export_documents(id, payloads, caller)?
            }
            Invocation::AcceptEd { id } => {
                self.orchestrator.accept_export_documents(id, caller)?;
            }
            Invocation::RejectEd { id } => {
                self.orchestrator.reject_export_documents(id, caller)?
            }
        }
        Ok(None)
    }

    /// Run a read. Absent documents reply `None`.
    pub fn query(
        &self,
        function: &str,
        args: &[Vec<u8>],
        caller: &CallerProof,
    ) -> Result<Option<Vec<u8>>, TradeError> {
        self.metrics.record_query();
        let result = Query::parse(function, args).and_then(|q| {
            self.gate.check_payload(function, args, caller)?;
            self.answer(&q, caller)
        });
        if let Err(e) = &result {
            self.metrics.record_error(e);
            tracing::debug!(function, class = e.class(), error = %e, "query failed");
        }
        result
    }

    /// Answer a parsed query.
    pub fn answer(
        &self,
        query: &Query,
        caller: &CallerProof,
    ) -> Result<Option<Vec<u8>>, TradeError> {
        match query {
            Query::GetEd { id, kind } => {
                self.gate.require_participant(id, caller)?;
                self.export_machine(*kind)?.get_payload(id)
            }
            Query::GetPo { id } => {
                self.gate.require_participant(id, caller)?;
                self.purchase_orders.get_payload(id)
            }
            Query::GetEdStatus { id } => {
                self.gate.require_participant(id, caller)?;
                let status = self
                    .export_machine(DocumentKind::BillOfLading)?
                    .get_status(id)?
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                to_json(&json!({ "Status": status })).map(Some)
            }
            Query::GetNumContracts => {
                let count = self.audit.count_contracts()?;
                to_json(&json!({ "NumContracts": count })).map(Some)
            }
            Query::ListContracts => to_json(&self.audit.list_contracts(caller)?).map(Some),
            Query::ListContractsByRole { role } => {
                to_json(&self.audit.list_contracts_by_role(*role, caller)?).map(Some)
            }
            Query::ListEdsByStatus { status } => {
                to_json(&self.audit.list_eds_by_status(*status, caller)?).map(Some)
            }
            Query::GetContractParticipants { id } => {
                to_json(&self.audit.participants(id, caller)?).map(Some)
            }
        }
    }

    fn export_machine(&self, kind: DocumentKind) -> Result<&DocumentMachine, TradeError> {
        self.orchestrator.machine(kind).ok_or_else(|| {
            TradeError::InvalidArgument(
                "Document type should be BL or INVOICE or PACKINGLIST".to_string(),
            )
        })
    }
}
