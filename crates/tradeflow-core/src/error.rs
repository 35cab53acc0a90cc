//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout the trade workflow. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - `TradeError` is the caller-facing taxonomy. Every command and query
//!   fails with exactly one of its six variants.
//! - `StoreError` and `CryptoError` describe collaborator failures. They
//!   convert into `TradeError::UpstreamFailure`.
//! - State machine rejections carry the document kind, contract id, and
//!   both status names so that a log line is self-explanatory.

use thiserror::Error;

/// Caller-facing error taxonomy for the trade workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TradeError {
    /// Wrong argument count, empty identifier, unknown role, document kind,
    /// status, or function name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A contract or document with this key is already stored.
    #[error("{kind} already exists: {id}")]
    AlreadyExists {
        /// Record kind ("contract", "BL", ...).
        kind: String,
        /// Contract id.
        id: String,
    },

    /// The contract or document does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind ("contract", "BL", ...).
        kind: String,
        /// Contract id.
        id: String,
    },

    /// The requested status change is not an edge of the document lifecycle.
    #[error("illegal transition for {kind} {id}: {from} -> {to}")]
    IllegalTransition {
        /// Document kind.
        kind: String,
        /// Contract id.
        id: String,
        /// Current status.
        from: String,
        /// Attempted status.
        to: String,
    },

    /// The caller failed the role or participant check.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The ledger store or the signature primitive failed.
    #[error("upstream failure: {0}")]
    UpstreamFailure(String),
}

impl TradeError {
    /// Short machine-readable class name, used as a structured log field.
    pub fn class(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::AlreadyExists { .. } => "already_exists",
            Self::NotFound { .. } => "not_found",
            Self::IllegalTransition { .. } => "illegal_transition",
            Self::AccessDenied(_) => "access_denied",
            Self::UpstreamFailure(_) => "upstream_failure",
        }
    }

    /// Build an `InvalidArgument` for a wrong argument count.
    pub fn arity(expected: usize, got: usize) -> Self {
        Self::InvalidArgument(format!(
            "incorrect number of arguments: expecting {expected}, got {got}"
        ))
    }
}

/// Error raised by a ledger store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The named table was never created.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// A row does not match the table's column layout.
    #[error("schema mismatch in table {table}: {reason}")]
    SchemaMismatch {
        /// Table name.
        table: String,
        /// What did not match.
        reason: String,
    },

    /// A batched insert collided with an existing row.
    #[error("row conflict in table {table}: {key}")]
    Conflict {
        /// Table name.
        table: String,
        /// Rendered row key.
        key: String,
    },

    /// Persisting or loading a snapshot failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification could not be attempted.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key or certificate parsing failed.
    #[error("key error: {0}")]
    KeyError(String),
}

impl From<StoreError> for TradeError {
    fn from(err: StoreError) -> Self {
        Self::UpstreamFailure(format!("ledger store: {err}"))
    }
}

impl From<CryptoError> for TradeError {
    fn from(err: CryptoError) -> Self {
        Self::UpstreamFailure(format!("signature verifier: {err}"))
    }
}
