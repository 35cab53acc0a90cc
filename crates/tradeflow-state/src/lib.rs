//! # tradeflow-state: Document Lifecycle
//!
//! The status machine shared by the bill of lading, the invoice, and the
//! packing list. All three are always moved together by the orchestrator,
//! so one enum and one transition table serve every export kind.
//!
//! ## Statuses
//!
//! ```text
//! SUBMITTED_BY_EB ──▶ ACCEPTED_BY_IB ──▶ PAYMENT_INITIATED ──▶ PAYMENT_INPROGRESS
//!        │                                                              │
//!        │                                                              ▼
//!        │                                                   PAYMENT_COMPLETED (terminal)
//!        └──▶ REJECTED_BY_IB (terminal)
//! ```
//!
//! Purchase orders and contracts carry free-text statuses that never
//! transition through this table; their initial values are exported as
//! constants.

pub mod status;

pub use status::{validate_transition, DocumentStatus, StatusError};

/// Status written on a contract row at trade initiation.
pub const CONTRACT_INITIAL_STATUS: &str = "IN_PROGRESS";

/// Status written on a purchase order row at trade initiation.
pub const PURCHASE_ORDER_INITIAL_STATUS: &str = "SUBMITTED_BY_IB";
