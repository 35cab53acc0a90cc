//! # tradeflow-core: Foundational Types for the Trade Workflow
//!
//! Defines the primitives every other `tradeflow-*` crate builds on. This
//! crate depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `ContractId` rejects the empty
//!    string at construction, so every downstream component can assume a
//!    usable key.
//!
//! 2. **Closed enums for roles and document kinds.** `Role` and
//!    `DocumentKind` are parsed once at the boundary; unknown strings are
//!    `InvalidArgument` and never reach storage.
//!
//! 3. **One error taxonomy.** `TradeError` carries the six failure classes
//!    surfaced to callers. Lower layers keep their own error enums and
//!    convert into it.
//!
//! 4. **UTC-only timestamps.** `Timestamp` is seconds precision with a `Z`
//!    suffix.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tradeflow-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod identity;
pub mod temporal;

pub use document::DocumentKind;
pub use error::{CryptoError, StoreError, TradeError};
pub use identity::{ContractId, Role};
pub use temporal::Timestamp;
