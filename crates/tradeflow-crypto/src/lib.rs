//! # tradeflow-crypto: Caller Identity Primitives
//!
//! Provides the cryptographic building blocks the access gate relies on:
//!
//! - **Ed25519** certificates (public keys), signatures, and key pairs.
//! - **`InvocationMessage`**, the only accepted signing and verification
//!   input: the invocation payload followed by its transaction binding.
//! - **`SignatureVerifier`**, the seam between the workflow and whatever
//!   primitive checks a caller's signature. `Ed25519Verifier` is the
//!   shipped implementation.
//! - **SHA-256** fingerprints for logging payloads and certificates without
//!   printing them.
//!
//! ## Crate Policy
//!
//! - Depends only on `tradeflow-core` internally.
//! - Tests use real Ed25519 keys, never a mocked verifier.

pub mod ed25519;
pub mod message;
pub mod sha256;
pub mod verifier;

pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use message::InvocationMessage;
pub use sha256::{fingerprint, sha256_hex};
pub use verifier::{Ed25519Verifier, SignatureVerifier};
