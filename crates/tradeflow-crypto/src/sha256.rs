//! # SHA-256 Fingerprints
//!
//! Payloads and certificates are opaque blobs that must not appear in logs.
//! Log fields carry a SHA-256 fingerprint instead.

use sha2::{Digest, Sha256};

/// Full lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// First 16 hex characters of the SHA-256 of `data`, for log fields.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hex = sha256_hex(data);
    hex.truncate(16);
    hex
}
