//! # Signature Verifier
//!
//! The access gate does not do cryptography itself. It hands a stored
//! certificate, the caller's signature, and the invocation message to a
//! [`SignatureVerifier`] and consumes the boolean answer.
//!
//! Outcomes:
//!
//! - `Ok(true)`: the signature was produced by the certificate's key.
//! - `Ok(false)`: a well-formed signature by some other key, or no
//!   signature at all.
//! - `Err(_)`: the certificate or signature could not be decoded, so the
//!   question could not be answered.

use tradeflow_core::CryptoError;

use crate::ed25519::{verify_with_public_key, Ed25519PublicKey, Ed25519Signature};
use crate::message::InvocationMessage;

/// Checks that a caller signature matches a stored certificate.
pub trait SignatureVerifier: Send + Sync {
    /// Verify `signature` over `message` against `certificate`.
    fn verify(
        &self,
        certificate: &[u8],
        signature: &[u8],
        message: &InvocationMessage,
    ) -> Result<bool, CryptoError>;
}

/// Ed25519 implementation of [`SignatureVerifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(
        &self,
        certificate: &[u8],
        signature: &[u8],
        message: &InvocationMessage,
    ) -> Result<bool, CryptoError> {
        let public_key = Ed25519PublicKey::from_certificate(certificate)?;
        if signature.is_empty() {
            return Ok(false);
        }
        let signature = Ed25519Signature::from_wire(signature)?;
        // Surface malformed curve points as errors, not as a mismatch.
        public_key.to_verifying_key()?;
        Ok(verify_with_public_key(message, &signature, &public_key).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ed25519::Ed25519KeyPair;

    #[test]
    fn matching_key_verifies() {
        let kp = Ed25519KeyPair::generate();
        let msg = InvocationMessage::new(b"rejectED", b"b1");
        let sig = kp.sign(&msg);
        let ok = Ed25519Verifier
            .verify(kp.public_key().to_hex().as_bytes(), sig.as_bytes(), &msg)
            .unwrap();
        assert!(ok);
    }

    #[test]
    fn other_key_is_false_not_error() {
        let signer = Ed25519KeyPair::generate();
        let registered = Ed25519KeyPair::generate();
        let msg = InvocationMessage::new(b"rejectED", b"b1");
        let sig = signer.sign(&msg);
        let ok = Ed25519Verifier
            .verify(registered.public_key().as_bytes(), sig.as_bytes(), &msg)
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn missing_signature_is_false() {
        let kp = Ed25519KeyPair::generate();
        let msg = InvocationMessage::new(b"getPO", b"");
        assert!(!Ed25519Verifier
            .verify(kp.public_key().as_bytes(), b"", &msg)
            .unwrap());
    }

    #[test]
    fn undecodable_certificate_is_error() {
        let kp = Ed25519KeyPair::generate();
        let msg = InvocationMessage::new(b"getPO", b"b");
        let sig = kp.sign(&msg);
        assert!(Ed25519Verifier.verify(b"ICert", sig.as_bytes(), &msg).is_err());
    }

    #[test]
    fn undecodable_signature_is_error() {
        let kp = Ed25519KeyPair::generate();
        let msg = InvocationMessage::new(b"getPO", b"b");
        assert!(Ed25519Verifier
            .verify(kp.public_key().as_bytes(), b"garbage", &msg)
            .is_err());
    }
}
