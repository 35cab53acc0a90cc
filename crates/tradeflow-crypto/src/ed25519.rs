//! # Ed25519 Certificates and Signatures
//!
//! A participant's "certificate" stored on the contract row is an Ed25519
//! public key. Callers prove a role by signing the [`InvocationMessage`] of
//! the current invocation with the matching private key.
//!
//! ## Security Invariant
//!
//! - Signing input MUST be `&InvocationMessage`. There is no way to sign
//!   an arbitrary byte slice through this API.
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does
//!   not implement `Serialize`; its `Debug` prints `<private>`.
//!
//! ## Wire Forms
//!
//! Certificates arrive as command arguments, so both raw bytes and hex text
//! are accepted: 32 raw bytes or 64 hex characters for a public key, 64 raw
//! bytes or 128 hex characters for a signature.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tradeflow_core::CryptoError;

use crate::message::InvocationMessage;

/// An Ed25519 public key (32 bytes) used as a participant certificate.
///
/// Serializes as a hex-encoded string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes). Serializes as a hex-encoded string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair held by one trade participant.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 64 {
            return Err(CryptoError::KeyError(format!(
                "public key hex must be 64 chars, got {}",
                hex.len()
            )));
        }
        let bytes = hex_to_bytes(&hex).map_err(CryptoError::KeyError)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Decode a certificate column: 32 raw bytes or 64 hex characters.
    pub fn from_certificate(cert: &[u8]) -> Result<Self, CryptoError> {
        if let Ok(arr) = <[u8; 32]>::try_from(cert) {
            return Ok(Self(arr));
        }
        let text = std::str::from_utf8(cert).map_err(|_| {
            CryptoError::KeyError(format!("certificate is {} opaque bytes", cert.len()))
        })?;
        Self::from_hex(text)
    }

    /// Convert to an `ed25519_dalek::VerifyingKey`.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render the signature as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 128 {
            return Err(CryptoError::VerificationFailed(format!(
                "signature hex must be 128 chars, got {}",
                hex.len()
            )));
        }
        let bytes = hex_to_bytes(&hex).map_err(CryptoError::VerificationFailed)?;
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Decode caller metadata: 64 raw bytes or 128 hex characters.
    pub fn from_wire(sig: &[u8]) -> Result<Self, CryptoError> {
        if let Ok(arr) = <[u8; 64]>::try_from(sig) {
            return Ok(Self(arr));
        }
        let text = std::str::from_utf8(sig).map_err(|_| {
            CryptoError::VerificationFailed(format!("signature is {} opaque bytes", sig.len()))
        })?;
        Self::from_hex(text)
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create a key pair from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Load a key pair from a 64-character hex seed (the key file format).
    pub fn from_seed_hex(hex: &str) -> Result<Self, CryptoError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 64 {
            return Err(CryptoError::KeyError(format!(
                "private key hex must be 64 chars, got {}",
                hex.len()
            )));
        }
        let bytes = hex_to_bytes(&hex).map_err(CryptoError::KeyError)?;
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes);
        Ok(Self::from_seed(&seed))
    }

    /// Hex seed for writing a key file. Only key generation should call this.
    pub fn export_seed_hex(&self) -> String {
        bytes_to_hex(&self.signing_key.to_bytes())
    }

    /// The public key, i.e. the certificate registered for this participant.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign an invocation message.
    pub fn sign(&self, message: &InvocationMessage) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify a signature over an invocation message.
///
/// Returns `Ok(())` if valid, `Err(CryptoError::VerificationFailed)` if the
/// signature does not match, `Err(CryptoError::KeyError)` if the public key
/// is not a valid curve point.
pub fn verify_with_public_key(
    message: &InvocationMessage,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(message.as_bytes(), &sig).map_err(|e| {
        CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}"))
    })
}

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_prefix(bytes: &[u8]) -> String {
    bytes_to_hex(&bytes[..bytes.len().min(4)])
}

fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err("hex string must have even length".to_string());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .ok_or_else(|| format!("invalid hex at position {i}"))
                .and_then(|pair| {
                    u8::from_str_radix(pair, 16)
                        .map_err(|e| format!("invalid hex at position {i}: {e}"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> InvocationMessage {
        InvocationMessage::new(b"acceptED:1000", b"binding-0001")
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let msg = sample_message();
        let sig = kp.sign(&msg);
        verify_with_public_key(&msg, &sig, &kp.public_key()).expect("valid signature");
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let msg = sample_message();
        let sig = kp1.sign(&msg);
        assert!(verify_with_public_key(&msg, &sig, &kp2.public_key()).is_err());
    }

    #[test]
    fn test_verify_other_binding_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&sample_message());
        let replayed = InvocationMessage::new(b"acceptED:1000", b"binding-0002");
        assert!(verify_with_public_key(&replayed, &sig, &kp.public_key()).is_err());
    }

    #[test]
    fn test_deterministic_from_seed() {
        let kp1 = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let kp2 = Ed25519KeyPair::from_seed(&[7u8; 32]);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.sign(&sample_message()), kp2.sign(&sample_message()));
    }

    #[test]
    fn test_seed_hex_reloads_same_key() {
        let kp = Ed25519KeyPair::generate();
        let reloaded = Ed25519KeyPair::from_seed_hex(&kp.export_seed_hex()).unwrap();
        assert_eq!(kp.public_key(), reloaded.public_key());
    }

    #[test]
    fn test_certificate_accepts_raw_and_hex() {
        let pk = Ed25519KeyPair::generate().public_key();
        assert_eq!(Ed25519PublicKey::from_certificate(pk.as_bytes()).unwrap(), pk);
        assert_eq!(
            Ed25519PublicKey::from_certificate(pk.to_hex().as_bytes()).unwrap(),
            pk
        );
    }

    #[test]
    fn test_certificate_rejects_placeholder_text() {
        assert!(Ed25519PublicKey::from_certificate(b"IBCert").is_err());
        assert!(Ed25519PublicKey::from_certificate(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn test_signature_wire_forms() {
        let sig = Ed25519KeyPair::generate().sign(&sample_message());
        assert_eq!(Ed25519Signature::from_wire(sig.as_bytes()).unwrap(), sig);
        assert_eq!(
            Ed25519Signature::from_wire(sig.to_hex().as_bytes()).unwrap(),
            sig
        );
        assert!(Ed25519Signature::from_wire(b"short").is_err());
    }

    #[test]
    fn test_public_key_serde_json() {
        let pk = Ed25519KeyPair::generate().public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json.len(), 64 + 2);
        let back: Ed25519PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(Ed25519PublicKey::from_hex("aabb").is_err());
        assert!(Ed25519PublicKey::from_hex(&"zz".repeat(32)).is_err());
        assert!(Ed25519Signature::from_hex("not-hex").is_err());
        assert!(Ed25519KeyPair::from_seed_hex(&"é".repeat(32)).is_err());
    }

    #[test]
    fn test_debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate();
        assert_eq!(format!("{kp:?}"), "Ed25519KeyPair(<private>)");
    }
}
