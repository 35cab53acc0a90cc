//! # Invocation Message
//!
//! The byte string a caller signs to prove their identity for one
//! invocation: the invocation payload immediately followed by the
//! transaction binding.
//!
//! The message alone does not stop replay. The workflow requires the payload
//! to encode the exact function and arguments being run, and it records each
//! binding it accepts on a signed invoke so the same proof cannot run twice.

/// Signing input for caller identity proofs.
///
/// Constructed only through [`InvocationMessage::new`], so signing and
/// verification always agree on the concatenation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationMessage(Vec<u8>);

impl InvocationMessage {
    /// Build `payload ‖ binding`.
    pub fn new(payload: &[u8], binding: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(payload.len() + binding.len());
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(binding);
        Self(bytes)
    }

    /// The concatenated bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether both payload and binding were empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
