//! # Access Control Gate
//!
//! A caller proves a role on a contract by signing the invocation message
//! (`payload ‖ binding`) with the key whose certificate the contract row
//! stores for that role. The gate looks the certificate up and asks the
//! injected [`SignatureVerifier`]; it holds no keys of its own.
//!
//! The payload is not free-form. It must equal [`call_payload`] of the
//! function and arguments actually being run, so a signature made for one
//! call cannot authorize another. [`AccessGate::check_payload`] enforces
//! this before any role check.
//!
//! When the [`AccessPolicy`] is disabled, every role and participant check
//! passes without touching storage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tradeflow_core::{ContractId, Role, TradeError};
use tradeflow_crypto::{fingerprint, sha256_hex, InvocationMessage, SignatureVerifier};

use crate::registry::ContractRegistry;

/// Whether the gate enforces caller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    enabled: bool,
}

impl AccessPolicy {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled() -> Self {
        Self::new(true)
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::enabled()
    }
}

#[derive(Serialize)]
struct CallPayload<'a> {
    function: &'a str,
    args: Vec<String>,
}

/// The payload a caller signs for `function(args)`: the JSON document
/// `{"function": ..., "args": [sha256 hex of each argument]}`.
pub fn call_payload(function: &str, args: &[Vec<u8>]) -> Result<Vec<u8>, TradeError> {
    serde_json::to_vec(&CallPayload {
        function,
        args: args.iter().map(|a| sha256_hex(a)).collect(),
    })
    .map_err(|e| TradeError::UpstreamFailure(format!("call payload encoding failed: {e}")))
}

/// What a caller presents with an invocation: a signature over
/// `payload ‖ binding`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CallerProof {
    pub signature: Vec<u8>,
    pub payload: Vec<u8>,
    pub binding: Vec<u8>,
}

impl CallerProof {
    pub fn new(
        signature: impl Into<Vec<u8>>,
        payload: impl Into<Vec<u8>>,
        binding: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            signature: signature.into(),
            payload: payload.into(),
            binding: binding.into(),
        }
    }

    /// A proof with no signature. Passes only when access control is off.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The bytes the signature must cover.
    pub fn message(&self) -> InvocationMessage {
        InvocationMessage::new(&self.payload, &self.binding)
    }
}

impl std::fmt::Debug for CallerProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallerProof")
            .field("signature", &fingerprint(&self.signature))
            .field("payload_len", &self.payload.len())
            .field("binding_len", &self.binding.len())
            .finish()
    }
}

/// Certificate-based caller checks against the contract registry.
#[derive(Clone)]
pub struct AccessGate {
    registry: ContractRegistry,
    verifier: Arc<dyn SignatureVerifier>,
    policy: AccessPolicy,
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("policy", &self.policy)
            .finish()
    }
}

impl AccessGate {
    pub fn new(
        registry: ContractRegistry,
        verifier: Arc<dyn SignatureVerifier>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            registry,
            verifier,
            policy,
        }
    }

    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Reject a signed proof whose payload is not [`call_payload`] of
    /// `function(args)`.
    ///
    /// Unsigned proofs pass here and are judged by the role and participant
    /// checks. Disabled policy passes everything.
    pub fn check_payload(
        &self,
        function: &str,
        args: &[Vec<u8>],
        proof: &CallerProof,
    ) -> Result<(), TradeError> {
        if !self.policy.is_enabled() || proof.signature.is_empty() {
            return Ok(());
        }
        if proof.payload == call_payload(function, args)? {
            return Ok(());
        }
        tracing::warn!(
            function,
            signature = %fingerprint(&proof.signature),
            "signed payload does not match the call"
        );
        Err(TradeError::AccessDenied(format!(
            "signed payload does not match {function}"
        )))
    }

    /// Check `proof` against one certificate.
    pub fn verify_caller(
        &self,
        certificate: &[u8],
        proof: &CallerProof,
    ) -> Result<bool, TradeError> {
        Ok(self
            .verifier
            .verify(certificate, &proof.signature, &proof.message())?)
    }

    /// Whether the caller holds the certificate stored for `role`.
    ///
    /// A mismatch is `Ok(false)`. Errors come only from storage, a missing
    /// contract, or the verifier.
    pub fn is_role(
        &self,
        id: &ContractId,
        role: Role,
        proof: &CallerProof,
    ) -> Result<bool, TradeError> {
        if !self.policy.is_enabled() {
            return Ok(true);
        }
        let certificate = self.registry.certificate(id, role)?;
        let ok = self.verify_caller(&certificate, proof)?;
        tracing::debug!(contract = %id, %role, ok, "role check");
        Ok(ok)
    }

    /// Whether the caller holds any of the contract's four certificates.
    ///
    /// Fails only if every verification attempt fails.
    pub fn is_participant(
        &self,
        id: &ContractId,
        proof: &CallerProof,
    ) -> Result<bool, TradeError> {
        if !self.policy.is_enabled() {
            return Ok(true);
        }
        let contract = self.registry.require(id)?;
        let mut errors = Vec::new();
        let mut matched = false;
        for role in Role::ALL {
            match self.verify_caller(contract.certificate(role), proof) {
                Ok(true) => {
                    matched = true;
                    break;
                }
                Ok(false) => {}
                Err(e) => errors.push(format!("{role}: {e}")),
            }
        }
        if !matched && errors.len() == Role::ALL.len() {
            return Err(TradeError::UpstreamFailure(format!(
                "participant check failed for contract {id}: {}",
                errors.join("; ")
            )));
        }
        tracing::debug!(contract = %id, ok = matched, "participant check");
        Ok(matched)
    }

    /// [`Self::is_role`], with `false` turned into `AccessDenied`.
    pub fn require_role(
        &self,
        id: &ContractId,
        role: Role,
        proof: &CallerProof,
    ) -> Result<(), TradeError> {
        if self.is_role(id, role, proof)? {
            return Ok(());
        }
        tracing::warn!(
            contract = %id,
            %role,
            signature = %fingerprint(&proof.signature),
            "access denied"
        );
        Err(TradeError::AccessDenied(format!(
            "caller is not the {role} of contract {id}"
        )))
    }

    /// [`Self::is_participant`], with `false` turned into `AccessDenied`.
    pub fn require_participant(
        &self,
        id: &ContractId,
        proof: &CallerProof,
    ) -> Result<(), TradeError> {
        if self.is_participant(id, proof)? {
            return Ok(());
        }
        tracing::warn!(
            contract = %id,
            signature = %fingerprint(&proof.signature),
            "access denied"
        );
        Err(TradeError::AccessDenied(format!(
            "caller is not a participant of contract {id}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{NewContract, Party};
    use crate::SharedStore;
    use tradeflow_crypto::{Ed25519KeyPair, Ed25519Verifier};
    use tradeflow_ledger::MemoryLedger;

    struct Keys {
        importer: Ed25519KeyPair,
        exporter: Ed25519KeyPair,
        importer_bank: Ed25519KeyPair,
        exporter_bank: Ed25519KeyPair,
    }

    fn setup(policy: AccessPolicy) -> (AccessGate, Keys) {
        let store: SharedStore = Arc::new(MemoryLedger::new());
        crate::ensure_tables(store.as_ref()).unwrap();
        let registry = ContractRegistry::new(store);
        let keys = Keys {
            importer: Ed25519KeyPair::generate(),
            exporter: Ed25519KeyPair::generate(),
            importer_bank: Ed25519KeyPair::generate(),
            exporter_bank: Ed25519KeyPair::generate(),
        };
        let cert = |kp: &Ed25519KeyPair| kp.public_key().to_hex().into_bytes();
        registry
            .create(
                &ContractId::new("1000").unwrap(),
                &NewContract {
                    importer: Party::new("Importer", cert(&keys.importer)),
                    exporter: Party::new("Exporter", cert(&keys.exporter)),
                    importer_bank: Party::new("ImporterBank", cert(&keys.importer_bank)),
                    exporter_bank: Party::new("ExporterBank", cert(&keys.exporter_bank)),
                },
            )
            .unwrap();
        let gate = AccessGate::new(registry, Arc::new(Ed25519Verifier), policy);
        (gate, keys)
    }

    fn sign(kp: &Ed25519KeyPair) -> CallerProof {
        let payload = br#"["acceptED",["1000"]]"#.to_vec();
        let mut proof = CallerProof::new(Vec::<u8>::new(), payload, b"nonce-1".to_vec());
        proof.signature = kp.sign(&proof.message()).to_hex().into_bytes();
        proof
    }

    fn cid() -> ContractId {
        ContractId::new("1000").unwrap()
    }

    #[test]
    fn role_holder_passes() {
        let (gate, keys) = setup(AccessPolicy::enabled());
        let proof = sign(&keys.importer_bank);
        assert!(gate.is_role(&cid(), Role::ImporterBank, &proof).unwrap());
        assert!(!gate.is_role(&cid(), Role::ExporterBank, &proof).unwrap());
    }

    #[test]
    fn wrong_role_is_denied() {
        let (gate, keys) = setup(AccessPolicy::enabled());
        let err = gate
            .require_role(&cid(), Role::ImporterBank, &sign(&keys.exporter))
            .unwrap_err();
        assert!(matches!(err, TradeError::AccessDenied(_)));
    }

    #[test]
    fn anonymous_caller_is_not_a_participant() {
        let (gate, _) = setup(AccessPolicy::enabled());
        assert!(!gate.is_participant(&cid(), &CallerProof::anonymous()).unwrap());
    }

    #[test]
    fn any_party_is_a_participant() {
        let (gate, keys) = setup(AccessPolicy::enabled());
        assert!(gate.is_participant(&cid(), &sign(&keys.importer)).unwrap());
        assert!(gate.is_participant(&cid(), &sign(&keys.exporter_bank)).unwrap());
        let outsider = Ed25519KeyPair::generate();
        assert!(matches!(
            gate.require_participant(&cid(), &sign(&outsider)),
            Err(TradeError::AccessDenied(_))
        ));
    }

    #[test]
    fn tampered_payload_fails() {
        let (gate, keys) = setup(AccessPolicy::enabled());
        let mut proof = sign(&keys.importer_bank);
        proof.payload = b"[\"rejectED\",[\"1000\"]]".to_vec();
        assert!(!gate.is_role(&cid(), Role::ImporterBank, &proof).unwrap());
    }

    #[test]
    fn malformed_signature_is_upstream_failure() {
        let (gate, _) = setup(AccessPolicy::enabled());
        let proof = CallerProof::new(b"zz".to_vec(), b"p".to_vec(), b"b".to_vec());
        assert!(matches!(
            gate.is_role(&cid(), Role::Importer, &proof),
            Err(TradeError::UpstreamFailure(_))
        ));
        assert!(matches!(
            gate.is_participant(&cid(), &proof),
            Err(TradeError::UpstreamFailure(_))
        ));
    }

    #[test]
    fn missing_contract_is_an_error_when_enabled() {
        let (gate, keys) = setup(AccessPolicy::enabled());
        let other = ContractId::new("9999").unwrap();
        assert!(matches!(
            gate.is_role(&other, Role::Importer, &sign(&keys.importer)),
            Err(TradeError::NotFound { .. })
        ));
    }

    #[test]
    fn disabled_policy_short_circuits() {
        let (gate, _) = setup(AccessPolicy::disabled());
        let other = ContractId::new("9999").unwrap();
        let anon = CallerProof::anonymous();
        assert!(gate.is_role(&other, Role::ImporterBank, &anon).unwrap());
        assert!(gate.is_participant(&other, &anon).unwrap());
        gate.require_role(&cid(), Role::ExporterBank, &anon).unwrap();
    }

    fn gate_with_certificates(certificates: [Vec<u8>; 4]) -> AccessGate {
        let store: SharedStore = Arc::new(MemoryLedger::new());
        crate::ensure_tables(store.as_ref()).unwrap();
        let registry = ContractRegistry::new(store);
        let [importer, exporter, importer_bank, exporter_bank] = certificates;
        registry
            .create(
                &cid(),
                &NewContract {
                    importer: Party::new("Importer", importer),
                    exporter: Party::new("Exporter", exporter),
                    importer_bank: Party::new("ImporterBank", importer_bank),
                    exporter_bank: Party::new("ExporterBank", exporter_bank),
                },
            )
            .unwrap();
        AccessGate::new(registry, Arc::new(Ed25519Verifier), AccessPolicy::enabled())
    }

    #[test]
    fn one_decodable_certificate_is_enough_for_its_holder() {
        let holder = Ed25519KeyPair::generate();
        let gate = gate_with_certificates([
            b"ICert".to_vec(),
            b"ECert".to_vec(),
            b"IBCert".to_vec(),
            holder.public_key().to_hex().into_bytes(),
        ]);
        assert!(gate.is_participant(&cid(), &sign(&holder)).unwrap());
    }

    #[test]
    fn partial_certificate_errors_are_a_mismatch_for_outsiders() {
        let holder = Ed25519KeyPair::generate();
        let gate = gate_with_certificates([
            b"ICert".to_vec(),
            holder.public_key().to_hex().into_bytes(),
            b"IBCert".to_vec(),
            b"EBCert".to_vec(),
        ]);
        let outsider = Ed25519KeyPair::generate();
        assert!(!gate.is_participant(&cid(), &sign(&outsider)).unwrap());
        assert!(matches!(
            gate.require_participant(&cid(), &sign(&outsider)),
            Err(TradeError::AccessDenied(_))
        ));
    }

    #[test]
    fn call_payload_hashes_each_argument() {
        let payload = call_payload("acceptED", &[b"1000".to_vec()]).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(json["function"], "acceptED");
        assert_eq!(json["args"][0], sha256_hex(b"1000"));
        assert_ne!(
            payload,
            call_payload("rejectED", &[b"1000".to_vec()]).unwrap()
        );
    }

    #[test]
    fn payload_must_match_the_call() {
        let (gate, keys) = setup(AccessPolicy::enabled());
        let args = vec![b"1000".to_vec()];
        let mut proof = CallerProof::new(
            Vec::<u8>::new(),
            call_payload("getEDStatus", &args).unwrap(),
            b"nonce-2".to_vec(),
        );
        proof.signature = keys.importer_bank.sign(&proof.message()).to_hex().into_bytes();

        gate.check_payload("getEDStatus", &args, &proof).unwrap();
        assert!(matches!(
            gate.check_payload("rejectED", &args, &proof),
            Err(TradeError::AccessDenied(_))
        ));
        assert!(matches!(
            gate.check_payload("getEDStatus", &[b"1001".to_vec()], &proof),
            Err(TradeError::AccessDenied(_))
        ));
    }

    #[test]
    fn payload_check_skips_unsigned_and_disabled() {
        let (enabled, _) = setup(AccessPolicy::enabled());
        enabled
            .check_payload("initTrade", &[], &CallerProof::anonymous())
            .unwrap();
        let (disabled, keys) = setup(AccessPolicy::disabled());
        disabled
            .check_payload("rejectED", &[b"1000".to_vec()], &sign(&keys.importer_bank))
            .unwrap();
    }

    #[test]
    fn policy_defaults_to_enabled() {
        assert!(AccessPolicy::default().is_enabled());
        assert!(!AccessPolicy::disabled().is_enabled());
    }

    #[test]
    fn debug_hides_signature_bytes() {
        let proof = CallerProof::new(b"secret-signature".to_vec(), b"p".to_vec(), b"b".to_vec());
        let dbg = format!("{proof:?}");
        assert!(!dbg.contains("secret-signature"));
    }
}
