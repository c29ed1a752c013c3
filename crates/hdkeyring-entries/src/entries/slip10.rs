//! Configurable-curve HD entry
//!
//! The curve is fixed at construction. Identities are derived at paths the
//! caller supplies, and signing always runs the message through a
//! [`PrehashType`] first.

use hdkeyring_core::{
    generate_mnemonic, mnemonic_from_entropy, validated_phrase, DerivationPath, PrehashType,
    SecretPhrase, Slip10Curve,
};

use super::{EntryKind, HdState, KeyringEntry};
use crate::envelope::{decode_records, Slip10Envelope};
use crate::error::KeyringError;
use crate::identity::{ChainId, PublicIdentity};
use crate::registry::IdentityRegistry;
use crate::value::ValueCell;

/// SLIP-0010 keyring entry on a single curve
#[derive(Debug)]
pub struct Slip10Entry {
    curve: Slip10Curve,
    label: ValueCell<Option<String>>,
    state: HdState,
}

impl Slip10Entry {
    pub fn from_entropy_with_curve(curve: Slip10Curve, entropy: &[u8]) -> Result<Self, KeyringError> {
        let mnemonic = mnemonic_from_entropy(entropy)?;
        Ok(Self::with_secret(curve, SecretPhrase::new(mnemonic.to_string())))
    }

    pub fn from_mnemonic_with_curve(curve: Slip10Curve, phrase: &str) -> Result<Self, KeyringError> {
        Ok(Self::with_secret(curve, validated_phrase(phrase)?))
    }

    pub fn generate_with_curve(curve: Slip10Curve, word_count: usize) -> Result<Self, KeyringError> {
        let mnemonic = generate_mnemonic(word_count)?;
        Ok(Self::with_secret(curve, SecretPhrase::new(mnemonic.to_string())))
    }

    /// Rebuild an entry from [`serialize`](Self::serialize) output.
    ///
    /// Every stored identity must use the algorithm of the stored curve.
    pub fn from_serialized(json: &str) -> Result<Self, KeyringError> {
        let envelope: Slip10Envelope = serde_json::from_str(json)?;
        let curve: Slip10Curve = envelope.curve.parse()?;
        let secret = validated_phrase(&envelope.secret)?;

        let registry = decode_records(&envelope.identities, |identity| {
            if identity.algorithm() != curve.algorithm() {
                log::error!(
                    "identity {} does not belong on curve {}",
                    identity.id(),
                    curve
                );
                return Err(KeyringError::CurveAlgorithmMismatch {
                    curve,
                    algorithm: identity.algorithm(),
                });
            }
            Ok(())
        })?;

        log::debug!(
            "restored {} entry with {} identities",
            EntryKind::for_slip10_curve(curve),
            registry.len()
        );
        Ok(Self {
            curve,
            label: ValueCell::new(envelope.label.clone()),
            state: HdState::new(secret, registry),
        })
    }

    fn with_secret(curve: Slip10Curve, secret: SecretPhrase) -> Self {
        Self {
            curve,
            label: ValueCell::new(None),
            state: HdState::new(secret, IdentityRegistry::new()),
        }
    }

    pub fn curve(&self) -> Slip10Curve {
        self.curve
    }

    /// Observable entry label
    pub fn label(&self) -> &ValueCell<Option<String>> {
        &self.label
    }

    /// Replace the entry label and notify subscribers
    pub fn set_label(&self, label: Option<String>) {
        self.label.update(label);
    }

    /// Derive the identity at `path` on the entry curve.
    ///
    /// Ed25519 entries accept hardened indices only. Deriving the same path
    /// twice fails with `DuplicateIdentity`.
    pub fn create_identity_with_path(
        &self,
        path: &DerivationPath,
    ) -> Result<PublicIdentity, KeyringError> {
        self.state.create_with(self.curve, |_| Ok(path.clone()))
    }

    pub fn set_identity_label(
        &self,
        identity: &PublicIdentity,
        label: Option<String>,
    ) -> Result<(), KeyringError> {
        self.state.set_identity_label(identity, label)
    }

    pub fn identities(&self) -> Vec<PublicIdentity> {
        self.state.identities()
    }

    /// Sign `prehash(transaction)` with the key behind `identity`.
    ///
    /// Secp256k1 entries need a 32-byte digest, so `PrehashType::Sha256` is
    /// the usual choice there.
    pub fn create_transaction_signature(
        &self,
        identity: &PublicIdentity,
        transaction: &[u8],
        prehash: PrehashType,
        _chain_id: &ChainId,
    ) -> Result<Vec<u8>, KeyringError> {
        let message = prehash.apply(transaction);
        self.state.sign_with(self.curve, identity, &message)
    }

    pub fn serialize(&self) -> Result<String, KeyringError> {
        let envelope = Slip10Envelope {
            secret: self.state.secret().expose().to_string(),
            curve: self.curve.as_str().to_string(),
            label: self.label.value(),
            identities: self.state.records()?,
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    /// Independent copy. Label subscribers are not carried over.
    pub fn clone_entry(&self) -> Self {
        Self {
            curve: self.curve,
            label: ValueCell::new(self.label.value()),
            state: self.state.snapshot(),
        }
    }
}

impl Clone for Slip10Entry {
    fn clone(&self) -> Self {
        self.clone_entry()
    }
}

impl KeyringEntry for Slip10Entry {
    fn kind(&self) -> EntryKind {
        EntryKind::for_slip10_curve(self.curve)
    }

    /// Paths are caller-chosen; use
    /// [`create_identity_with_path`](Slip10Entry::create_identity_with_path)
    fn create_identity(&self) -> Result<PublicIdentity, KeyringError> {
        Err(KeyringError::UnsupportedOperation(format!(
            "{} entries need an explicit derivation path",
            self.kind()
        )))
    }

    fn set_identity_label(
        &self,
        identity: &PublicIdentity,
        label: Option<String>,
    ) -> Result<(), KeyringError> {
        Slip10Entry::set_identity_label(self, identity, label)
    }

    fn identities(&self) -> Vec<PublicIdentity> {
        Slip10Entry::identities(self)
    }

    fn create_transaction_signature(
        &self,
        identity: &PublicIdentity,
        transaction: &[u8],
        prehash: PrehashType,
        chain_id: &ChainId,
    ) -> Result<Vec<u8>, KeyringError> {
        Slip10Entry::create_transaction_signature(self, identity, transaction, prehash, chain_id)
    }

    fn serialize(&self) -> Result<String, KeyringError> {
        Slip10Entry::serialize(self)
    }
}
