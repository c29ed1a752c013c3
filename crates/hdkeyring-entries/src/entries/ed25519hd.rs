//! Fixed-curve HD entry: Ed25519 keys at sequential hardened indices

use hdkeyring_core::{
    generate_mnemonic, mnemonic_from_entropy, validated_phrase, DerivationPath, PrehashType,
    SecretPhrase, Slip10Curve,
};

use super::{EntryKind, HdState, KeyringEntry};
use crate::envelope::{decode_records, Ed25519HdEnvelope};
use crate::error::KeyringError;
use crate::identity::{ChainId, PublicIdentity};
use crate::registry::IdentityRegistry;

/// Ed25519 keyring entry. The `n`th identity is derived at `m/n'`.
#[derive(Debug)]
pub struct Ed25519HdEntry {
    state: HdState,
}

impl Ed25519HdEntry {
    /// New entry whose mnemonic encodes `entropy` (16 to 32 bytes)
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, KeyringError> {
        let mnemonic = mnemonic_from_entropy(entropy)?;
        Ok(Self::with_secret(SecretPhrase::new(mnemonic.to_string())))
    }

    pub fn from_mnemonic(phrase: &str) -> Result<Self, KeyringError> {
        Ok(Self::with_secret(validated_phrase(phrase)?))
    }

    /// New entry with a fresh mnemonic of `word_count` words
    pub fn generate(word_count: usize) -> Result<Self, KeyringError> {
        let mnemonic = generate_mnemonic(word_count)?;
        Ok(Self::with_secret(SecretPhrase::new(mnemonic.to_string())))
    }

    /// Rebuild an entry from [`serialize`](Self::serialize) output.
    ///
    /// Identities are restored as stored; keys are re-derived on demand.
    /// The `n`th stored identity must sit at `m/n'` so that the next
    /// [`create_identity`](Self::create_identity) lands on a free path.
    pub fn from_serialized(json: &str) -> Result<Self, KeyringError> {
        let envelope: Ed25519HdEnvelope = serde_json::from_str(json)?;
        let secret = validated_phrase(&envelope.secret)?;
        let registry = decode_records(&envelope.identities, |_| Ok(()))?;
        check_sequential(&registry)?;
        log::debug!(
            "restored {} entry with {} identities",
            EntryKind::Ed25519Hd,
            registry.len()
        );
        Ok(Self {
            state: HdState::new(secret, registry),
        })
    }

    fn with_secret(secret: SecretPhrase) -> Self {
        Self {
            state: HdState::new(secret, IdentityRegistry::new()),
        }
    }

    /// Derive the next identity at `m/count'`
    pub fn create_identity(&self) -> Result<PublicIdentity, KeyringError> {
        self.state.create_with(Slip10Curve::Ed25519, sequential_path)
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

    /// Ed25519 signature over `message` as given. `chain_id` does not affect
    /// which key signs.
    pub fn create_transaction_signature(
        &self,
        identity: &PublicIdentity,
        message: &[u8],
        _chain_id: &ChainId,
    ) -> Result<Vec<u8>, KeyringError> {
        self.state.sign_with(Slip10Curve::Ed25519, identity, message)
    }

    pub fn serialize(&self) -> Result<String, KeyringError> {
        let envelope = Ed25519HdEnvelope {
            secret: self.state.secret().expose().to_string(),
            identities: self.state.records()?,
        };
        Ok(serde_json::to_string(&envelope)?)
    }
}

fn sequential_path(position: usize) -> Result<DerivationPath, KeyringError> {
    let index = u32::try_from(position).unwrap_or(u32::MAX);
    Ok(DerivationPath::single_hardened(index)?)
}

fn check_sequential(registry: &IdentityRegistry) -> Result<(), KeyringError> {
    for (position, (identity, path)) in registry.records()?.into_iter().enumerate() {
        let expected = sequential_path(position)?;
        if *path != expected {
            log::error!(
                "identity {} stored at {}, expected {}",
                identity.id(),
                path,
                expected
            );
            return Err(KeyringError::NonSequentialPath {
                expected,
                found: path.clone(),
            });
        }
    }
    Ok(())
}

impl KeyringEntry for Ed25519HdEntry {
    fn kind(&self) -> EntryKind {
        EntryKind::Ed25519Hd
    }

    fn create_identity(&self) -> Result<PublicIdentity, KeyringError> {
        Ed25519HdEntry::create_identity(self)
    }

    fn set_identity_label(
        &self,
        identity: &PublicIdentity,
        label: Option<String>,
    ) -> Result<(), KeyringError> {
        Ed25519HdEntry::set_identity_label(self, identity, label)
    }

    fn identities(&self) -> Vec<PublicIdentity> {
        Ed25519HdEntry::identities(self)
    }

    /// Only raw signing is available for this entry
    fn create_transaction_signature(
        &self,
        identity: &PublicIdentity,
        transaction: &[u8],
        prehash: PrehashType,
        chain_id: &ChainId,
    ) -> Result<Vec<u8>, KeyringError> {
        if prehash != PrehashType::None {
            return Err(KeyringError::UnsupportedOperation(format!(
                "{} signs raw bytes only, got prehash {:?}",
                EntryKind::Ed25519Hd,
                prehash
            )));
        }
        Ed25519HdEntry::create_transaction_signature(self, identity, transaction, chain_id)
    }

    fn serialize(&self) -> Result<String, KeyringError> {
        Ed25519HdEntry::serialize(self)
    }
}
