//! Keyring entries
//!
//! An entry owns one mnemonic and the identities derived from it. Two
//! variants exist:
//!
//! - [`Ed25519HdEntry`]: Ed25519 only, identity `n` lives at `m/n'`
//! - [`Slip10Entry`]: Ed25519 or Secp256k1, caller-chosen paths
//!
//! Both implement [`KeyringEntry`] so a keyring can hold them side by side
//! and restore them from an [`EntryKind`] tag plus the serialized envelope.

mod ed25519hd;
mod slip10;

pub use ed25519hd::Ed25519HdEntry;
pub use slip10::Slip10Entry;

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hdkeyring_core::{
    derive_path, seed_from_phrase, DerivationPath, Keypair, PrehashType, SecretPhrase,
    Slip10Curve,
};
use serde::{Deserialize, Serialize};

use crate::envelope::{self, IdentityRecord};
use crate::error::KeyringError;
use crate::identity::{ChainId, PublicIdentity};
use crate::registry::IdentityRegistry;

/// Behaviour shared by every entry variant
pub trait KeyringEntry: Send + Sync + fmt::Debug {
    fn kind(&self) -> EntryKind;

    /// Whether this entry holds private keys
    fn can_sign(&self) -> bool {
        true
    }

    /// Derive and store the next identity
    fn create_identity(&self) -> Result<PublicIdentity, KeyringError>;

    fn set_identity_label(
        &self,
        identity: &PublicIdentity,
        label: Option<String>,
    ) -> Result<(), KeyringError>;

    /// Snapshot of the identities in creation order
    fn identities(&self) -> Vec<PublicIdentity>;

    /// Sign `transaction` with the key behind `identity`
    fn create_transaction_signature(
        &self,
        identity: &PublicIdentity,
        transaction: &[u8],
        prehash: PrehashType,
        chain_id: &ChainId,
    ) -> Result<Vec<u8>, KeyringError>;

    /// JSON envelope for [`deserialize_entry`]
    fn serialize(&self) -> Result<String, KeyringError>;
}

/// Type tag stored next to a serialized entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Ed25519Hd,
    Slip10Ed25519,
    Slip10Secp256k1,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519Hd => "ed25519-hd",
            Self::Slip10Ed25519 => "slip10-ed25519",
            Self::Slip10Secp256k1 => "slip10-secp256k1",
        }
    }

    /// Curve of a configurable-curve kind
    pub fn slip10_curve(&self) -> Option<Slip10Curve> {
        match self {
            Self::Ed25519Hd => None,
            Self::Slip10Ed25519 => Some(Slip10Curve::Ed25519),
            Self::Slip10Secp256k1 => Some(Slip10Curve::Secp256k1),
        }
    }

    pub fn for_slip10_curve(curve: Slip10Curve) -> Self {
        match curve {
            Slip10Curve::Ed25519 => Self::Slip10Ed25519,
            Slip10Curve::Secp256k1 => Self::Slip10Secp256k1,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = KeyringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ed25519-hd" => Ok(Self::Ed25519Hd),
            "slip10-ed25519" => Ok(Self::Slip10Ed25519),
            "slip10-secp256k1" => Ok(Self::Slip10Secp256k1),
            other => Err(KeyringError::UnknownEntryKind(other.to_string())),
        }
    }
}

/// Restore an entry from its kind tag and serialized envelope.
///
/// For the configurable-curve kinds the envelope's curve must agree with the
/// tag.
pub fn deserialize_entry(
    kind: EntryKind,
    json: &str,
) -> Result<Box<dyn KeyringEntry>, KeyringError> {
    match kind.slip10_curve() {
        None => Ok(Box::new(Ed25519HdEntry::from_serialized(json)?)),
        Some(expected) => {
            let entry = Slip10Entry::from_serialized(json)?;
            if entry.curve() != expected {
                log::error!(
                    "entry tagged {} holds a {} envelope",
                    kind,
                    entry.curve()
                );
                return Err(KeyringError::CurveAlgorithmMismatch {
                    curve: entry.curve(),
                    algorithm: expected.algorithm(),
                });
            }
            Ok(Box::new(entry))
        }
    }
}

/// Secret plus identity registry, shared by both entry variants.
///
/// Creation is serialized by `create_lock`: the identity count is read, the
/// key derived and the result committed before the next creation starts.
/// Registry writes happen only after derivation succeeds.
pub(crate) struct HdState {
    secret: SecretPhrase,
    registry: RwLock<IdentityRegistry>,
    create_lock: Mutex<()>,
}

impl HdState {
    pub(crate) fn new(secret: SecretPhrase, registry: IdentityRegistry) -> Self {
        Self {
            secret,
            registry: RwLock::new(registry),
            create_lock: Mutex::new(()),
        }
    }

    pub(crate) fn secret(&self) -> &SecretPhrase {
        &self.secret
    }

    fn read(&self) -> RwLockReadGuard<'_, IdentityRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IdentityRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn derive_keypair(
        &self,
        curve: Slip10Curve,
        path: &DerivationPath,
    ) -> Result<Keypair, KeyringError> {
        let seed = seed_from_phrase(&self.secret)?;
        let derived = derive_path(curve, seed.as_bytes(), path)?;
        Ok(Keypair::from_private_key(curve, &derived.private_key)?)
    }

    /// Derive on `curve` at the path chosen by `next_path` (given the current
    /// identity count) and commit the identity with its path.
    pub(crate) fn create_with<F>(
        &self,
        curve: Slip10Curve,
        next_path: F,
    ) -> Result<PublicIdentity, KeyringError>
    where
        F: FnOnce(usize) -> Result<DerivationPath, KeyringError>,
    {
        let _guard = self.create_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let count = self.read().len();
        let path = next_path(count)?;
        let keypair = self.derive_keypair(curve, &path)?;
        let identity = PublicIdentity::new(keypair.algorithm(), keypair.public_key_bytes());

        self.write().insert(identity.clone(), path.clone())?;
        log::debug!("created identity {} at {}", identity.id(), path);
        Ok(identity)
    }

    /// Re-derive the key of `identity` on `curve` and sign `message`.
    ///
    /// Fails with `KeyMismatch` rather than signing when the derived key is
    /// not the identity's own.
    pub(crate) fn sign_with(
        &self,
        curve: Slip10Curve,
        identity: &PublicIdentity,
        message: &[u8],
    ) -> Result<Vec<u8>, KeyringError> {
        let path = self.read().signing_path(identity)?.clone();
        let keypair = self.derive_keypair(curve, &path)?;
        if keypair.algorithm() != identity.algorithm()
            || keypair.public_key_bytes() != identity.public_key()
        {
            log::error!(
                "key derived at {} does not match identity {}",
                path,
                identity.id()
            );
            return Err(KeyringError::KeyMismatch(identity.id()));
        }
        Ok(keypair.sign(message)?)
    }

    pub(crate) fn set_identity_label(
        &self,
        identity: &PublicIdentity,
        label: Option<String>,
    ) -> Result<(), KeyringError> {
        self.write().set_label(identity, label)?;
        Ok(())
    }

    pub(crate) fn identities(&self) -> Vec<PublicIdentity> {
        self.read().identities().to_vec()
    }

    pub(crate) fn records(&self) -> Result<Vec<IdentityRecord>, KeyringError> {
        envelope::encode_records(&self.read())
    }

    /// Independent copy: same secret, registry snapshot, fresh locks
    pub(crate) fn snapshot(&self) -> Self {
        Self::new(self.secret.clone(), self.read().clone())
    }
}

impl fmt::Debug for HdState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HdState")
            .field("secret", &self.secret)
            .field("identities", &self.read().len())
            .finish()
    }
}
