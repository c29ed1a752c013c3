//! Errors returned by keyring entries

use hdkeyring_core::{
    Algorithm, DerivationError, DerivationPath, KeyError, PathError, SeedError, Slip10Curve,
};
use thiserror::Error;

use crate::identity::IdentityId;

#[derive(Error, Debug)]
pub enum KeyringError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid entropy: {0}")]
    InvalidEntropy(String),

    #[error("Unsupported word count: {0}")]
    InvalidWordCount(usize),

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Unknown curve: {0}")]
    UnknownCurve(String),

    #[error("Unknown entry kind: {0}")]
    UnknownEntryKind(String),

    /// Stored data disagrees with the entry's fixed curve. Never produced
    /// from data the entry serialized itself.
    #[error("Identity algorithm {algorithm} does not match curve {curve}")]
    CurveAlgorithmMismatch {
        curve: Slip10Curve,
        algorithm: Algorithm,
    },

    #[error("Identity not found: {0}")]
    IdentityNotFound(IdentityId),

    /// The identity list and the path registry diverged. Always a bug.
    #[error("No derivation path registered for identity {0}")]
    PathNotFound(IdentityId),

    /// The key re-derived at an identity's stored path is not the
    /// identity's key. Only reachable through altered stored data.
    #[error("Derived key does not match identity {0}")]
    KeyMismatch(IdentityId),

    /// A fixed-curve identity is stored at a path other than `m/n'` for its
    /// position `n`.
    #[error("Expected derivation path {expected}, found {found}")]
    NonSequentialPath {
        expected: DerivationPath,
        found: DerivationPath,
    },

    #[error("Identity already exists: {0}")]
    DuplicateIdentity(IdentityId),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Derivation failed: {0}")]
    Derivation(DerivationError),

    #[error("Key error: {0}")]
    Key(KeyError),
}

impl From<SeedError> for KeyringError {
    fn from(e: SeedError) -> Self {
        match e {
            SeedError::InvalidMnemonic(msg) => Self::InvalidMnemonic(msg),
            SeedError::InvalidEntropy(msg) => Self::InvalidEntropy(msg),
            SeedError::InvalidWordCount(count) => Self::InvalidWordCount(count),
        }
    }
}

impl From<DerivationError> for KeyringError {
    fn from(e: DerivationError) -> Self {
        match e {
            DerivationError::UnknownCurve(tag) => Self::UnknownCurve(tag),
            other => Self::Derivation(other),
        }
    }
}

impl From<KeyError> for KeyringError {
    fn from(e: KeyError) -> Self {
        match e {
            KeyError::UnknownAlgorithm(tag) => Self::UnknownAlgorithm(tag),
            other => Self::Key(other),
        }
    }
}
