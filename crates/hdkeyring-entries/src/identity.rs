//! Public identities and their content-derived ids

use std::fmt;

use hdkeyring_core::Algorithm;
use serde::{Deserialize, Serialize};

/// Content-derived identity key: `algorithm|hex(public key)`.
///
/// The label is not part of the id, so relabelling never moves an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A public key plus its algorithm and an optional human label.
///
/// Immutable: changing the label produces a new value via
/// [`with_label`](Self::with_label).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicIdentity {
    algorithm: Algorithm,
    public_key: Vec<u8>,
    label: Option<String>,
}

impl PublicIdentity {
    pub fn new(algorithm: Algorithm, public_key: Vec<u8>) -> Self {
        Self {
            algorithm,
            public_key,
            label: None,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Copy of this identity carrying `label`
    pub fn with_label(&self, label: Option<String>) -> Self {
        Self {
            algorithm: self.algorithm,
            public_key: self.public_key.clone(),
            label,
        }
    }

    pub fn id(&self) -> IdentityId {
        IdentityId(format!(
            "{}|{}",
            self.algorithm.as_str(),
            hex::encode(&self.public_key)
        ))
    }
}

/// Chain a signature is requested for. Does not influence derivation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format() {
        let identity = PublicIdentity::new(Algorithm::Ed25519, vec![0xab, 0x01]);
        assert_eq!(identity.id().as_str(), "ed25519|ab01");

        let identity = PublicIdentity::new(Algorithm::Secp256k1, vec![0x04]);
        assert_eq!(identity.id().to_string(), "secp256k1|04");
    }

    #[test]
    fn test_id_ignores_label() {
        let identity = PublicIdentity::new(Algorithm::Ed25519, vec![1, 2, 3]);
        let labelled = identity.with_label(Some("savings".into()));
        assert_eq!(identity.id(), labelled.id());
        assert_ne!(identity, labelled);
        assert_eq!(labelled.label(), Some("savings"));
        assert_eq!(identity.label(), None);
    }

    #[test]
    fn test_id_depends_on_algorithm() {
        let a = PublicIdentity::new(Algorithm::Ed25519, vec![9; 32]);
        let b = PublicIdentity::new(Algorithm::Secp256k1, vec![9; 32]);
        assert_ne!(a.id(), b.id());
    }
}
