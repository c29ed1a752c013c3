//! Serialization envelopes
//!
//! JSON snapshots that capture everything needed to rebuild an entry.
//!
//! Fixed-curve entry:
//! ```json
//! {
//!   "secret": "<mnemonic>",
//!   "identities": [
//!     { "identity": { "algo": "ed25519", "data": "<hex>", "label": "main" },
//!       "path": [2147483648] }
//!   ]
//! }
//! ```
//!
//! The configurable-curve entry adds `"curve"` (`"ed25519 seed"` or
//! `"Bitcoin seed"`) and an optional entry `"label"`.
//!
//! Path indices are raw numbers with the hardened bit set. Absent labels
//! are omitted. The secret is stored in clear text; encrypting the envelope
//! is up to whoever persists it.

use hdkeyring_core::{Algorithm, DerivationPath};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::KeyringError;
use crate::identity::PublicIdentity;
use crate::registry::IdentityRegistry;

/// Public half of a stored identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityData {
    pub algo: String,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One identity and the path its key is derived at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub identity: IdentityData,
    pub path: Vec<u32>,
}

impl IdentityRecord {
    pub fn encode(identity: &PublicIdentity, path: &DerivationPath) -> Self {
        Self {
            identity: IdentityData {
                algo: identity.algorithm().as_str().to_string(),
                data: hex::encode(identity.public_key()),
                label: identity.label().map(str::to_string),
            },
            path: path.to_raw(),
        }
    }

    /// Parse the record back into an identity and its path.
    ///
    /// Fails on algorithm tags outside `{ed25519, secp256k1}` and bad hex.
    pub fn decode(&self) -> Result<(PublicIdentity, DerivationPath), KeyringError> {
        let algorithm: Algorithm = self.identity.algo.parse()?;
        let public_key = hex::decode(&self.identity.data)?;
        let identity =
            PublicIdentity::new(algorithm, public_key).with_label(self.identity.label.clone());
        Ok((identity, DerivationPath::from_raw(&self.path)))
    }
}

/// Envelope of the fixed-curve (Ed25519) entry
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Ed25519HdEnvelope {
    pub secret: String,
    #[zeroize(skip)]
    pub identities: Vec<IdentityRecord>,
}

/// Envelope of the configurable-curve entry
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Slip10Envelope {
    pub secret: String,
    #[zeroize(skip)]
    pub curve: String,
    #[zeroize(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[zeroize(skip)]
    pub identities: Vec<IdentityRecord>,
}

/// Encode every identity of `registry` in creation order
pub fn encode_records(registry: &IdentityRegistry) -> Result<Vec<IdentityRecord>, KeyringError> {
    Ok(registry
        .records()?
        .into_iter()
        .map(|(identity, path)| IdentityRecord::encode(identity, path))
        .collect())
}

/// Rebuild a registry from records, running `check` on every identity
pub fn decode_records<F>(
    records: &[IdentityRecord],
    mut check: F,
) -> Result<IdentityRegistry, KeyringError>
where
    F: FnMut(&PublicIdentity) -> Result<(), KeyringError>,
{
    let mut registry = IdentityRegistry::new();
    for record in records {
        let (identity, path) = record.decode()?;
        check(&identity)?;
        registry.insert(identity, path)?;
    }
    Ok(registry)
}
