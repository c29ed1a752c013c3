//! Pre-hash transforms applied to transaction bytes before signing

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

/// Hash applied to signable bytes before they reach the signer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrehashType {
    /// Sign the bytes as given
    #[default]
    None,
    Sha256,
    Sha512,
}

impl PrehashType {
    pub fn apply(&self, bytes: &[u8]) -> Vec<u8> {
        match self {
            Self::None => bytes.to_vec(),
            Self::Sha256 => Sha256::digest(bytes).to_vec(),
            Self::Sha512 => Sha512::digest(bytes).to_vec(),
        }
    }
}
