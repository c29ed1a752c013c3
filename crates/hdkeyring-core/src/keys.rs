//! Keypairs and signatures for derived keys
//!
//! A [`Keypair`] is built from a SLIP-0010 private key on one curve and lives
//! only for a single operation. Secret scalars are wiped when it is dropped.
//!
//! | Algorithm | Public key             | Signature                         |
//! |-----------|------------------------|-----------------------------------|
//! | Ed25519   | 32 bytes               | 64 bytes over the message         |
//! | Secp256k1 | 65 bytes, uncompressed | 64 bytes compact ECDSA, low-S, over a 32-byte digest |

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use secp256k1::{ecdsa, Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::slip10::Slip10Curve;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
    #[error("Secp256k1 signs a 32-byte digest, got {0} bytes")]
    InvalidDigestLength(usize),
}

/// Signature algorithm of an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Ed25519,
    Secp256k1,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
            Self::Secp256k1 => "secp256k1",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ed25519" => Ok(Self::Ed25519),
            "secp256k1" => Ok(Self::Secp256k1),
            other => Err(KeyError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// A signing keypair on one curve.
///
/// Deliberately not `Clone` and not serializable; build one, use it, drop it.
pub enum Keypair {
    Ed25519(SigningKey),
    Secp256k1(SecretKey),
}

impl Keypair {
    /// Build a keypair from a 32-byte private key on `curve`
    pub fn from_private_key(curve: Slip10Curve, private_key: &[u8; 32]) -> Result<Self, KeyError> {
        match curve {
            Slip10Curve::Ed25519 => Ok(Self::Ed25519(SigningKey::from_bytes(private_key))),
            Slip10Curve::Secp256k1 => SecretKey::from_slice(private_key)
                .map(Self::Secp256k1)
                .map_err(|e| KeyError::InvalidPrivateKey(e.to_string())),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Ed25519(_) => Algorithm::Ed25519,
            Self::Secp256k1(_) => Algorithm::Secp256k1,
        }
    }

    /// Public key bytes in the form identities carry
    pub fn public_key_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(signing_key) => signing_key.verifying_key().to_bytes().to_vec(),
            Self::Secp256k1(secret_key) => {
                let secp = Secp256k1::signing_only();
                PublicKey::from_secret_key(&secp, secret_key)
                    .serialize_uncompressed()
                    .to_vec()
            }
        }
    }

    /// Sign `message`.
    ///
    /// Ed25519 signs the bytes as given. Secp256k1 requires `message` to be
    /// a 32-byte digest and produces a compact, low-S ECDSA signature.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        match self {
            Self::Ed25519(signing_key) => Ok(signing_key.sign(message).to_bytes().to_vec()),
            Self::Secp256k1(secret_key) => {
                let digest = Message::from_digest_slice(message)
                    .map_err(|_| KeyError::InvalidDigestLength(message.len()))?;
                let secp = Secp256k1::signing_only();
                let signature = secp.sign_ecdsa(&digest, secret_key);
                Ok(signature.serialize_compact().to_vec())
            }
        }
    }
}

impl Drop for Keypair {
    fn drop(&mut self) {
        // SigningKey zeroizes itself; SecretKey needs an explicit wipe
        if let Self::Secp256k1(secret_key) = self {
            secret_key.non_secure_erase();
        }
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({}, <redacted>)", self.algorithm())
    }
}

/// Verify `signature` over `message` for a public key of `algorithm`.
///
/// Returns `false` for malformed keys or signatures rather than erroring.
pub fn verify_signature(
    algorithm: Algorithm,
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> bool {
    match algorithm {
        Algorithm::Ed25519 => {
            let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
                return false;
            };
            let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
                return false;
            };
            let Ok(signature) = ed25519_dalek::Signature::from_slice(signature) else {
                return false;
            };
            verifying_key.verify(message, &signature).is_ok()
        }
        Algorithm::Secp256k1 => {
            let secp = Secp256k1::verification_only();
            let (Ok(public_key), Ok(signature), Ok(digest)) = (
                PublicKey::from_slice(public_key),
                ecdsa::Signature::from_compact(signature),
                Message::from_digest_slice(message),
            ) else {
                return false;
            };
            secp.verify_ecdsa(&digest, &signature, &public_key).is_ok()
        }
    }
}
