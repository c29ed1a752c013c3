//! SLIP-0010 hierarchical deterministic key derivation
//!
//! One derivation routine for both supported curves. Every level is
//! `I = HMAC-SHA512(chain_code, data)` with `I_L` the child key and `I_R`
//! the child chain code.
//!
//! | Curve     | Master HMAC key  | Normal indices | Child key              |
//! |-----------|------------------|----------------|------------------------|
//! | Ed25519   | `"ed25519 seed"` | rejected       | `I_L`                  |
//! | Secp256k1 | `"Bitcoin seed"` | supported      | `I_L + k_par (mod n)`  |
//!
//! For Secp256k1 the derivation is identical to BIP-32 except that an
//! out-of-range `I_L` is retried with `0x01 || I_R || ser32(i)` instead of
//! skipping to the next index.
//!
//! Reference: <https://github.com/satoshilabs/slips/blob/master/slip-0010.md>

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::keys::Algorithm;
use crate::path::{DerivationPath, Slip10RawIndex};

type HmacSha512 = Hmac<Sha512>;

#[derive(Error, Debug)]
pub enum DerivationError {
    #[error("Unknown curve: {0}")]
    UnknownCurve(String),
    #[error("Ed25519 derivation requires hardened indices, got {0}")]
    NonHardenedIndex(Slip10RawIndex),
    #[error("HMAC failure: {0}")]
    Hmac(String),
    #[error("Derivation failed: {0}")]
    DerivationFailed(String),
}

/// Elliptic curve an HD tree is derived on.
///
/// Serialized as the SLIP-0010 master HMAC key, which doubles as the curve
/// tag in persisted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slip10Curve {
    #[serde(rename = "ed25519 seed")]
    Ed25519,
    #[serde(rename = "Bitcoin seed")]
    Secp256k1,
}

impl Slip10Curve {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519 seed",
            Self::Secp256k1 => "Bitcoin seed",
        }
    }

    /// Signature algorithm of keys on this curve
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Ed25519 => Algorithm::Ed25519,
            Self::Secp256k1 => Algorithm::Secp256k1,
        }
    }
}

impl fmt::Display for Slip10Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slip10Curve {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ed25519 seed" => Ok(Self::Ed25519),
            "Bitcoin seed" => Ok(Self::Secp256k1),
            other => Err(DerivationError::UnknownCurve(other.to_string())),
        }
    }
}

/// Result of a derivation: private key and chain code, both zeroized on drop
pub struct DerivedKey {
    pub private_key: Zeroizing<[u8; 32]>,
    pub chain_code: Zeroizing<[u8; 32]>,
}

impl DerivedKey {
    fn from_hmac(i: &[u8; 64]) -> Self {
        let mut private_key = Zeroizing::new([0u8; 32]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        private_key.copy_from_slice(&i[..32]);
        chain_code.copy_from_slice(&i[32..]);
        Self {
            private_key,
            chain_code,
        }
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

/// Derive the key at `path` below the master key of `seed` on `curve`.
///
/// An empty path yields the master key.
pub fn derive_path(
    curve: Slip10Curve,
    seed: &[u8],
    path: &DerivationPath,
) -> Result<DerivedKey, DerivationError> {
    let mut node = master_key(curve, seed)?;
    for index in path.indices() {
        node = child_key(curve, &node, *index)?;
    }
    Ok(node)
}

/// Master key generation: `I = HMAC-SHA512(curve tag, seed)`.
pub fn master_key(curve: Slip10Curve, seed: &[u8]) -> Result<DerivedKey, DerivationError> {
    let key = curve.as_str().as_bytes();
    let mut i = hmac_sha512(key, &[seed])?;

    if curve == Slip10Curve::Secp256k1 {
        // I_L must be a valid scalar; otherwise hash I again
        while SecretKey::from_slice(&i[..32]).is_err() {
            let data = Zeroizing::new(*i);
            i = hmac_sha512(key, &[&data[..]])?;
        }
    }

    Ok(DerivedKey::from_hmac(&i))
}

fn child_key(
    curve: Slip10Curve,
    parent: &DerivedKey,
    index: Slip10RawIndex,
) -> Result<DerivedKey, DerivationError> {
    let ser_index = index.as_number().to_be_bytes();

    match curve {
        Slip10Curve::Ed25519 => {
            if !index.is_hardened() {
                return Err(DerivationError::NonHardenedIndex(index));
            }
            let i = hmac_sha512(
                &parent.chain_code[..],
                &[&[0x00], &parent.private_key[..], &ser_index],
            )?;
            Ok(DerivedKey::from_hmac(&i))
        }
        Slip10Curve::Secp256k1 => secp256k1_child(parent, index, &ser_index),
    }
}

fn secp256k1_child(
    parent: &DerivedKey,
    index: Slip10RawIndex,
    ser_index: &[u8; 4],
) -> Result<DerivedKey, DerivationError> {
    let mut parent_secret = SecretKey::from_slice(&parent.private_key[..])
        .map_err(|e| DerivationError::DerivationFailed(e.to_string()))?;

    let mut i = if index.is_hardened() {
        hmac_sha512(
            &parent.chain_code[..],
            &[&[0x00], &parent.private_key[..], ser_index],
        )?
    } else {
        let secp = Secp256k1::signing_only();
        let parent_public = PublicKey::from_secret_key(&secp, &parent_secret).serialize();
        hmac_sha512(&parent.chain_code[..], &[&parent_public, ser_index])?
    };

    let result = loop {
        let mut il = Zeroizing::new([0u8; 32]);
        il.copy_from_slice(&i[..32]);

        let child = Scalar::from_be_bytes(*il)
            .ok()
            .and_then(|tweak| parent_secret.add_tweak(&tweak).ok());

        match child {
            Some(mut child) => {
                let mut node = DerivedKey::from_hmac(&i);
                node.private_key.copy_from_slice(&child.secret_bytes());
                child.non_secure_erase();
                break node;
            }
            None => {
                // I_L >= n or the child key is zero
                let mut ir = Zeroizing::new([0u8; 32]);
                ir.copy_from_slice(&i[32..]);
                i = hmac_sha512(&parent.chain_code[..], &[&[0x01], &ir[..], ser_index])?;
            }
        }
    };

    parent_secret.non_secure_erase();
    Ok(result)
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; 64]>, DerivationError> {
    let mut mac =
        HmacSha512::new_from_slice(key).map_err(|e| DerivationError::Hmac(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }

    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTOR_1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn derive_hex(curve: Slip10Curve, path: &str) -> (String, String) {
        let seed = hex::decode(VECTOR_1_SEED).unwrap();
        let path: DerivationPath = path.parse().unwrap();
        let key = derive_path(curve, &seed, &path).unwrap();
        (
            hex::encode(&key.private_key[..]),
            hex::encode(&key.chain_code[..]),
        )
    }

    // =========================================================================
    // SLIP-0010 Test vector 1 for ed25519
    // =========================================================================

    #[test]
    fn test_ed25519_vector_master() {
        let (private_key, chain_code) = derive_hex(Slip10Curve::Ed25519, "m");
        assert_eq!(
            private_key,
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );
        assert_eq!(
            chain_code,
            "90046a93de5380a72b5e45010748567d5ea02bbf6522f979e05c0d8d8ca9fffb"
        );
    }

    #[test]
    fn test_ed25519_vector_0h() {
        let (private_key, chain_code) = derive_hex(Slip10Curve::Ed25519, "m/0'");
        assert_eq!(
            private_key,
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );
        assert_eq!(
            chain_code,
            "8b59aa11380b624e81507a27fedda59fea6d0b779a778918a2fd3590e16e9c69"
        );
    }

    #[test]
    fn test_ed25519_vector_0h_1h() {
        let (private_key, chain_code) = derive_hex(Slip10Curve::Ed25519, "m/0'/1'");
        assert_eq!(
            private_key,
            "b1d0bad404bf35da785a64ca1ac54b2617211d2777696fbffaf208f746ae84f2"
        );
        assert_eq!(
            chain_code,
            "a320425f77d1b5c2505a6b1b27382b37368ee640e3557c315416801243552f14"
        );
    }

    #[test]
    fn test_ed25519_rejects_normal_index() {
        let seed = hex::decode(VECTOR_1_SEED).unwrap();
        let path: DerivationPath = "m/0'/1".parse().unwrap();
        let result = derive_path(Slip10Curve::Ed25519, &seed, &path);
        assert!(matches!(result, Err(DerivationError::NonHardenedIndex(_))));
    }

    // =========================================================================
    // SLIP-0010 Test vector 1 for secp256k1 (same as BIP-32 vector 1)
    // =========================================================================

    #[test]
    fn test_secp256k1_vector_master() {
        let (private_key, chain_code) = derive_hex(Slip10Curve::Secp256k1, "m");
        assert_eq!(
            private_key,
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            chain_code,
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
    }

    #[test]
    fn test_secp256k1_vector_0h() {
        let (private_key, chain_code) = derive_hex(Slip10Curve::Secp256k1, "m/0'");
        assert_eq!(
            private_key,
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(
            chain_code,
            "47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141"
        );
    }

    #[test]
    fn test_secp256k1_vector_0h_1() {
        let (private_key, chain_code) = derive_hex(Slip10Curve::Secp256k1, "m/0'/1");
        assert_eq!(
            private_key,
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
        assert_eq!(
            chain_code,
            "2a7857631386ba23dacac34180dd1983734e444fdbf774041578e9b6adb37c19"
        );
    }

    /// Cross-check against the BIP-32 implementation in rust-bitcoin
    #[test]
    fn test_secp256k1_matches_bip32() {
        use bitcoin::bip32::{DerivationPath as Bip32Path, Xpriv};
        use bitcoin::Network;

        let seed = [0x5a_u8; 64];
        let path_str = "m/44'/60'/0'/0/5";

        let master = Xpriv::new_master(Network::Bitcoin, &seed).unwrap();
        let bip32_path: Bip32Path = path_str.parse().unwrap();
        let expected = master
            .derive_priv(&bitcoin::secp256k1::Secp256k1::new(), &bip32_path)
            .unwrap();

        let path: DerivationPath = path_str.parse().unwrap();
        let derived = derive_path(Slip10Curve::Secp256k1, &seed, &path).unwrap();

        assert_eq!(&derived.private_key[..], &expected.private_key.secret_bytes()[..]);
    }

    #[test]
    fn test_curves_diverge() {
        let (ed, _) = derive_hex(Slip10Curve::Ed25519, "m/0'");
        let (secp, _) = derive_hex(Slip10Curve::Secp256k1, "m/0'");
        assert_ne!(ed, secp);
    }

    #[test]
    fn test_curve_tags() {
        assert_eq!(
            "ed25519 seed".parse::<Slip10Curve>().unwrap(),
            Slip10Curve::Ed25519
        );
        assert_eq!(
            "Bitcoin seed".parse::<Slip10Curve>().unwrap(),
            Slip10Curve::Secp256k1
        );
        assert!(matches!(
            "nist256p1 seed".parse::<Slip10Curve>(),
            Err(DerivationError::UnknownCurve(_))
        ));
        assert_eq!(Slip10Curve::Secp256k1.algorithm(), Algorithm::Secp256k1);
    }
}
