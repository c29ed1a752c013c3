//! hdkeyring Core
//!
//! Primitives for hierarchical deterministic keyrings.
//!
//! # Key Derivation
//!
//! From a single BIP-39 mnemonic:
//! - seed via BIP-39 with an empty passphrase
//! - private keys via SLIP-0010 on Ed25519 or Secp256k1
//! - signatures via Ed25519 or ECDSA over a pre-hashed digest
//!
//! # Secret Handling
//!
//! Seeds are mlocked and zeroized; private keys live in zeroizing buffers
//! for the duration of one operation.

pub mod keys;
pub mod memory;
pub mod path;
pub mod prehash;
pub mod seed;
pub mod slip10;

pub use keys::{verify_signature, Algorithm, KeyError, Keypair};
pub use memory::{LockedSeed, SecretPhrase};
pub use path::{DerivationPath, PathError, Slip10RawIndex, HARDENED_OFFSET};
pub use prehash::PrehashType;
pub use seed::*;
pub use slip10::{derive_path, DerivationError, DerivedKey, Slip10Curve};
