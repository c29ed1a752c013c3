//! hdkeyring Entries
//!
//! Hierarchical deterministic keyring entries built on `hdkeyring-core`.
//!
//! An entry owns one BIP-39 mnemonic and the public identities derived from
//! it. Private keys are never stored: each signature re-derives the key for
//! the identity's path and drops it afterwards.
//!
//! # Variants
//!
//! - [`Ed25519HdEntry`]: Ed25519 identities at `m/0'`, `m/1'`, ...
//! - [`Slip10Entry`]: Ed25519 or Secp256k1 identities at caller-chosen paths,
//!   with an observable entry label
//!
//! # Persistence
//!
//! `serialize` produces a JSON envelope holding the mnemonic in clear text.
//! Pair it with the [`EntryKind`] tag and restore it with
//! [`deserialize_entry`].

pub mod entries;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod registry;
pub mod value;

pub use entries::{deserialize_entry, Ed25519HdEntry, EntryKind, KeyringEntry, Slip10Entry};
pub use error::KeyringError;
pub use identity::{ChainId, IdentityId, PublicIdentity};
pub use registry::IdentityRegistry;
pub use value::{SubscriptionId, ValueCell};

pub use hdkeyring_core::{Algorithm, DerivationPath, PrehashType, Slip10Curve};
