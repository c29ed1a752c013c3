//! Identity registry shared by the HD entries
//!
//! Holds the ordered identity list and the id → derivation path map side by
//! side so that an identity and its path are always committed together.

use std::collections::HashMap;

use hdkeyring_core::DerivationPath;

use crate::error::KeyringError;
use crate::identity::{IdentityId, PublicIdentity};

#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    identities: Vec<PublicIdentity>,
    paths: HashMap<IdentityId, DerivationPath>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute_id(identity: &PublicIdentity) -> IdentityId {
        identity.id()
    }

    /// Insert or overwrite the path for `id`
    pub fn register(&mut self, id: IdentityId, path: DerivationPath) {
        self.paths.insert(id, path);
    }

    pub fn path_for(&self, id: &IdentityId) -> Result<&DerivationPath, KeyringError> {
        self.paths.get(id).ok_or_else(|| {
            log::error!("identity {} has no registered derivation path", id);
            KeyringError::PathNotFound(id.clone())
        })
    }

    /// Path to sign with for `identity`.
    ///
    /// Unknown identities are `IdentityNotFound`; a listed identity without a
    /// path is `PathNotFound`.
    pub fn signing_path(&self, identity: &PublicIdentity) -> Result<&DerivationPath, KeyringError> {
        let id = identity.id();
        if !self.contains(&id) {
            return Err(KeyringError::IdentityNotFound(id));
        }
        self.path_for(&id)
    }

    /// Append `identity` and register its path in one step
    pub fn insert(
        &mut self,
        identity: PublicIdentity,
        path: DerivationPath,
    ) -> Result<(), KeyringError> {
        let id = identity.id();
        if self.contains(&id) {
            return Err(KeyringError::DuplicateIdentity(id));
        }
        self.register(id, path);
        self.identities.push(identity);
        Ok(())
    }

    /// Replace the identity with the same id by a copy carrying `label`
    pub fn set_label(
        &mut self,
        identity: &PublicIdentity,
        label: Option<String>,
    ) -> Result<PublicIdentity, KeyringError> {
        let id = identity.id();
        let slot = self
            .identities
            .iter_mut()
            .find(|existing| existing.id() == id)
            .ok_or(KeyringError::IdentityNotFound(id))?;

        *slot = slot.with_label(label);
        Ok(slot.clone())
    }

    pub fn contains(&self, id: &IdentityId) -> bool {
        self.identities.iter().any(|identity| &identity.id() == id)
    }

    pub fn identities(&self) -> &[PublicIdentity] {
        &self.identities
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Identities in creation order paired with their paths
    pub fn records(&self) -> Result<Vec<(&PublicIdentity, &DerivationPath)>, KeyringError> {
        self.identities
            .iter()
            .map(|identity| Ok((identity, self.path_for(&identity.id())?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdkeyring_core::Algorithm;

    fn identity(byte: u8) -> PublicIdentity {
        PublicIdentity::new(Algorithm::Ed25519, vec![byte; 32])
    }

    fn path(n: u32) -> DerivationPath {
        DerivationPath::single_hardened(n).unwrap()
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut registry = IdentityRegistry::new();
        registry.insert(identity(1), path(0)).unwrap();
        registry.insert(identity(2), path(1)).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.path_for(&identity(2).id()).unwrap(), &path(1));
        assert_eq!(registry.identities()[0], identity(1));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = IdentityRegistry::new();
        registry.insert(identity(1), path(0)).unwrap();
        let result = registry.insert(identity(1).with_label(Some("x".into())), path(5));
        assert!(matches!(result, Err(KeyringError::DuplicateIdentity(_))));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.path_for(&identity(1).id()).unwrap(), &path(0));
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = IdentityRegistry::new();
        let id = IdentityRegistry::compute_id(&identity(3));
        registry.register(id.clone(), path(0));
        registry.register(id.clone(), path(9));
        assert_eq!(registry.path_for(&id).unwrap(), &path(9));
    }

    #[test]
    fn test_path_not_found() {
        let registry = IdentityRegistry::new();
        let result = registry.path_for(&identity(7).id());
        assert!(matches!(result, Err(KeyringError::PathNotFound(_))));
    }

    #[test]
    fn test_set_label_keeps_slot_and_id() {
        let mut registry = IdentityRegistry::new();
        registry.insert(identity(1), path(0)).unwrap();
        registry.insert(identity(2), path(1)).unwrap();

        let updated = registry
            .set_label(&identity(1), Some("first".into()))
            .unwrap();
        assert_eq!(updated.label(), Some("first"));
        assert_eq!(registry.identities()[0].label(), Some("first"));
        assert_eq!(registry.identities()[0].id(), identity(1).id());
        assert_eq!(registry.len(), 2);

        // Lookup works with a stale (unlabelled) copy
        assert_eq!(registry.path_for(&identity(1).id()).unwrap(), &path(0));
    }

    #[test]
    fn test_set_label_unknown_identity() {
        let mut registry = IdentityRegistry::new();
        let result = registry.set_label(&identity(4), Some("nope".into()));
        assert!(matches!(result, Err(KeyringError::IdentityNotFound(_))));
    }

    #[test]
    fn test_signing_path_distinguishes_errors() {
        let mut registry = IdentityRegistry::new();
        assert!(matches!(
            registry.signing_path(&identity(1)),
            Err(KeyringError::IdentityNotFound(_))
        ));

        // Listed identity without a path: a broken invariant
        registry.identities.push(identity(1));
        assert!(matches!(
            registry.signing_path(&identity(1)),
            Err(KeyringError::PathNotFound(_))
        ));
        assert!(matches!(
            registry.records(),
            Err(KeyringError::PathNotFound(_))
        ));
    }

    #[test]
    fn test_records_in_creation_order() {
        let mut registry = IdentityRegistry::new();
        for n in 0..4u8 {
            registry.insert(identity(n), path(n as u32)).unwrap();
        }
        let records = registry.records().unwrap();
        let raw: Vec<u32> = records.iter().map(|(_, p)| p.to_raw()[0]).collect();
        assert_eq!(raw, vec![0x8000_0000, 0x8000_0001, 0x8000_0002, 0x8000_0003]);
    }
}
