//! BIP-39 seed management
//!
//! Handles mnemonic generation, import from entropy or words, and seed
//! derivation. Seeds are returned in locked, zeroizing memory.

use bip39::{Language, Mnemonic};
use thiserror::Error;

use crate::memory::{LockedSeed, SecretPhrase};

/// Word counts accepted by BIP-39
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    #[error("Invalid entropy: {0}")]
    InvalidEntropy(String),
    #[error("Unsupported word count: {0}")]
    InvalidWordCount(usize),
}

/// Generate a new BIP-39 mnemonic from OS randomness
pub fn generate_mnemonic(word_count: usize) -> Result<Mnemonic, SeedError> {
    if !VALID_WORD_COUNTS.contains(&word_count) {
        return Err(SeedError::InvalidWordCount(word_count));
    }
    Mnemonic::generate_in(Language::English, word_count)
        .map_err(|e| SeedError::InvalidMnemonic(e.to_string()))
}

/// Encode raw entropy (16, 20, 24, 28 or 32 bytes) as an English mnemonic
pub fn mnemonic_from_entropy(entropy: &[u8]) -> Result<Mnemonic, SeedError> {
    Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|e| SeedError::InvalidEntropy(e.to_string()))
}

/// Parse a mnemonic from words
pub fn parse_mnemonic(words: &str) -> Result<Mnemonic, SeedError> {
    Mnemonic::parse_in(Language::English, words)
        .map_err(|e| SeedError::InvalidMnemonic(e.to_string()))
}

/// Validate a phrase and wrap it for storage.
///
/// The phrase is normalized to the canonical single-space form so the
/// stored text is byte-identical across round trips.
pub fn validated_phrase(words: &str) -> Result<SecretPhrase, SeedError> {
    let mnemonic = parse_mnemonic(words)?;
    Ok(SecretPhrase::new(mnemonic.to_string()))
}

/// Derive seed bytes from mnemonic (with optional passphrase)
pub fn derive_seed(mnemonic: &Mnemonic, passphrase: &str) -> LockedSeed {
    LockedSeed::from_array(mnemonic.to_seed(passphrase))
}

/// Parse a stored phrase and derive its seed with an empty passphrase
pub fn seed_from_phrase(phrase: &SecretPhrase) -> Result<LockedSeed, SeedError> {
    let mnemonic = parse_mnemonic(phrase.expose())?;
    Ok(derive_seed(&mnemonic, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON_12: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_word_counts() {
        for count in VALID_WORD_COUNTS {
            let mnemonic = generate_mnemonic(count).unwrap();
            assert_eq!(mnemonic.word_count(), count);
        }
    }

    #[test]
    fn test_generate_rejects_bad_word_count() {
        assert!(matches!(
            generate_mnemonic(13),
            Err(SeedError::InvalidWordCount(13))
        ));
    }

    #[test]
    fn test_zero_entropy_is_abandon_about() {
        let mnemonic = mnemonic_from_entropy(&[0u8; 16]).unwrap();
        assert_eq!(mnemonic.to_string(), ABANDON_12);
    }

    #[test]
    fn test_entropy_length_rejected() {
        assert!(matches!(
            mnemonic_from_entropy(&[0u8; 15]),
            Err(SeedError::InvalidEntropy(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_checksum() {
        let result = parse_mnemonic(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon",
        );
        assert!(matches!(result, Err(SeedError::InvalidMnemonic(_))));
    }

    /// BIP-39 reference vector: all-zero entropy, passphrase "TREZOR"
    #[test]
    fn test_bip39_trezor_vector() {
        let mnemonic = parse_mnemonic(ABANDON_12).unwrap();
        let seed = derive_seed(&mnemonic, "TREZOR");
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
    }

    #[test]
    fn test_seed_from_phrase_matches_derive_seed() {
        let phrase = validated_phrase(ABANDON_12).unwrap();
        let a = seed_from_phrase(&phrase).unwrap();
        let b = derive_seed(&parse_mnemonic(ABANDON_12).unwrap(), "");
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_validated_phrase_normalizes_whitespace() {
        let spaced = ABANDON_12.replace(' ', "  ");
        let phrase = validated_phrase(&spaced).unwrap();
        assert_eq!(phrase.expose(), ABANDON_12);
    }
}
