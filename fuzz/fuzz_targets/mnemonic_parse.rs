#![no_main]

use hdkeyring_core::seed::{parse_mnemonic, validated_phrase};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary UTF-8 as a BIP-39 mnemonic must yield Ok or Err, never a panic.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_mnemonic(s);

        // A phrase that validates once must validate again after normalization
        if let Ok(phrase) = validated_phrase(s) {
            assert!(validated_phrase(phrase.expose()).is_ok());
        }
    }
});
