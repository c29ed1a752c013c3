#![no_main]

use hdkeyring_entries::{deserialize_entry, EntryKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Restoring an entry from arbitrary bytes must return Ok or Err, never panic.
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    for kind in [
        EntryKind::Ed25519Hd,
        EntryKind::Slip10Ed25519,
        EntryKind::Slip10Secp256k1,
    ] {
        if let Ok(entry) = deserialize_entry(kind, json) {
            // Whatever restores must serialize and restore again
            let again = entry.serialize().unwrap();
            let restored = deserialize_entry(kind, &again).unwrap();
            assert_eq!(restored.identities(), entry.identities());
        }
    }
});
