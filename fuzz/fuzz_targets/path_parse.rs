#![no_main]

use hdkeyring_core::path::DerivationPath;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsed paths must print back to a string that parses to the same path.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(path) = s.parse::<DerivationPath>() {
            let reparsed: DerivationPath = path.to_string().parse().unwrap();
            assert_eq!(path, reparsed);
        }
    }
});
