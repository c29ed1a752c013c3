//! Memory protection for secret material
//!
//! Two wrappers keep secrets out of logs, swap and freed memory:
//!
//! 1. [`LockedSeed`]: a 64-byte BIP-39 seed held on the heap, locked via
//!    `mlock()` so the OS never swaps it to disk, and zeroized on drop.
//!
//! 2. [`SecretPhrase`]: the mnemonic text, zeroized on drop and redacted
//!    from `Debug` output.
//!
//! Memory locking is best-effort: failures are logged and the operation
//! continues without it.
//!
//! # Platform Support
//!
//! - Unix/macOS/Linux: `mlock`/`munlock` via libc
//! - Other: no locking, zeroization only

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

/// Length of a BIP-39 seed in bytes
pub const SEED_LEN: usize = 64;

/// Lock a memory region to prevent it from being swapped to disk.
///
/// Returns `true` if the memory was successfully locked.
///
/// # Safety
///
/// The caller must ensure that:
/// - `ptr` points to a valid allocation of at least `len` bytes
/// - The locked region is unlocked (via `munlock`) before being freed,
///   or the process exits (which implicitly unlocks all pages)
pub unsafe fn mlock(ptr: *const u8, len: usize) -> bool {
    if len == 0 {
        return true;
    }

    #[cfg(unix)]
    {
        unix::mlock_impl(ptr, len)
    }

    #[cfg(not(unix))]
    {
        let _ = (ptr, len);
        false
    }
}

/// Unlock a previously locked memory region.
///
/// # Safety
///
/// The caller must ensure `ptr` and `len` match a previous `mlock` call.
pub unsafe fn munlock(ptr: *const u8, len: usize) -> bool {
    if len == 0 {
        return true;
    }

    #[cfg(unix)]
    {
        unix::munlock_impl(ptr, len)
    }

    #[cfg(not(unix))]
    {
        let _ = (ptr, len);
        true
    }
}

/// A BIP-39 seed that is mlocked for its lifetime and zeroized on drop.
///
/// The bytes live in a heap allocation so moving the wrapper never leaves a
/// copy of the seed behind on the stack.
///
/// # Example
/// ```
/// use hdkeyring_core::memory::LockedSeed;
/// let seed = LockedSeed::from_array([7u8; 64]);
/// assert_eq!(seed.as_bytes()[0], 7);
/// ```
pub struct LockedSeed {
    bytes: Box<[u8; SEED_LEN]>,
    locked: bool,
}

impl LockedSeed {
    /// Move `seed` into locked memory. The caller's copy is zeroized.
    pub fn from_array(mut seed: [u8; SEED_LEN]) -> Self {
        let mut bytes = Box::new([0u8; SEED_LEN]);
        let locked = unsafe { mlock(bytes.as_ptr(), SEED_LEN) };

        bytes.copy_from_slice(&seed);
        seed.zeroize();

        Self { bytes, locked }
    }

    /// Borrow the seed bytes.
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.bytes
    }

    /// Whether the memory is actually locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Drop for LockedSeed {
    fn drop(&mut self) {
        // Zeroize before unlocking
        self.bytes.zeroize();

        if self.locked {
            unsafe {
                munlock(self.bytes.as_ptr(), SEED_LEN);
            }
        }
    }
}

impl fmt::Debug for LockedSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedSeed")
            .field("bytes", &"<redacted>")
            .field("locked", &self.locked)
            .finish()
    }
}

/// Mnemonic text that is zeroized on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretPhrase(Zeroizing<String>);

impl SecretPhrase {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self(Zeroizing::new(phrase.into()))
    }

    /// The phrase in clear text. Only for derivation and serialization.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SecretPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretPhrase(<redacted>)")
    }
}

// ---- Platform implementations ----

#[cfg(unix)]
mod unix {
    pub unsafe fn mlock_impl(ptr: *const u8, len: usize) -> bool {
        let result = libc::mlock(ptr as *const libc::c_void, len);
        if result != 0 {
            let errno = std::io::Error::last_os_error();
            log::warn!("mlock failed for {} bytes: {}", len, errno);
            return false;
        }
        true
    }

    pub unsafe fn munlock_impl(ptr: *const u8, len: usize) -> bool {
        let result = libc::munlock(ptr as *const libc::c_void, len);
        result == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_seed_holds_bytes() {
        let mut raw = [0u8; SEED_LEN];
        raw[0] = 0xDE;
        raw[63] = 0xAD;

        let seed = LockedSeed::from_array(raw);
        assert_eq!(seed.as_bytes()[0], 0xDE);
        assert_eq!(seed.as_bytes()[63], 0xAD);

        // mlock may fail in sandboxed environments, so we just check
        // it doesn't crash
        eprintln!("Seed locked: {}", seed.is_locked());
    }

    #[test]
    fn test_locked_seed_zeroizes() {
        let mut seed = LockedSeed::from_array([0xFF; SEED_LEN]);
        assert!(seed.as_bytes().iter().all(|&b| b == 0xFF));

        // Simulate drop behavior
        seed.bytes.zeroize();
        assert!(seed.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_locked_seed_debug_is_redacted() {
        let seed = LockedSeed::from_array([0x42; SEED_LEN]);
        let printed = format!("{:?}", seed);
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("42"));
    }

    #[test]
    fn test_secret_phrase_debug_is_redacted() {
        let phrase = SecretPhrase::new("abandon ability able");
        assert_eq!(format!("{:?}", phrase), "SecretPhrase(<redacted>)");
        assert_eq!(phrase.expose(), "abandon ability able");
    }

    #[test]
    fn test_mlock_munlock_roundtrip() {
        let data = vec![42u8; 128];
        unsafe {
            let locked = mlock(data.as_ptr(), data.len());
            eprintln!("mlock result: {}", locked);

            let unlocked = munlock(data.as_ptr(), data.len());
            eprintln!("munlock result: {}", unlocked);
        }
    }

    #[test]
    fn test_zero_length_lock_is_noop() {
        let data: Vec<u8> = Vec::new();
        unsafe {
            assert!(mlock(data.as_ptr(), 0));
            assert!(munlock(data.as_ptr(), 0));
        }
    }
}
