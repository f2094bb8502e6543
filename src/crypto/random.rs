//! Access to the operating system's random source.
//!
//! Every consumer of randomness (key generation, nonces, salts, blob
//! tokens) goes through `fill_random`, so an unavailable source surfaces
//! as `RandomSourceUnavailable` instead of a panic or a weak fallback.

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::errors::{PassVaultError, Result};

/// Fill `buf` with bytes from the OS CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| PassVaultError::RandomSourceUnavailable(e.to_string()))
}

/// Return `N` fresh random bytes.
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut out = [0u8; N];
    fill_random(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_differ_between_calls() {
        let a: [u8; 32] = random_bytes().unwrap();
        let b: [u8; 32] = random_bytes().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fill_random_accepts_empty_buffer() {
        let mut empty: [u8; 0] = [];
        assert!(fill_random(&mut empty).is_ok());
    }
}
