//! Random password generation.
//!
//! Generated passwords always contain at least one upper-case letter,
//! one lower-case letter, one digit and one symbol.  Requests shorter
//! than the number of classes are bumped up to `MIN_LEN`.

use super::random::fill_random;
use crate::errors::Result;

/// Length used when the caller does not ask for one.
pub const DEFAULT_LEN: usize = 24;

/// Smallest length that can hold one character of every class.
pub const MIN_LEN: usize = 4;

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.<>/?~";

/// Generate a password of `max(len, MIN_LEN)` characters.
pub fn generate_password(len: usize) -> Result<String> {
    let len = len.max(MIN_LEN);
    let alphabet: Vec<u8> = [UPPER, LOWER, DIGITS, SYMBOLS].concat();

    // Rejection sampling: redraw until every class is represented.
    loop {
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(alphabet[uniform_index(alphabet.len())?]);
        }
        if has_every_class(&out) {
            // The alphabet is pure ASCII.
            return Ok(out.into_iter().map(char::from).collect());
        }
    }
}

fn has_every_class(candidate: &[u8]) -> bool {
    [UPPER, LOWER, DIGITS, SYMBOLS]
        .iter()
        .all(|class| candidate.iter().any(|c| class.contains(c)))
}

/// Uniform index in `0..bound` without modulo bias.
fn uniform_index(bound: usize) -> Result<usize> {
    debug_assert!(bound > 0 && bound <= 256);
    let limit = 256 - (256 % bound);
    loop {
        let mut byte = [0u8; 1];
        fill_random(&mut byte)?;
        let value = usize::from(byte[0]);
        if value < limit {
            return Ok(value % bound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_length_is_respected() {
        let pw = generate_password(DEFAULT_LEN).unwrap();
        assert_eq!(pw.len(), DEFAULT_LEN);
    }

    #[test]
    fn short_request_is_bumped_to_min_len() {
        let pw = generate_password(1).unwrap();
        assert_eq!(pw.len(), MIN_LEN);
        assert!(has_every_class(pw.as_bytes()));
    }

    #[test]
    fn every_class_is_present() {
        for _ in 0..20 {
            let pw = generate_password(8).unwrap();
            assert!(pw.bytes().any(|b| b.is_ascii_uppercase()));
            assert!(pw.bytes().any(|b| b.is_ascii_lowercase()));
            assert!(pw.bytes().any(|b| b.is_ascii_digit()));
            assert!(pw.bytes().any(|b| SYMBOLS.contains(&b)));
        }
    }

    #[test]
    fn uniform_index_stays_in_bounds() {
        for _ in 0..200 {
            assert!(uniform_index(62).unwrap() < 62);
        }
    }
}
