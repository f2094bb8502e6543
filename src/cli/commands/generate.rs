//! `passvault generate`: print a random password.

use crate::crypto::generate::{generate_password, DEFAULT_LEN, MIN_LEN};
use crate::cli::output;
use crate::errors::Result;

/// Execute the `generate` command.
pub fn execute(length: Option<usize>) -> Result<()> {
    let requested = length.unwrap_or(DEFAULT_LEN);
    if requested < MIN_LEN {
        output::warning(&format!(
            "Length {requested} is too short; using {MIN_LEN} so every character class fits."
        ));
    }
    println!("{}", generate_password(requested)?);
    Ok(())
}
