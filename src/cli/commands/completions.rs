//! `passvault completions <shell>`: print a completion script covering
//! every subcommand, `insert-file` and `erase-pincode` included.

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::{PassVaultError, Result};

/// Execute the `completions` command.
pub fn execute(shell: &str) -> Result<()> {
    let shell = parse_shell(shell)?;
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "passvault", &mut io::stdout());
    Ok(())
}

fn parse_shell(name: &str) -> Result<Shell> {
    match name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        "powershell" | "ps" => Ok(Shell::PowerShell),
        "elvish" => Ok(Shell::Elvish),
        other => Err(PassVaultError::CommandFailed(format!(
            "unknown shell '{other}'; supported: bash, zsh, fish, powershell, elvish"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_names_are_case_insensitive() {
        assert_eq!(parse_shell("BASH").unwrap(), Shell::Bash);
        assert_eq!(parse_shell("zsh").unwrap(), Shell::Zsh);
        assert_eq!(parse_shell("ps").unwrap(), Shell::PowerShell);
        assert!(parse_shell("csh").is_err());
    }

    #[test]
    fn bash_script_names_vault_subcommands() {
        let mut cmd = Cli::command();
        let mut out = Vec::new();
        generate(Shell::Bash, &mut cmd, "passvault", &mut out);
        let script = String::from_utf8(out).unwrap();
        for sub in ["insert-file", "remove-file", "erase-pincode", "integrity"] {
            assert!(script.contains(sub), "missing {sub}");
        }
    }
}
