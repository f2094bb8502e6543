//! `passvault audit`: display the audit log.
//!
//! Usage:
//!   passvault audit               # show last 50 entries
//!   passvault audit --last 20     # show last 20
//!   passvault audit --since 7d    # entries from last 7 days

use chrono::Utc;

use crate::cli::Cli;
use crate::errors::{PassVaultError, Result};

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    #[cfg(feature = "audit-log")]
    {
        use crate::audit::AuditLog;
        use crate::cli::{output, vault_root};

        let root = vault_root(cli)?;
        let audit = AuditLog::open(&root)
            .ok_or_else(|| PassVaultError::AuditError("failed to open audit database".into()))?;

        let since_dt = since.map(parse_duration).transpose()?;
        let entries = audit.query(last, since_dt)?;

        if entries.is_empty() {
            output::info("No audit entries found.");
            return Ok(());
        }

        print_audit_table(&entries);
        Ok(())
    }

    #[cfg(not(feature = "audit-log"))]
    {
        let _ = (cli, last);
        if let Some(s) = since {
            parse_duration(s)?;
        }
        Err(PassVaultError::AuditError(
            "audit log not compiled — rebuild with `cargo build --features audit-log`".into(),
        ))
    }
}

/// Parse a human-friendly duration string like "7d", "24h", "30m".
fn parse_duration(input: &str) -> Result<chrono::DateTime<Utc>> {
    let input = input.trim();

    let invalid = || {
        PassVaultError::CommandFailed(format!(
            "invalid duration '{input}': use a format like 7d, 24h, or 30m"
        ))
    };

    let (num_str, duration): (&str, fn(i64) -> chrono::Duration) =
        if let Some(s) = input.strip_suffix('d') {
            (s, chrono::Duration::days)
        } else if let Some(s) = input.strip_suffix('h') {
            (s, chrono::Duration::hours)
        } else if let Some(s) = input.strip_suffix('m') {
            (s, chrono::Duration::minutes)
        } else {
            return Err(invalid());
        };

    let num: i64 = num_str.parse().map_err(|_| invalid())?;
    if num < 0 {
        return Err(invalid());
    }

    Ok(Utc::now() - duration(num))
}

/// Print audit entries in a formatted table.
#[cfg(feature = "audit-log")]
pub fn print_audit_table(entries: &[crate::audit::AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Name", "Details"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            entry.name.as_deref().unwrap_or("-").to_string(),
            entry.details.as_deref().unwrap_or("-").to_string(),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize operation names for display.
#[cfg_attr(not(feature = "audit-log"), allow(dead_code))]
fn colorize_operation(op: &str) -> String {
    use console::style;

    match op {
        "init" | "clone" => style(op).green().to_string(),
        "insert" | "insert-file" | "edit" | "rename" => style(op).blue().to_string(),
        "remove" | "remove-file" => style(op).red().to_string(),
        "passwd" | "integrity-reset" => style(op).yellow().to_string(),
        "pull" | "push" | "remote" => style(op).cyan().to_string(),
        "show" => style(op).magenta().to_string(),
        _ => op.to_string(),
    }
}
