//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{Entry, EntryMetadata};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entries (Group, Name, Kind, Updated) in store order.
pub fn print_entries_table(entries: &[EntryMetadata]) {
    if entries.is_empty() {
        info("No entries in this vault yet.");
        tip("Run `passvault insert <NAME>` to add your first password.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Group", "Name", "Kind", "Updated"]);

    for e in entries {
        let (group, leaf) = e.name.rsplit_once('/').unwrap_or(("", e.name.as_str()));
        let kind = if e.is_file {
            style("file").cyan().to_string()
        } else {
            "site".to_string()
        };
        table.add_row(vec![
            group.to_string(),
            leaf.to_string(),
            kind,
            e.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print bare entry names, one per line (used by `find`).
pub fn print_names(entries: &[&Entry]) {
    for e in entries {
        if e.is_file {
            println!("{} {}", e.name, style("(file)").dim());
        } else {
            println!("{}", e.name);
        }
    }
}
