use clap::Parser;
use passvault::cli::commands;
use passvault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Log filter variable; falls back to `RUST_LOG`, then `warn`.
const LOG_ENV: &str = "PASSVAULT_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        None | Some(Commands::List) => commands::list::execute(&cli),
        Some(Commands::Init) => commands::init::execute(&cli),
        Some(Commands::Find { ref query }) => commands::find::execute(&cli, query.as_deref()),
        Some(Commands::Show {
            ref name,
            copy,
            ref output,
        }) => commands::show::execute(&cli, name, copy, output.as_deref()),
        Some(Commands::Insert {
            ref name,
            ref value,
            force,
        }) => commands::insert::execute(&cli, name, value.as_deref(), force),
        Some(Commands::InsertFile {
            ref name,
            ref path,
            force,
        }) => commands::insert_file::execute(&cli, name, path, force),
        Some(Commands::Edit {
            ref name,
            ref value,
        }) => commands::edit::execute(&cli, name, value.as_deref()),
        Some(Commands::Rename { ref old, ref new }) => commands::rename::execute(&cli, old, new),
        Some(Commands::Remove { ref name, force }) => {
            commands::remove::execute(&cli, name, force)
        }
        Some(Commands::RemoveFile { ref name, force }) => {
            commands::remove::execute_file(&cli, name, force)
        }
        Some(Commands::Generate { length }) => commands::generate::execute(length),
        Some(Commands::Integrity { reset }) => commands::integrity::execute(&cli, reset),
        Some(Commands::Pull) => commands::sync_cmd::execute_pull(&cli),
        Some(Commands::Push) => commands::sync_cmd::execute_push(&cli),
        Some(Commands::Remote { ref url }) => commands::sync_cmd::execute_remote(&cli, url),
        Some(Commands::Clone { ref url }) => commands::sync_cmd::execute_clone(&cli, url),
        Some(Commands::Passwd) => commands::passwd::execute(&cli),
        Some(Commands::ErasePincode) => commands::erase_pincode::execute(&cli),
        Some(Commands::Keyring { delete }) => commands::keyring_cmd::execute(&cli, delete),
        Some(Commands::Version) => commands::version::execute(),
        Some(Commands::Completions { ref shell }) => commands::completions::execute(shell),
        Some(Commands::Audit { last, ref since }) => {
            commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        passvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
