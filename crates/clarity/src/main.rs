// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clarity - passphrase-protected local storage for personal planning data.
//!
//! This is the binary entry point. Each data command opens the store, unlocks
//! the vault, does its work and exits; the key never outlives the process.

mod commands;
mod status;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clarity_config::model::{ClarityConfig, LoggingConfig};
use clarity_core::ClarityError;

/// Clarity - encrypted local storage.
#[derive(Parser, Debug)]
#[command(name = "clarity", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show whether a vault exists and what it holds, without unlocking.
    Status {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Create the vault and migrate legacy plaintext values.
    Setup {
        /// Replace an existing vault. Records under the old key become unreadable.
        #[arg(long)]
        force: bool,
    },
    /// Print the decrypted value stored under a name.
    Get { name: String },
    /// Encrypt and store a value under a name.
    Set { name: String, value: String },
    /// Delete the record stored under a name.
    Remove { name: String },
    /// List stored record names.
    Keys,
    /// Re-run the legacy plaintext migration.
    Migrate,
    /// Re-encrypt every record under a new passphrase.
    ChangePassphrase,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => clarity_config::load_and_validate_path(path),
        None => clarity_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            clarity_config::render_errors(&errors);
            return ExitCode::from(2);
        }
    };

    init_tracing(&config.logging);

    match run(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            failure_code(&e)
        }
    }
}

/// Exit 3 for errors the user fixes by retrying with different input, 1 otherwise.
fn failure_code(err: &ClarityError) -> ExitCode {
    if err.is_recoverable() {
        ExitCode::from(3)
    } else {
        ExitCode::FAILURE
    }
}

async fn run(command: Commands, config: &ClarityConfig) -> Result<ExitCode, ClarityError> {
    match command {
        Commands::Status { json } => status::run_status(config, json).await,
        Commands::Setup { force } => commands::setup(config, force).await,
        Commands::Get { name } => commands::get(config, &name).await,
        Commands::Set { name, value } => commands::set(config, &name, &value).await,
        Commands::Remove { name } => commands::remove(config, &name).await,
        Commands::Keys => commands::keys(config).await,
        Commands::Migrate => commands::migrate(config).await,
        Commands::ChangePassphrase => commands::change_passphrase(config).await,
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence over config.
///
/// Logs go to stderr so `clarity get` output stays pipeable.
fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let level = &logging.level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "clarity={level},clarity_vault={level},clarity_storage={level},warn"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_with_global_config() {
        let cli = Cli::try_parse_from(["clarity", "set", "dailyTasks", "[]", "--config", "c.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("c.toml")));
        assert!(matches!(cli.command, Commands::Set { ref name, ref value } if name == "dailyTasks" && value == "[]"));
    }

    #[test]
    fn parses_kebab_case_subcommand() {
        let cli = Cli::try_parse_from(["clarity", "change-passphrase"]).unwrap();
        assert!(matches!(cli.command, Commands::ChangePassphrase));
    }

    #[test]
    fn recoverable_errors_get_their_own_exit_code() {
        assert_eq!(failure_code(&ClarityError::WrongPassphrase), ExitCode::from(3));
        assert_eq!(failure_code(&ClarityError::VaultLocked), ExitCode::FAILURE);
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = clarity_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.logging.level, "info");
    }
}
