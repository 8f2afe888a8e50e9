//! CLI binary entry point for platine-dump

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use platine_dump::cli::commands::backup::{BackupArgs, handle_backup};
#[cfg(feature = "cli")]
use platine_dump::cli::commands::config::{
    ConfigInitArgs, ConfigShowArgs, handle_config_init, handle_config_show,
};
#[cfg(feature = "cli")]
use platine_dump::cli::commands::restore::{RestoreArgs, handle_restore};
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Environment variable holding the log filter
#[cfg(feature = "cli")]
const LOG_ENV: &str = "PLATINE_DUMP_LOG";

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "platine-dump")]
#[command(about = "Logical backup and restore for MySQL databases")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Dump the configured database to a file
    Backup {
        /// Backup file (relative to the backup directory unless absolute)
        file: PathBuf,
        /// Gzip-compress the document
        #[arg(short, long)]
        compress: bool,
        /// Per-table sections as NAME=MASK (e.g. logs=create, "*=all")
        #[arg(short, long = "table", value_name = "NAME=MASK")]
        tables: Vec<String>,
        /// Workspace path (default: current directory)
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },

    /// Replay a backup file against the configured database
    Restore {
        /// Backup file (relative to the backup directory unless absolute)
        file: PathBuf,
        /// The document is gzip-compressed
        #[arg(short, long)]
        compress: bool,
        /// Workspace path (default: current directory)
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a sample .platine-dump.toml
    Init {
        /// Workspace path (default: current directory)
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Print the effective configuration
    Show {
        /// Workspace path (default: current directory)
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("platine_dump={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Backup {
            file,
            compress,
            tables,
            workspace,
        } => {
            let args = BackupArgs {
                file,
                compress,
                tables,
                workspace,
            };
            handle_backup(&args)
        }

        Commands::Restore {
            file,
            compress,
            workspace,
        } => {
            let args = RestoreArgs {
                file,
                compress,
                workspace,
            };
            handle_restore(&args)
        }

        Commands::Config { command } => match command {
            ConfigCommands::Init { workspace, force } => {
                let args = ConfigInitArgs { workspace, force };
                handle_config_init(&args)
            }
            ConfigCommands::Show { workspace } => {
                let args = ConfigShowArgs { workspace };
                handle_config_show(&args)
            }
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
