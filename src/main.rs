//! Aquatrace - Ledger-Backed Filter Lifecycle Tracking
//!
//! CLI entry point that dispatches to subcommands.

use aquatrace::cli::{Cli, Commands};
use aquatrace::config::ConfigManager;
use aquatrace::error::AquaResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AquaResult<()> {
    let cli = Cli::parse();

    // Load configuration before logging init so [general] can shape it
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| aquatrace::error::AquaError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug.
    // `general.verbose` raises the floor to info; -v flags go further.
    let verbosity = if config.general.verbose {
        cli.verbose.max(1)
    } else {
        cli.verbose
    };
    let filter = match verbosity {
        0 => EnvFilter::new("aquatrace=warn"),
        1 => EnvFilter::new("aquatrace=info"),
        _ => EnvFilter::new("aquatrace=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time();
    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    if cli.no_local {
        debug!("Local config discovery disabled (--no-local)");
    } else if let Some(ref path) = local_config_path {
        debug!("Using local config: {}", path.display());
    }

    // Ensure state directories exist
    ConfigManager::ensure_state_dirs().await?;

    // Dispatch to command
    match cli.command {
        Commands::Register(args) => aquatrace::cli::commands::register(args, &config).await,
        Commands::Ship(args) => aquatrace::cli::commands::ship(args, &config).await,
        Commands::Receive(args) => aquatrace::cli::commands::receive(args, &config).await,
        Commands::Verify(args) => aquatrace::cli::commands::verify(args, &config).await,
        Commands::Replace(args) => aquatrace::cli::commands::replace(args, &config).await,
        Commands::Flag(args) => aquatrace::cli::commands::flag(args, &config).await,
        Commands::Read(args) => aquatrace::cli::commands::read(args, &config).await,
        Commands::Recent(args) => aquatrace::cli::commands::recent(args, &config).await,
        Commands::Events(args) => aquatrace::cli::commands::events(args, &config).await,
        Commands::Search(args) => aquatrace::cli::commands::search(args, &config).await,
        Commands::Batch(args) => aquatrace::cli::commands::batch(args, &config).await,
        Commands::Stats(args) => aquatrace::cli::commands::stats(args, &config).await,
        Commands::Config(args) => {
            aquatrace::cli::commands::config(args, &config, cli.config).await
        }
    }
}
