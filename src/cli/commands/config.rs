//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::AquaResult;
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    config_path: Option<PathBuf>,
) -> AquaResult<()> {
    let manager = match config_path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };

    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let toml = toml::to_string_pretty(config)?;
            println!("{}", toml);
        }
        ConfigAction::Path => {
            println!("{}", manager.path().display());
        }
        ConfigAction::Init { force } => {
            if manager.path().exists() && !force {
                println!(
                    "{} Configuration already exists at {} (use --force to overwrite)",
                    style("!").yellow(),
                    manager.path().display()
                );
                return Ok(());
            }

            manager.save(&Config::default()).await?;
            println!(
                "{} Wrote default configuration to {}",
                style("✓").green(),
                manager.path().display()
            );
        }
    }

    Ok(())
}
