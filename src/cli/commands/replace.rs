//! Replace command - swap a verified unit for a pre-registered one

use crate::cli::args::ReplaceArgs;
use crate::cli::commands::open_gateway;
use crate::config::Config;
use crate::error::AquaResult;
use console::style;

/// Execute the replace command
pub async fn execute(args: ReplaceArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;

    let outcome = gateway
        .replace(&args.old_unit, &args.new_unit, &args.site)
        .await?;
    gateway.close().await?;

    println!(
        "{} Replaced {} with {} at site {}",
        style("✓").green(),
        style(&outcome.old_unit_id).cyan(),
        style(&outcome.new_unit_id).cyan(),
        outcome.site_id
    );
    println!("  tx: {}", style(&outcome.tx_id).dim());

    Ok(())
}
