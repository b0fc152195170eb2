//! Flag command - mark a unit as lost or damaged

use crate::cli::args::FlagArgs;
use crate::cli::commands::open_gateway;
use crate::config::Config;
use crate::error::AquaResult;
use console::style;

/// Execute the flag command
pub async fn execute(args: FlagArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;

    let outcome = gateway.flag(&args.unit, args.reason).await?;
    gateway.close().await?;

    println!(
        "{} Flagged {} as {}",
        style("✓").green(),
        style(&outcome.unit_id).cyan(),
        style(outcome.reason.as_str()).red()
    );
    println!("  tx: {}", style(&outcome.tx_id).dim());

    Ok(())
}
