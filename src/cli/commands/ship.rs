//! Ship command - mark a batch as shipped to a destination

use crate::cli::args::ShipArgs;
use crate::cli::commands::open_gateway;
use crate::config::Config;
use crate::error::AquaResult;
use console::style;

/// Execute the ship command
///
/// Without `--units` the batch membership is resolved from the local cache.
pub async fn execute(args: ShipArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;

    let outcome = gateway
        .ship(&args.batch, &args.destination, &args.units)
        .await?;
    gateway.close().await?;

    println!(
        "{} Shipped {} unit(s) of batch {} to {}",
        style("✓").green(),
        outcome.unit_count,
        style(&outcome.batch_id).cyan(),
        style(&outcome.destination).cyan()
    );
    println!("  tx: {}", style(&outcome.tx_id).dim());

    Ok(())
}
