//! Register command - create a batch of new units on the ledger

use crate::cli::args::RegisterArgs;
use crate::cli::commands::open_gateway;
use crate::config::Config;
use crate::error::AquaResult;
use console::style;

/// Execute the register command
pub async fn execute(args: RegisterArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;

    let outcome = gateway.register(&args.batch, &args.units).await?;
    gateway.close().await?;

    println!(
        "{} Registered {} unit(s) in batch {}",
        style("✓").green(),
        outcome.unit_count,
        style(&outcome.batch_id).cyan()
    );
    println!("  tx: {}", style(&outcome.tx_id).dim());

    Ok(())
}
