//! Receive command - record warehouse receipt for a batch or single unit

use crate::cli::args::ReceiveArgs;
use crate::cli::commands::open_gateway;
use crate::config::Config;
use crate::error::AquaResult;
use console::style;

/// Execute the receive command
///
/// A batch fans out into independent per-unit submissions; units that
/// fail are reported individually and do not block the rest.
pub async fn execute(args: ReceiveArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;

    let outcome = gateway
        .receive(args.batch.as_deref(), args.unit.as_deref(), &args.warehouse)
        .await?;
    gateway.close().await?;

    println!(
        "{} Received {} unit(s) at {}",
        style("✓").green(),
        outcome.unit_count,
        style(&args.warehouse).cyan()
    );
    for received in &outcome.results {
        println!(
            "  {} {}",
            received.unit_id,
            style(&received.tx_id).dim()
        );
    }

    for failure in &outcome.errors {
        println!(
            "{} {}: {}",
            style("!").yellow(),
            failure.unit_id,
            failure.error
        );
    }

    Ok(())
}
