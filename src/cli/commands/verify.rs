//! Verify command - record verified delivery at a site

use crate::cli::args::VerifyArgs;
use crate::cli::commands::open_gateway;
use crate::config::Config;
use crate::error::AquaResult;
use console::style;

/// Execute the verify command
pub async fn execute(args: VerifyArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;

    let outcome = gateway
        .verify(&args.unit, &args.site, &args.verifier)
        .await?;
    gateway.close().await?;

    println!(
        "{} Verified {} at site {} by {}",
        style("✓").green(),
        style(&outcome.unit_id).cyan(),
        style(&outcome.site_id).cyan(),
        outcome.verifier_id
    );
    println!("  tx: {}", style(&outcome.tx_id).dim());

    Ok(())
}
