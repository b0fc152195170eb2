//! Read command - authoritative unit snapshot from the ledger
//!
//! Reading also repairs the local cache when it has drifted from the
//! ledger's values.

use crate::cli::args::{OutputFormat, ReadArgs};
use crate::cli::commands::open_gateway;
use crate::config::Config;
use crate::error::AquaResult;
use crate::ledger::contract::UnitView;
use chrono::DateTime;
use console::style;

/// Execute the read command
pub async fn execute(args: ReadArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;

    let view = gateway.read(&args.unit).await?;
    gateway.close().await?;

    match args.format {
        OutputFormat::Table => print_table(&view),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Plain => println!("{} {}", view.unit_id, view.state),
    }

    Ok(())
}

fn print_table(view: &UnitView) {
    println!(
        "{} {}",
        style(&view.unit_id).cyan().bold(),
        style(view.state.as_str()).bold()
    );
    println!("  batch:     {}", view.batch_id);
    if let Some(destination) = &view.destination {
        println!("  dest:      {}", destination);
    }
    if let Some(warehouse) = &view.warehouse_id {
        println!("  warehouse: {}", warehouse);
    }
    if let Some(site) = &view.site_id {
        println!("  site:      {}", site);
    }
    if let Some(verifier) = &view.verifier_id {
        println!("  verifier:  {}", verifier);
    }
    if let Some(replaced_by) = &view.replaced_by {
        println!("  replaced by:   {}", replaced_by);
    }
    if let Some(replaced_unit) = &view.replaced_unit {
        println!("  replacement of: {}", replaced_unit);
    }
    if let Some(reason) = &view.flag_reason {
        println!("  flagged:   {}", style(reason.as_str()).red());
    }
    println!("  created:   {}", format_ts(view.created_at));
    println!("  updated:   {}", format_ts(view.last_updated));

    println!();
    println!("{}", style("History").bold());
    for event in &view.history {
        println!(
            "  {} {:<12} {}",
            format_ts(event.timestamp),
            event.kind.as_str(),
            style(&event.org).dim()
        );
    }
}

pub(crate) fn format_ts(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}
