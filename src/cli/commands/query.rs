//! Cache query commands - recent, events, search, batch, stats
//!
//! All read the local replica only; none of them touch the ledger.

use crate::cache::{CacheStats, CachedEvent, CachedUnit};
use crate::cli::args::{BatchArgs, EventsArgs, OutputFormat, RecentArgs, SearchArgs, StatsArgs};
use crate::cli::commands::{open_gateway, read::format_ts};
use crate::config::Config;
use crate::error::AquaResult;
use console::style;

/// Execute the recent command
pub async fn recent(args: RecentArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;
    let limit = args.limit.unwrap_or(config.cache.recent_limit);
    let events = gateway.recent_events(limit)?;
    gateway.close().await?;

    print_events(&events, args.format)
}

/// Execute the events command
pub async fn events(args: EventsArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;
    let events = gateway.unit_events(&args.unit)?;
    gateway.close().await?;

    print_events(&events, args.format)
}

/// Execute the search command
pub async fn search(args: SearchArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;
    let limit = args.limit.unwrap_or(config.cache.search_limit);
    let units = gateway.search(&args.query, limit)?;
    gateway.close().await?;

    print_units(&units, args.format)
}

/// Execute the batch command
pub async fn batch(args: BatchArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;
    let units = gateway.units_in_batch(&args.batch)?;
    gateway.close().await?;

    print_units(&units, args.format)
}

/// Execute the stats command
pub async fn stats(args: StatsArgs, config: &Config) -> AquaResult<()> {
    let gateway = open_gateway(config).await?;
    let stats = gateway.stats()?;
    gateway.close().await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Table | OutputFormat::Plain => print_stats(&stats),
    }

    Ok(())
}

fn print_events(events: &[CachedEvent], format: OutputFormat) -> AquaResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(events)?);
            return Ok(());
        }
        OutputFormat::Plain => {
            for event in events {
                println!("{} {} {}", event.ts, event.unit_id, event.event_type);
            }
            return Ok(());
        }
        OutputFormat::Table => {}
    }

    if events.is_empty() {
        println!("No events");
        return Ok(());
    }

    println!(
        "{:<20} {:<16} {:<12} {}",
        style("TIME").bold(),
        style("UNIT").bold(),
        style("EVENT").bold(),
        style("TX").bold()
    );
    println!("{}", "-".repeat(76));
    for event in events {
        println!(
            "{:<20} {:<16} {:<12} {}",
            format_ts(event.ts),
            event.unit_id,
            event.event_type,
            style(short_tx(&event.tx_id)).dim()
        );
    }
    println!();
    println!("{} event(s)", events.len());
    Ok(())
}

fn print_units(units: &[CachedUnit], format: OutputFormat) -> AquaResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(units)?);
            return Ok(());
        }
        OutputFormat::Plain => {
            for unit in units {
                println!("{}", unit.unit_id);
            }
            return Ok(());
        }
        OutputFormat::Table => {}
    }

    if units.is_empty() {
        println!("No matching units");
        return Ok(());
    }

    println!(
        "{:<16} {:<16} {:<18} {:<10} {}",
        style("UNIT").bold(),
        style("STATE").bold(),
        style("BATCH").bold(),
        style("SITE").bold(),
        style("WAREHOUSE").bold()
    );
    println!("{}", "-".repeat(76));
    for unit in units {
        println!(
            "{:<16} {:<16} {:<18} {:<10} {}",
            unit.unit_id,
            unit.state,
            unit.batch_id.as_deref().unwrap_or("-"),
            unit.site_id.as_deref().unwrap_or("-"),
            unit.warehouse_id.as_deref().unwrap_or("-")
        );
    }
    println!();
    println!("{} unit(s)", units.len());
    Ok(())
}

fn print_stats(stats: &CacheStats) {
    println!("{}", style("Fleet statistics").bold());
    println!("  units:  {}", stats.total_units);
    println!("  events: {}", stats.total_events);

    if !stats.state_counts.is_empty() {
        println!();
        println!("{}", style("By state").bold());
        for (state, count) in &stats.state_counts {
            println!("  {:<16} {}", state, count);
        }
    }

    if !stats.event_type_counts.is_empty() {
        println!();
        println!("{}", style("By event").bold());
        for (kind, count) in &stats.event_type_counts {
            println!("  {:<16} {}", kind, count);
        }
    }

    println!();
    println!(
        "  verified deliveries:    {}",
        style(stats.verified_deliveries).green()
    );
    println!(
        "  replacement compliance: {}%",
        stats.replacement_compliance
    );
}

fn short_tx(tx_id: &str) -> &str {
    &tx_id[..tx_id.len().min(12)]
}
