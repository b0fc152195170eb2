//! CLI argument definitions using clap derive

use crate::model::FlagReason;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Aquatrace - Ledger-Backed Filter Lifecycle Tracking
///
/// Records every unit transition on an authoritative ledger and keeps a
/// local SQLite replica for fast queries and statistics.
#[derive(Parser, Debug)]
#[command(name = "aquatrace")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "AQUATRACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .aquatrace.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a batch of new units on the ledger
    Register(RegisterArgs),

    /// Ship a registered batch to a destination
    Ship(ShipArgs),

    /// Receive shipped units at a warehouse
    Receive(ReceiveArgs),

    /// Verify a received unit's delivery at a site
    Verify(VerifyArgs),

    /// Replace a verified unit with a pre-registered one
    Replace(ReplaceArgs),

    /// Flag a unit as lost or damaged
    Flag(FlagArgs),

    /// Read a unit's authoritative snapshot and history from the ledger
    Read(ReadArgs),

    /// List the most recent events across all units
    Recent(RecentArgs),

    /// List one unit's events in chronological order
    Events(EventsArgs),

    /// Search cached units by substring over id fields
    Search(SearchArgs),

    /// List the units of a batch
    Batch(BatchArgs),

    /// Show aggregate fleet statistics
    Stats(StatsArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the register command
#[derive(Parser, Debug)]
pub struct RegisterArgs {
    /// Batch identifier (batch-YYYY-NNN)
    #[arg(short, long)]
    pub batch: String,

    /// Unit identifiers (b-YYYY-u-NNN, comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub units: Vec<String>,
}

/// Arguments for the ship command
#[derive(Parser, Debug)]
pub struct ShipArgs {
    /// Batch identifier
    #[arg(short, long)]
    pub batch: String,

    /// Shipping destination
    #[arg(short, long)]
    pub destination: String,

    /// Unit identifiers (defaults to every cached unit of the batch)
    #[arg(short, long, value_delimiter = ',')]
    pub units: Vec<String>,
}

/// Arguments for the receive command
#[derive(Parser, Debug)]
#[command(group(clap::ArgGroup::new("target").required(true).args(["batch", "unit"])))]
pub struct ReceiveArgs {
    /// Batch identifier (receives every cached unit of the batch)
    #[arg(short, long)]
    pub batch: Option<String>,

    /// Single unit identifier
    #[arg(short, long)]
    pub unit: Option<String>,

    /// Warehouse identifier
    #[arg(short, long)]
    pub warehouse: String,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Unit identifier
    #[arg(short, long)]
    pub unit: String,

    /// Site identifier
    #[arg(short, long)]
    pub site: String,

    /// Verifier identifier
    #[arg(long)]
    pub verifier: String,
}

/// Arguments for the replace command
#[derive(Parser, Debug)]
pub struct ReplaceArgs {
    /// Unit being replaced (must be VERIFIED)
    #[arg(long)]
    pub old_unit: String,

    /// Replacement unit (must be RECEIVED or REGISTERED)
    #[arg(long)]
    pub new_unit: String,

    /// Site identifier
    #[arg(short, long)]
    pub site: String,
}

/// Arguments for the flag command
#[derive(Parser, Debug)]
pub struct FlagArgs {
    /// Unit identifier
    #[arg(short, long)]
    pub unit: String,

    /// Reason: LOST or DAMAGED
    #[arg(short, long)]
    pub reason: FlagReason,
}

/// Arguments for the read command
#[derive(Parser, Debug)]
pub struct ReadArgs {
    /// Unit identifier
    pub unit: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the recent command
#[derive(Parser, Debug)]
pub struct RecentArgs {
    /// Number of events to show (defaults from config)
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the events command
#[derive(Parser, Debug)]
pub struct EventsArgs {
    /// Unit identifier
    pub unit: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the search command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Substring matched against unit, batch, site and warehouse ids
    pub query: String,

    /// Maximum rows to return (defaults from config)
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the batch command
#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// Batch identifier
    pub batch: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the stats command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list-like commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_register() {
        let cli = Cli::parse_from([
            "aquatrace",
            "register",
            "--batch",
            "batch-2024-001",
            "--units",
            "b-2024-u-001,b-2024-u-002",
        ]);
        match cli.command {
            Commands::Register(args) => {
                assert_eq!(args.batch, "batch-2024-001");
                assert_eq!(args.units, vec!["b-2024-u-001", "b-2024-u-002"]);
            }
            _ => panic!("expected Register command"),
        }
    }

    #[test]
    fn cli_parses_ship_without_units() {
        let cli = Cli::parse_from([
            "aquatrace",
            "ship",
            "--batch",
            "batch-2024-001",
            "--destination",
            "Nairobi",
        ]);
        match cli.command {
            Commands::Ship(args) => {
                assert_eq!(args.destination, "Nairobi");
                assert!(args.units.is_empty());
            }
            _ => panic!("expected Ship command"),
        }
    }

    #[test]
    fn receive_requires_batch_or_unit() {
        let result = Cli::try_parse_from(["aquatrace", "receive", "--warehouse", "WH-001"]);
        assert!(result.is_err());

        let cli = Cli::parse_from([
            "aquatrace",
            "receive",
            "--unit",
            "b-2024-u-001",
            "--warehouse",
            "WH-001",
        ]);
        match cli.command {
            Commands::Receive(args) => {
                assert_eq!(args.unit.as_deref(), Some("b-2024-u-001"));
                assert!(args.batch.is_none());
            }
            _ => panic!("expected Receive command"),
        }
    }

    #[test]
    fn flag_parses_reason() {
        let cli = Cli::parse_from([
            "aquatrace",
            "flag",
            "--unit",
            "b-2024-u-001",
            "--reason",
            "LOST",
        ]);
        match cli.command {
            Commands::Flag(args) => assert_eq!(args.reason, FlagReason::Lost),
            _ => panic!("expected Flag command"),
        }
    }

    #[test]
    fn flag_rejects_unknown_reason() {
        let result = Cli::try_parse_from([
            "aquatrace",
            "flag",
            "--unit",
            "b-2024-u-001",
            "--reason",
            "BROKEN",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_stats() {
        let cli = Cli::parse_from(["aquatrace", "stats"]);
        assert!(matches!(cli.command, Commands::Stats(_)));
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["aquatrace", "stats"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["aquatrace", "-vv", "stats"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parses_read_with_format() {
        let cli = Cli::parse_from(["aquatrace", "read", "b-2024-u-001", "--format", "json"]);
        match cli.command {
            Commands::Read(args) => {
                assert_eq!(args.unit, "b-2024-u-001");
                assert!(matches!(args.format, OutputFormat::Json));
            }
            _ => panic!("expected Read command"),
        }
    }
}
