//! # tradeflow CLI entry point
//!
//! Parses command-line arguments, resolves the workflow configuration, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tradeflow_cli::call::{run_invoke, run_query, CallArgs};
use tradeflow_cli::keys::{run_keygen, KeygenArgs};
use tradeflow_cli::{open_workflow, DEFAULT_LEDGER};
use tradeflow_workflow::{AccessPolicy, FanOutPolicy, WorkflowConfig};

/// Trade document workflow CLI.
///
/// Plays the importer, exporter, and their banks through a purchase order
/// and the bill of lading, invoice, and packing list lifecycle.
#[derive(Parser, Debug)]
#[command(name = "tradeflow", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the JSON ledger snapshot.
    #[arg(long, global = true, default_value = DEFAULT_LEDGER)]
    ledger: PathBuf,

    /// Override TRADEFLOW_ACCESS_CONTROL.
    #[arg(long, global = true, value_enum)]
    access_control: Option<Switch>,

    /// Override TRADEFLOW_FANOUT (atomic or sequential).
    #[arg(long, global = true)]
    fan_out: Option<FanOutPolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 key pair for a trade party.
    Keygen(KeygenArgs),

    /// Run a mutating command (initTrade, updatePO, submitED, acceptED, rejectED).
    Invoke(CallArgs),

    /// Run a read (getED, getPO, getEDStatus, listContracts, ...).
    Query(CallArgs),
}

impl Cli {
    fn workflow_config(&self) -> Result<WorkflowConfig> {
        let mut config = WorkflowConfig::from_env()?;
        if let Some(switch) = self.access_control {
            config.access = AccessPolicy::new(switch == Switch::On);
        }
        if let Some(fan_out) = self.fan_out {
            config.fan_out = fan_out;
        }
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<u8> {
    match &cli.command {
        Commands::Keygen(args) => run_keygen(args),
        Commands::Invoke(args) => {
            run_invoke(&open_workflow(&cli.ledger, cli.workflow_config()?)?, args)
        }
        Commands::Query(args) => {
            run_query(&open_workflow(&cli.ledger, cli.workflow_config()?)?, args)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!(ledger = %cli.ledger.display(), "tradeflow CLI starting");

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_invoke_with_key() {
        let cli = Cli::try_parse_from([
            "tradeflow", "invoke", "acceptED", "1000", "--key", "ib.key",
        ])
        .unwrap();
        match cli.command {
            Commands::Invoke(args) => {
                assert_eq!(args.function, "acceptED");
                assert_eq!(args.args, ["1000"]);
                assert_eq!(args.key, Some(PathBuf::from("ib.key")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.ledger, PathBuf::from(DEFAULT_LEDGER));
    }

    #[test]
    fn cli_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "tradeflow",
            "-vv",
            "query",
            "listContracts",
            "--access-control",
            "off",
            "--fan-out",
            "sequential",
            "--ledger",
            "/tmp/l.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.access_control, Some(Switch::Off));
        assert_eq!(cli.fan_out, Some(FanOutPolicy::Sequential));
        assert_eq!(cli.ledger, PathBuf::from("/tmp/l.json"));
    }

    #[test]
    fn cli_parse_keygen() {
        let cli = Cli::try_parse_from([
            "tradeflow", "keygen", "--output", "/tmp", "--prefix", "eb",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Keygen(_)));
    }

    #[test]
    fn cli_rejects_bad_fan_out() {
        assert!(Cli::try_parse_from([
            "tradeflow", "--fan-out", "parallel", "query", "listContracts"
        ])
        .is_err());
    }
}
