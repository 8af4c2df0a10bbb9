//! Clap derive structures for the `modemex` CLI.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// modemex -- Prometheus exporter for home router traffic counters
#[derive(Debug, Parser)]
#[command(
    name = "modemex",
    version,
    about = "Export modem and ONT traffic counters as Prometheus metrics",
    long_about = "Logs into the web management page of a home router or ONT,\n\
        scrapes its Ethernet traffic counters and serves them in the\n\
        Prometheus text exposition format.\n\n\
        Device settings come from the config file and MODEM_* variables.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Defaults to `serve` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to a TOML config file
    #[arg(long, short = 'c', env = "MODEMEX_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve metrics over HTTP (default)
    Serve(ServeArgs),

    /// Read the device once and print the metrics
    Scrape,

    /// List supported vendors and models
    Models,
}

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    pub listen: Option<IpAddr>,

    /// Port to bind (overrides config and PORT)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,
}
