//! Clap derive structures for the `stalink` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// stalink -- station profiles and simulated WiFi sessions
#[derive(Debug, Parser)]
#[command(
    name = "stalink",
    version,
    about = "Marshal station profiles and drive simulated WiFi sessions",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Station profile to use
    #[arg(long, short = 'p', env = "STALINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (overrides the platform default)
    #[arg(long, short = 'c', env = "STALINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (defaults to `defaults.output` from the config)
    #[arg(long, short = 'o', env = "STALINK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect configuration and profiles
    Config(ConfigArgs),

    /// List subscribable station events
    Events,

    /// Run a profile against a simulated radio and print every callback
    #[command(alias = "sim")]
    Simulate(SimulateArgs),
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Marshal the profile's station record and show the read-back
    Show,
    /// Print the resolved config file path
    Path,
    /// List configured profiles
    Profiles,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Number of simulated access points
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub aps: u8,

    /// Make scan result retrieval fail with this driver code
    #[arg(long)]
    pub fail_scan: Option<i32>,
}
