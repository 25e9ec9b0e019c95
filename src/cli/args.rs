//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, generate::GenerateArgs, import::ImportArgs, init::InitArgs,
    report::ReportCommands, reset::ResetArgs, status::StatusArgs, vehicle::VehicleCommands,
};

#[derive(Parser)]
#[command(name = "fleet")]
#[command(author, version, about = "Fleet inventory for waste-collection vehicles")]
#[command(long_about = "Keep the vehicle fleet of a waste-collection operator in a local SQLite store: search and edit records, import spreadsheets, generate placeholder fleets and print PDF reports.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .fleet/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new fleet workspace
    Init(InitArgs),

    /// Show record counts per vehicle type
    Status(StatusArgs),

    /// Vehicle record management
    #[command(subcommand)]
    Vehicle(VehicleCommands),

    /// Import vehicles from a CSV or XLSX file
    Import(ImportArgs),

    /// Generate placeholder vehicles
    Generate(GenerateArgs),

    /// Generate PDF reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Delete every vehicle record
    Reset(ResetArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for list, details for show)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just VEH_IDs, one per line
    Id,
}
