//! `fleet report` command - PDF reports by vehicle type or usage

use chrono::Local;
use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{open_store, open_workspace, parse_usage, parse_vehicle_type};
use crate::cli::GlobalOpts;
use crate::entities::vehicle::{UsageCategory, VehicleColumn, VehicleType};
use crate::report::{write_report, Logo, ReportKind, ReportOptions, ReportTable};

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Report every vehicle of one type
    Type(TypeArgs),

    /// Report every vehicle assigned to one usage category
    Usage(UsageArgs),
}

#[derive(clap::Args, Debug)]
pub struct TypeArgs {
    /// Vehicle type (label or slug)
    #[arg(value_parser = parse_vehicle_type)]
    pub vehicle_type: VehicleType,

    /// Directory for the PDF (default: configured reports directory)
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct UsageArgs {
    /// Usage category (label or slug)
    #[arg(value_parser = parse_usage)]
    pub usage: UsageCategory,

    /// Directory for the PDF (default: configured reports directory)
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    let (column, value, kind, output_dir) = match cmd {
        ReportCommands::Type(args) => (
            VehicleColumn::VehicleType,
            args.vehicle_type.label(),
            ReportKind::VehicleType,
            args.output_dir,
        ),
        ReportCommands::Usage(args) => (
            VehicleColumn::UsedFor,
            args.usage.label(),
            ReportKind::Usage,
            args.output_dir,
        ),
    };

    let (workspace, config) = open_workspace(global)?;
    let store = open_store(&workspace, &config)?;

    let vehicles = store.query_exact(column, value)?;
    let table = ReportTable::from_vehicles(&vehicles);

    let options = ReportOptions::new(Local::now().naive_local())
        .with_logo(Logo::load(&config.logo_path(&workspace)))
        .with_footer_label(config.footer_label());

    let dir = output_dir.unwrap_or_else(|| config.reports_dir(&workspace));
    let path = write_report(&dir, kind, &table, value, &options)?;

    if table.is_empty() {
        eprintln!(
            "{} No vehicles found for '{}'; the report only carries a notice",
            style("!").yellow(),
            value
        );
    }

    if global.quiet {
        println!("{}", path.display());
    } else {
        println!(
            "{} Wrote {} report ({} vehicle(s)) to {}",
            style("✓").green(),
            style(value).cyan(),
            table.len(),
            style(path.display()).yellow()
        );
    }
    Ok(())
}
