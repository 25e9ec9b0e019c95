//! `fleet status` command - Fleet summary

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, open_workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::vehicle::VehicleType;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Also list vehicle types with no records
    #[arg(long)]
    pub all_types: bool,
}

#[derive(serde::Serialize)]
struct FleetMetrics {
    workspace: String,
    database: String,
    total: u64,
    by_type: Vec<TypeCount>,
}

#[derive(serde::Serialize)]
struct TypeCount {
    vehicle_type: String,
    count: u64,
    /// False for imported labels outside the fixed type table
    known: bool,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let (workspace, config) = open_workspace(global)?;
    let database = config.database_path(&workspace);
    let store = open_store(&workspace, &config)?;

    let mut by_type: Vec<TypeCount> = store
        .count_by_type()?
        .into_iter()
        .map(|(vehicle_type, count)| TypeCount {
            known: vehicle_type.parse::<VehicleType>().is_ok(),
            vehicle_type,
            count,
        })
        .collect();

    if args.all_types {
        for vt in VehicleType::all() {
            if !by_type.iter().any(|t| t.vehicle_type == vt.label()) {
                by_type.push(TypeCount {
                    vehicle_type: vt.label().to_string(),
                    count: 0,
                    known: true,
                });
            }
        }
        by_type.sort_by(|a, b| a.vehicle_type.cmp(&b.vehicle_type));
    }

    let metrics = FleetMetrics {
        workspace: workspace.root().display().to_string(),
        database: database.display().to_string(),
        total: store.count()?,
        by_type,
    };

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&metrics).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&metrics).into_diagnostic()?);
        }
        _ => {
            let width = 48;
            println!("{}", style("Fleet Status").bold().underlined());
            println!("{}", "═".repeat(width));
            println!("{}: {}", style("Workspace").bold(), style(&metrics.workspace).cyan());
            println!("{}: {}", style("Database").bold(), style(&metrics.database).dim());
            println!();

            for entry in &metrics.by_type {
                let label = if entry.vehicle_type.is_empty() {
                    "(blank)".to_string()
                } else {
                    entry.vehicle_type.clone()
                };
                let count = if entry.count == 0 {
                    style(entry.count.to_string()).dim()
                } else {
                    style(entry.count.to_string()).cyan()
                };
                let marker = if entry.known { " " } else { "?" };
                println!("  {} {:<32} {:>8}", style(marker).yellow(), label, count);
            }

            println!("{}", "─".repeat(width));
            println!("Total vehicles: {}", style(metrics.total).cyan().bold());
        }
    }

    Ok(())
}
