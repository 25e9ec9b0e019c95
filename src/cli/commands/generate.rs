//! `fleet generate` command - Placeholder vehicles per type

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, open_workspace, parse_vehicle_type};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::generator::generate_placeholders;
use crate::entities::vehicle::VehicleType;

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Vehicles to create as TYPE=N (repeatable), e.g. --count compactor=3
    #[arg(long, short = 'c', value_parser = parse_count, required = true)]
    pub count: Vec<(VehicleType, u32)>,
}

/// Parse `TYPE=N`
fn parse_count(s: &str) -> std::result::Result<(VehicleType, u32), String> {
    let (vehicle_type, n) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected TYPE=N, got '{}'", s))?;
    let vehicle_type = parse_vehicle_type(vehicle_type)?;
    let n = n
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a count", n.trim()))?;
    Ok((vehicle_type, n))
}

pub fn run(args: GenerateArgs, global: &GlobalOpts) -> Result<()> {
    let (workspace, config) = open_workspace(global)?;
    let mut store = open_store(&workspace, &config)?;

    let created = generate_placeholders(&mut store, &args.count)?;

    match global.format {
        OutputFormat::Id => {
            for record in &created {
                println!("{}", record.veh_id);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&created).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&created).into_diagnostic()?);
        }
        _ => {
            if global.quiet {
                return Ok(());
            }
            for (vehicle_type, n) in &args.count {
                let ids: Vec<_> = created
                    .iter()
                    .filter(|r| r.vehicle_type == vehicle_type.label())
                    .map(|r| r.veh_id.as_str())
                    .collect();
                println!(
                    "  {:<24} {:>4}  {}",
                    vehicle_type.label(),
                    style(n).cyan(),
                    style(ids.join(", ")).dim()
                );
            }
            println!();
            println!(
                "{} Generated {} placeholder vehicle(s)",
                style("✓").green(),
                style(created.len()).cyan()
            );
        }
    }

    Ok(())
}
