//! Vehicle listing and detail output in every `--format`

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::vehicle::{StoredVehicle, VehicleColumn, VehicleRecord};

/// Widest a TSV cell may grow before truncation
const MAX_TSV_WIDTH: usize = 28;

/// Print a list of vehicles
pub fn print_vehicles(vehicles: &[VehicleRecord], format: OutputFormat, quiet: bool) -> Result<()> {
    let format = match format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(vehicles).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(vehicles).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            let header: Vec<_> = VehicleColumn::ALL.iter().map(|c| c.name()).collect();
            println!("{}", header.join(","));
            for vehicle in vehicles {
                let values: Vec<_> = VehicleColumn::ALL
                    .iter()
                    .map(|&c| escape_csv(&vehicle.value(c)))
                    .collect();
                println!("{}", values.join(","));
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(VehicleColumn::ALL.iter().map(|c| c.name().to_string()));
            for vehicle in vehicles {
                builder.push_record(
                    VehicleColumn::ALL
                        .iter()
                        .map(|&c| vehicle.value(c).replace('|', "\\|")),
                );
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Id => {
            for vehicle in vehicles {
                println!("{}", vehicle.veh_id);
            }
        }
        OutputFormat::Tsv => print_tsv(vehicles, quiet),
        OutputFormat::Auto => unreachable!(),
    }

    Ok(())
}

fn print_tsv(vehicles: &[VehicleRecord], quiet: bool) {
    let widths: Vec<usize> = VehicleColumn::ALL
        .iter()
        .map(|&c| {
            vehicles
                .iter()
                .map(|v| v.value(c).chars().count())
                .chain(std::iter::once(c.name().len()))
                .max()
                .unwrap_or(0)
                .min(MAX_TSV_WIDTH)
        })
        .collect();

    let header: Vec<_> = VehicleColumn::ALL
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{:<w$}", style(c.name()).bold(), w = w))
        .collect();
    println!("{}", header.join(" "));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + widths.len() - 1));

    for vehicle in vehicles {
        let row: Vec<_> = VehicleColumn::ALL
            .iter()
            .zip(&widths)
            .map(|(&c, &w)| {
                let value = truncate_str(&vehicle.value(c), w);
                if c == VehicleColumn::VehId {
                    format!("{:<w$}", style(value).cyan(), w = w)
                } else {
                    format!("{:<w$}", value, w = w)
                }
            })
            .collect();
        println!("{}", row.join(" "));
    }

    if !quiet {
        println!();
        println!("{} vehicle(s) found.", style(vehicles.len()).cyan());
    }
}

/// Print one vehicle
pub fn print_vehicle(vehicle: &StoredVehicle, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(vehicle).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(vehicle).into_diagnostic()?);
        }
        OutputFormat::Id => {
            println!("{}", vehicle.record.veh_id);
        }
        OutputFormat::Csv | OutputFormat::Md | OutputFormat::Tsv => {
            print_vehicles(std::slice::from_ref(&vehicle.record), format, true)?;
        }
        OutputFormat::Auto => {
            let record = &vehicle.record;
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("VEH_ID").bold(), style(&record.veh_id).cyan());
            println!("{}: {}", style("Type").bold(), style(&record.vehicle_type).yellow());
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Registration").bold(), record.reg_no);
            println!("{}: {}", style("Make").bold(), record.make);
            println!("{}: {}", style("Model").bold(), record.model);
            println!(
                "{}: {}",
                style("Year").bold(),
                record.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
            );
            println!("{}: {}", style("Owner").bold(), record.owner);
            println!("{}: {}", style("Used for").bold(), record.used_for);
            if record.known_type().is_none() {
                println!();
                println!(
                    "{} '{}' is not one of the fleet's vehicle types",
                    style("!").yellow(),
                    record.vehicle_type
                );
            }
            if !record.used_for.is_empty() && record.known_usage().is_none() {
                println!(
                    "{} '{}' is not one of the fleet's usage categories",
                    style("!").yellow(),
                    record.used_for
                );
            }
        }
    }
    Ok(())
}
