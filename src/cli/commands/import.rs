//! `fleet import` command - Import vehicles from CSV or XLSX

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{escape_csv, open_store, open_workspace};
use crate::cli::output::print_vehicles;
use crate::cli::GlobalOpts;
use crate::core::import::{import_file, template_rows, ImportMode, ImportOptions};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV or XLSX file to import (first sheet of a workbook)
    #[arg(required_unless_present = "template")]
    pub file: Option<PathBuf>,

    /// Print a CSV template with the required header
    #[arg(long, conflicts_with = "file")]
    pub template: bool,

    /// Overwrite vehicles whose VEH_ID already exists instead of failing
    #[arg(long)]
    pub upsert: bool,

    /// Validate the file without writing to the store
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    if args.template {
        return generate_template();
    }

    let file_path = args
        .file
        .clone()
        .ok_or_else(|| miette::miette!("File required. Usage: fleet import vehicles.xlsx"))?;
    if !file_path.exists() {
        return Err(miette::miette!("File not found: {}", file_path.display()));
    }

    let (workspace, config) = open_workspace(global)?;
    let mut store = open_store(&workspace, &config)?;

    if !global.quiet {
        println!(
            "{} Importing vehicles from {}{}",
            style("→").blue(),
            style(file_path.display()).yellow(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
    }

    let options = ImportOptions {
        mode: if args.upsert {
            ImportMode::Upsert
        } else {
            ImportMode::Append
        },
        dry_run: args.dry_run,
    };
    let stats = import_file(&mut store, &file_path, &options)?;

    if args.dry_run && !stats.preview.is_empty() {
        if !global.quiet {
            println!();
            println!(
                "{} (first {} of {} rows)",
                style("Preview").bold(),
                stats.preview.len(),
                stats.rows_read
            );
        }
        print_vehicles(&stats.preview, global.format, true)?;
    }

    if global.quiet {
        return Ok(());
    }

    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Import Summary").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Rows read:        {}", style(stats.rows_read).cyan());
    println!("  Vehicles written: {}", style(stats.rows_written).green());
    if !stats.ignored_columns.is_empty() {
        println!(
            "  Ignored columns:  {}",
            style(stats.ignored_columns.join(", ")).dim()
        );
    }

    if args.dry_run {
        println!();
        println!("{}", style("Dry run complete. Nothing was written.").yellow());
    } else {
        println!();
        println!(
            "{} File uploaded and data added to database successfully!",
            style("✓").green()
        );
    }

    Ok(())
}

fn generate_template() -> Result<()> {
    let (headers, example) = template_rows();

    // stdout can be redirected straight to a file
    println!("{}", headers.join(","));
    let example: Vec<_> = example.iter().map(|v| escape_csv(v)).collect();
    println!("{}", example.join(","));

    eprintln!();
    eprintln!(
        "{} Template generated. Redirect to file: fleet import --template > vehicles.csv",
        style("→").blue()
    );
    Ok(())
}
