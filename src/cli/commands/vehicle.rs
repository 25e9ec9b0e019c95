//! `fleet vehicle` command - Vehicle record management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{
    open_store, open_workspace, parse_column, parse_usage, parse_vehicle_type, parse_year,
};
use crate::cli::output::{print_vehicle, print_vehicles};
use crate::cli::GlobalOpts;
use crate::core::store::SearchField;
use crate::entities::vehicle::{
    UsageCategory, VehicleColumn, VehiclePatch, VehicleRecord, VehicleType,
};

#[derive(Subcommand, Debug)]
pub enum VehicleCommands {
    /// List vehicles, optionally filtered by a search term
    List(ListArgs),

    /// Show one vehicle
    Show(ShowArgs),

    /// Create a vehicle, or overwrite the one with the same VEH_ID
    New(NewArgs),

    /// Change fields of an existing vehicle
    Edit(EditArgs),

    /// Delete a vehicle
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Substring to search for (case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Restrict the search to one column (VEH_ID, REG_NO, OWNER, ...)
    #[arg(long, value_parser = parse_column)]
    pub field: Option<VehicleColumn>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Vehicle ID (VEH_ID)
    pub veh_id: String,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Vehicle ID (VEH_ID), unique across the fleet
    #[arg(long)]
    pub id: Option<String>,

    /// Vehicle type (label or slug, e.g. "Compactor" or dumper-20m3)
    #[arg(long = "type", short = 't', value_parser = parse_vehicle_type)]
    pub vehicle_type: Option<VehicleType>,

    /// Registration number
    #[arg(long)]
    pub reg_no: Option<String>,

    #[arg(long)]
    pub make: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    /// Model year (1900-2100, default 2020)
    #[arg(long, value_parser = parse_year)]
    pub year: Option<i64>,

    #[arg(long)]
    pub owner: Option<String>,

    /// Usage category (default: the usage rule of the vehicle type)
    #[arg(long, value_parser = parse_usage)]
    pub used_for: Option<UsageCategory>,

    /// Interactive mode (prompt for missing fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Vehicle ID (VEH_ID); cannot be changed
    pub veh_id: String,

    #[arg(long)]
    pub reg_no: Option<String>,

    #[arg(long = "type", short = 't', value_parser = parse_vehicle_type)]
    pub vehicle_type: Option<VehicleType>,

    #[arg(long)]
    pub make: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long, value_parser = parse_year)]
    pub year: Option<i64>,

    #[arg(long)]
    pub owner: Option<String>,

    #[arg(long, value_parser = parse_usage)]
    pub used_for: Option<UsageCategory>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Vehicle ID (VEH_ID)
    pub veh_id: String,
}

/// Run a vehicle subcommand
pub fn run(cmd: VehicleCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        VehicleCommands::List(args) => run_list(args, global),
        VehicleCommands::Show(args) => run_show(args, global),
        VehicleCommands::New(args) => run_new(args, global),
        VehicleCommands::Edit(args) => run_edit(args, global),
        VehicleCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (workspace, config) = open_workspace(global)?;
    let store = open_store(&workspace, &config)?;

    let field = args.field.map(SearchField::Column).unwrap_or_default();
    let mut vehicles = store.query(field, args.search.as_deref())?;

    if args.count {
        println!("{}", vehicles.len());
        return Ok(());
    }

    if let Some(limit) = args.limit {
        vehicles.truncate(limit);
    }

    if vehicles.is_empty() {
        if !global.quiet {
            println!("No vehicles found.");
        }
        return Ok(());
    }

    let records: Vec<_> = vehicles.into_iter().map(|v| v.record).collect();
    print_vehicles(&records, global.format, global.quiet)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (workspace, config) = open_workspace(global)?;
    let store = open_store(&workspace, &config)?;

    let vehicle = store
        .get(&args.veh_id)?
        .ok_or_else(|| miette::miette!("No vehicle found with VEH_ID '{}'", args.veh_id))?;

    print_vehicle(&vehicle, global.format)
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (workspace, config) = open_workspace(global)?;
    let store = open_store(&workspace, &config)?;

    let record = if args.interactive {
        prompt_record(args)?
    } else {
        let veh_id = args
            .id
            .clone()
            .ok_or_else(|| miette::miette!("--id is required (or use --interactive)"))?;
        let vehicle_type = args
            .vehicle_type
            .ok_or_else(|| miette::miette!("--type is required (or use --interactive)"))?;
        build_record(veh_id, vehicle_type, &args)
    };

    if record.veh_id.trim().is_empty() {
        return Err(miette::miette!("VEH_ID cannot be empty"));
    }

    let existed = store.get(&record.veh_id)?.is_some();
    store.upsert(&record)?;

    if !global.quiet {
        let verb = if existed { "Updated" } else { "Created" };
        println!(
            "{} {} vehicle {} ({})",
            style("✓").green(),
            verb,
            style(&record.veh_id).cyan(),
            record.vehicle_type
        );
    }
    Ok(())
}

fn build_record(veh_id: String, vehicle_type: VehicleType, args: &NewArgs) -> VehicleRecord {
    let mut record = VehicleRecord::new(veh_id, vehicle_type);
    record.reg_no = args.reg_no.clone().unwrap_or_default();
    record.make = args.make.clone().unwrap_or_default();
    record.model = args.model.clone().unwrap_or_default();
    record.owner = args.owner.clone().unwrap_or_default();
    if let Some(year) = args.year {
        record.year = Some(year);
    }
    if let Some(used_for) = args.used_for {
        record.used_for = used_for.label().to_string();
    }
    record
}

fn prompt_record(args: NewArgs) -> Result<VehicleRecord> {
    let theme = ColorfulTheme::default();

    let veh_id = match args.id.clone() {
        Some(id) => id,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("VEH_ID")
            .interact_text()
            .into_diagnostic()?,
    };

    let vehicle_type = match args.vehicle_type {
        Some(vt) => vt,
        None => {
            let labels: Vec<_> = VehicleType::all().iter().map(|t| t.label()).collect();
            let idx = Select::with_theme(&theme)
                .with_prompt("Vehicle type")
                .items(&labels)
                .default(0)
                .interact()
                .into_diagnostic()?;
            VehicleType::all()[idx]
        }
    };

    let mut record = build_record(veh_id, vehicle_type, &args);

    let text = |prompt: &str, current: String| -> Result<String> {
        Input::<String>::with_theme(&theme)
            .with_prompt(prompt)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()
    };
    if args.reg_no.is_none() {
        record.reg_no = text("Registration number", record.reg_no)?;
    }
    if args.make.is_none() {
        record.make = text("Make", record.make)?;
    }
    if args.model.is_none() {
        record.model = text("Model", record.model)?;
    }
    if args.year.is_none() {
        let year = Input::<String>::with_theme(&theme)
            .with_prompt("Year")
            .default(record.year.map(|y| y.to_string()).unwrap_or_default())
            .validate_with(|input: &String| parse_year(input).map(|_| ()))
            .interact_text()
            .into_diagnostic()?;
        record.year = Some(parse_year(&year).map_err(|e| miette::miette!("{}", e))?);
    }
    if args.owner.is_none() {
        record.owner = text("Owner", record.owner)?;
    }
    if args.used_for.is_none() {
        let labels: Vec<_> = UsageCategory::all().iter().map(|u| u.label()).collect();
        let default = vehicle_type
            .default_usage()
            .and_then(|u| UsageCategory::all().iter().position(|c| *c == u))
            .unwrap_or(0);
        let idx = Select::with_theme(&theme)
            .with_prompt("Used for")
            .items(&labels)
            .default(default)
            .interact()
            .into_diagnostic()?;
        record.used_for = labels[idx].to_string();
    }

    Ok(record)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let (workspace, config) = open_workspace(global)?;
    let store = open_store(&workspace, &config)?;

    let patch = VehiclePatch {
        reg_no: args.reg_no,
        vehicle_type: args.vehicle_type,
        make: args.make,
        model: args.model,
        year: args.year,
        owner: args.owner,
        used_for: args.used_for,
    };
    if patch.is_empty() {
        return Err(miette::miette!(
            help = "pass at least one of --reg-no, --type, --make, --model, --year, --owner, --used-for",
            "Nothing to change for '{}'",
            args.veh_id
        ));
    }

    let mut vehicle = store
        .get(&args.veh_id)?
        .ok_or_else(|| miette::miette!("No vehicle found with VEH_ID '{}'", args.veh_id))?;
    patch.apply(&mut vehicle.record);
    store.upsert(&vehicle.record)?;

    if !global.quiet {
        println!(
            "{} Updated vehicle {}",
            style("✓").green(),
            style(&vehicle.record.veh_id).cyan()
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (workspace, config) = open_workspace(global)?;
    let store = open_store(&workspace, &config)?;

    if store.delete_by_veh_id(&args.veh_id)? {
        if !global.quiet {
            println!(
                "{} Deleted vehicle {}",
                style("✓").green(),
                style(&args.veh_id).cyan()
            );
        }
    } else {
        eprintln!(
            "{} No vehicle with VEH_ID '{}'; nothing deleted",
            style("!").yellow(),
            args.veh_id
        );
    }
    Ok(())
}
