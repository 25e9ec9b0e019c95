//! `fleet init` command - Initialize a new fleet workspace

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::store::VehicleStore;
use crate::core::workspace::{Workspace, WorkspaceError};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite the workspace config even if .fleet/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let workspace = if args.force {
        Workspace::init_force(&path)
    } else {
        Workspace::init(&path)
    };

    match workspace {
        Ok(workspace) => {
            let config = Config::load(Some(&workspace));
            let database = config.database_path(&workspace);
            VehicleStore::open(&database)?;

            println!(
                "{} Initialized fleet workspace at {}",
                style("✓").green(),
                style(workspace.root().display()).cyan()
            );
            println!();
            println!("Created workspace structure:");
            print_structure(workspace.root(), &database);
            println!();
            println!("Next steps:");
            println!(
                "  {} Import an existing fleet spreadsheet",
                style("fleet import vehicles.xlsx").yellow()
            );
            println!(
                "  {} Generate placeholder vehicles",
                style("fleet generate --count compactor=5").yellow()
            );
            println!(
                "  {} Print a report for one vehicle type",
                style("fleet report type compactor").yellow()
            );
            Ok(())
        }
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} Fleet workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("fleet init --force").yellow());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_structure(root: &Path, database: &Path) {
    let fleet_dir = root.join(crate::core::workspace::FLEET_DIR);
    let entries = [fleet_dir.clone(), fleet_dir.join("config.yaml"), database.to_path_buf()];

    for entry in entries {
        if entry.exists() {
            let shown = entry.strip_prefix(root).unwrap_or(&entry);
            let prefix = if entry.is_dir() { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(shown.display()).dim());
        }
    }
}
