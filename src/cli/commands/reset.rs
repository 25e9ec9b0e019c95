//! `fleet reset` command - Drop and recreate the vehicle table

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, open_workspace};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: ResetArgs, global: &GlobalOpts) -> Result<()> {
    let (workspace, config) = open_workspace(global)?;
    let store = open_store(&workspace, &config)?;
    let count = store.count()?;

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete all {} vehicle record(s)?", count))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("{}", style("Reset cancelled.").dim());
            return Ok(());
        }
    }

    store.reset()?;

    if !global.quiet {
        println!(
            "{} Removed {} vehicle record(s)",
            style("✓").green(),
            style(count).cyan()
        );
    }
    Ok(())
}
