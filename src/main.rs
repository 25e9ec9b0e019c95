use clap::Parser;
use fleet::cli::{Cli, Commands, GlobalOpts};
use fleet::core::{telemetry, Config, Workspace};
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    telemetry::init(&log_level(&global))?;

    match cli.command {
        Commands::Init(args) => fleet::cli::commands::init::run(args),
        Commands::Status(args) => fleet::cli::commands::status::run(args, &global),
        Commands::Vehicle(cmd) => fleet::cli::commands::vehicle::run(cmd, &global),
        Commands::Import(args) => fleet::cli::commands::import::run(args, &global),
        Commands::Generate(args) => fleet::cli::commands::generate::run(args, &global),
        Commands::Report(cmd) => fleet::cli::commands::report::run(cmd, &global),
        Commands::Reset(args) => fleet::cli::commands::reset::run(args, &global),
        Commands::Completions(args) => fleet::cli::commands::completions::run(args),
    }
}

/// `--verbose` and `--quiet` win over the configured level
fn log_level(global: &GlobalOpts) -> String {
    if global.verbose {
        return "debug".to_string();
    }
    if global.quiet {
        return "error".to_string();
    }
    let workspace = Workspace::locate(global.workspace.as_deref()).ok();
    Config::load(workspace.as_ref()).log_level().to_string()
}
