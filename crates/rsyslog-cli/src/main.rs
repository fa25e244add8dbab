//! rsyslog-converge CLI
//!
//! Validates rsyslog attributes, renders the daemon's configuration and
//! converges a host (or a staged root) onto it.

mod cli;
mod commands;
mod error;
mod logging;

use clap::{CommandFactory, Parser};
use colored::Colorize;

use cli::{Cli, Commands};
use commands::Context;
use commands::converge::ConvergeOptions;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    if let Commands::Completions { shell } = cli.command {
        let mut command = Cli::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        return Ok(());
    }

    let ctx = Context::load(cli.attributes.as_deref(), cli.family, cli.style)?;
    execute_command(&ctx, cli.command)
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Validate { json } => commands::run_validate(ctx, json),
        Commands::Packages { json } => commands::run_packages(ctx, json),
        Commands::Render { file } => commands::run_render(ctx, file),
        Commands::Diff { root, json } => commands::run_diff(ctx, root.as_ref(), json),
        Commands::Converge {
            root,
            dry_run,
            no_chown,
            json,
        } => commands::run_converge(
            ctx,
            &ConvergeOptions {
                root,
                dry_run,
                chown: !no_chown,
                json,
            },
        ),
        Commands::Completions { .. } => Ok(()),
    }
}
