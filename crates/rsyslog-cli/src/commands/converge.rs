//! Converge command implementation

use std::path::PathBuf;

use colored::Colorize;
use rsyslog_core::ConvergenceRun;
use serde_json::json;

use super::diff::{diff_json, print_diff_output};
use super::{Context, filesystem};
use crate::error::Result;

/// Options for the converge command
#[derive(Debug, Clone, Default)]
pub struct ConvergeOptions {
    pub root: Option<PathBuf>,
    pub dry_run: bool,
    pub chown: bool,
    pub json: bool,
}

pub fn run_converge(ctx: &Context, options: &ConvergeOptions) -> Result<()> {
    let fs = filesystem(options.root.as_ref(), options.chown);
    let convergence = ConvergenceRun::new(ctx.platform).converge(&ctx.tree, &fs)?;
    let service = ctx.platform.family.profile().service_name;

    if options.dry_run {
        if options.json {
            let mut output = diff_json(&convergence);
            output["dry_run"] = json!(true);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", "[dry-run] No files will be written".yellow());
            print_diff_output(&convergence);
        }
        return Ok(());
    }

    let outcome = convergence.apply(&fs)?;

    if options.json {
        let output = json!({
            "state": convergence.state,
            "packages": convergence.plan.packages,
            "directories": outcome.directories,
            "written": outcome.written,
            "restart_requested": outcome.restart_requested,
            "service": service,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for path in &outcome.written {
        println!("{} {}", "wrote".green(), path.display());
    }
    if outcome.restart_requested {
        println!(
            "{} {} file(s) changed; restart {}",
            "Converged".green().bold(),
            outcome.written.len(),
            service.cyan()
        );
    } else {
        println!(
            "{} No changes needed. Configuration is converged.",
            "OK".green().bold()
        );
    }
    Ok(())
}
