//! Diff command implementation
//!
//! Previews what converge would change without writing anything.

use std::path::PathBuf;

use colored::Colorize;
use rsyslog_core::{Convergence, ConvergenceRun};
use serde_json::json;

use super::{Context, filesystem};
use crate::error::Result;

pub fn run_diff(ctx: &Context, root: Option<&PathBuf>, json: bool) -> Result<()> {
    let fs = filesystem(root, false);
    let convergence = ConvergenceRun::new(ctx.platform).converge(&ctx.tree, &fs)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diff_json(&convergence))?);
    } else {
        print_diff_output(&convergence);
    }
    Ok(())
}

pub(crate) fn diff_json(convergence: &Convergence) -> serde_json::Value {
    let statuses = &convergence.report.changes;
    json!({
        "state": convergence.state,
        "restart_requested": convergence.restart_requested(),
        "changes": convergence
            .diffs()
            .into_iter()
            .zip(statuses)
            .map(|(diff, event)| json!({
                "file": diff.file,
                "path": diff.path,
                "status": event.status,
                "previous_checksum": event.previous_checksum,
                "current_checksum": event.current_checksum,
                "added": diff.stat.added,
                "removed": diff.stat.removed,
                "diff": diff.diff,
            }))
            .collect::<Vec<_>>(),
        "unchanged": convergence.report.unchanged,
    })
}

/// Print human-readable diff-style output
pub(crate) fn print_diff_output(convergence: &Convergence) {
    if convergence.is_clean() {
        println!(
            "{} No changes needed. Configuration is converged.",
            "OK".green().bold()
        );
        return;
    }

    for diff in convergence.diffs() {
        println!(
            "{} {} {}",
            "~".yellow(),
            diff.path.display().to_string().yellow(),
            format!("(+{} -{})", diff.stat.added, diff.stat.removed).dimmed()
        );
        for line in diff.diff.lines() {
            let colored = if line.starts_with("+++") || line.starts_with("---") {
                line.bold()
            } else if line.starts_with('+') {
                line.green()
            } else if line.starts_with('-') {
                line.red()
            } else if line.starts_with("@@") {
                line.cyan()
            } else {
                line.normal()
            };
            println!("{colored}");
        }
        println!();
    }

    println!(
        "{} {} file(s) would change; restart required",
        "Diff".blue().bold(),
        convergence.report.changes.len()
    );
}
