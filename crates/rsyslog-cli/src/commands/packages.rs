//! Packages command implementation

use colored::Colorize;
use rsyslog_core::ConvergenceRun;

use super::Context;
use crate::error::Result;

pub fn run_packages(ctx: &Context, json: bool) -> Result<()> {
    let plan = ConvergenceRun::new(ctx.platform).plan(&ctx.tree)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan.packages)?);
        return Ok(());
    }

    for package in &plan.packages {
        println!("{}  {}", package.name.bold(), format!("({})", package.reason).dimmed());
    }
    Ok(())
}
