//! Render command implementation

use colored::Colorize;
use rsyslog_core::{ConvergenceRun, LogicalFile};

use super::Context;
use crate::error::{CliError, Result};

/// Print rendered files. A single `--file` prints bare content so it can be
/// redirected into place.
pub fn run_render(ctx: &Context, file: Option<LogicalFile>) -> Result<()> {
    let plan = ConvergenceRun::new(ctx.platform).plan(&ctx.tree)?;

    if let Some(id) = file {
        let rendered = plan.file(id).ok_or_else(|| {
            CliError::user(format!(
                "{} is not rendered for this configuration",
                id.file_name()
            ))
        })?;
        print!("{}", rendered.content);
        return Ok(());
    }

    for (index, rendered) in plan.files.iter().enumerate() {
        if index > 0 {
            println!();
        }
        println!(
            "{} {} {}",
            "==>".blue().bold(),
            rendered.path.display().to_string().yellow(),
            format!(
                "({}:{} {:o})",
                rendered.owner, rendered.group, rendered.mode
            )
            .dimmed()
        );
        print!("{}", rendered.content);
    }
    Ok(())
}
