//! Validate command implementation

use colored::Colorize;
use rsyslog_core::{AttributeResolver, ConstraintValidator};
use serde_json::json;

use super::Context;
use crate::error::Result;

/// Resolve and validate; a violation is returned as the command error.
pub fn run_validate(ctx: &Context, json: bool) -> Result<()> {
    let config = AttributeResolver::new(ctx.platform).resolve(&ctx.tree);
    let verdict = ConstraintValidator::new().validate(&config);

    if json {
        let output = match &verdict {
            Ok(()) => json!({
                "valid": true,
                "platform": config.platform,
                "config": config,
            }),
            Err(violation) => json!({
                "valid": false,
                "attribute": violation.attribute,
                "message": violation.message,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if verdict.is_ok() {
        println!(
            "{} Configuration is valid ({} / {})",
            "OK".green().bold(),
            config.platform.family.to_string().cyan(),
            config.platform.style.to_string().cyan()
        );
    }

    verdict.map_err(|violation| rsyslog_core::Error::from(violation).into())
}
