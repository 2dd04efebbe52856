use bmc_state_core::{format_diff_text, format_summary};
use colored::Colorize;

use crate::outcome::ActionResult;

/// Render an action result for terminal output.
pub fn render_result(result: &ActionResult) -> String {
    let mut out = Vec::new();

    let summary = format_summary(result.changed, result.diff.as_ref());
    out.push(if result.failed {
        summary.red().to_string()
    } else if result.changed {
        summary.yellow().to_string()
    } else {
        summary.green().to_string()
    });

    if let Some(diff) = &result.diff {
        for line in format_diff_text(diff).lines() {
            out.push(line.yellow().to_string());
        }
    }

    if let Some(msg) = &result.msg {
        out.push(format!("{} {msg}", "error:".red().bold()));
    }

    out.join("\n")
}
