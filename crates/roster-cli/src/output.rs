//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use roster_core::{FieldEditOutcome, OutcomeStatus};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print one line per field edit, marking rejected edits with their reason.
pub fn outcomes(outcomes: &[FieldEditOutcome]) {
    for outcome in outcomes {
        let mark = match outcome.status {
            OutcomeStatus::Applied => "✓".green(),
            OutcomeStatus::Rejected => "✗".red(),
        };
        eprintln!("  {} {}", mark, describe_outcome(outcome));
    }
}

fn describe_outcome(outcome: &FieldEditOutcome) -> String {
    match (outcome.status, outcome.reason.as_deref()) {
        (OutcomeStatus::Applied, _) => format!("{} applied", outcome.field),
        (OutcomeStatus::Rejected, Some(reason)) => {
            format!("{} rejected: {}", outcome.field, reason)
        }
        (OutcomeStatus::Rejected, None) => format!("{} rejected", outcome.field),
    }
}
