//! CLI output formatting for sync and plan runs.
//!
//! # Output Format
//!
//! One line per candidate, led by a fixed-width status word so the outcome
//! class is visible at a glance and easy to `grep`:
//!
//! ## Sync
//!
//! ```text
//! created  thumbnails/2023/beach.jpg (300x150)
//! skipped  thumbnails/cover.png
//! failed   images/2023/broken.jpg: Processing failed: Failed to decode ...
//!
//! 1 created, 1 skipped, 1 failed (3 total)
//! ```
//!
//! ## Plan
//!
//! ```text
//! create   thumbnails/2023/beach.jpg (4000x2000 → 300x150)
//! create   thumbnails/2023/odd.jpg (size unknown)
//! skip     thumbnails/cover.png
//! error    images/loop: Traversal error: ...
//! ```
//!
//! # Architecture
//!
//! Each kind of output has a `format_*` function (returns `String` or
//! `Vec<String>`) for testability and a `print_*` wrapper that writes to
//! stdout. Format functions do no I/O.

use crate::sync::{PlanStep, SyncOutcome, SyncSummary};
use std::path::Path;

/// Pad a status word to a fixed column.
fn status(word: &str) -> String {
    format!("{:<8} ", word)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

// ============================================================================
// Sync output
// ============================================================================

/// Format one sync outcome as a single display line.
///
/// Created and skipped lines show the thumbnail path; failed lines show the
/// source path and the error that stopped it.
pub fn format_outcome(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Created {
            destination,
            dimensions,
            ..
        } => format!("{}{} ({})", status("created"), display(destination), dimensions),
        SyncOutcome::Skipped { destination, .. } => {
            format!("{}{}", status("skipped"), display(destination))
        }
        SyncOutcome::Failed { path, error } => {
            format!("{}{}: {}", status("failed"), display(path), error)
        }
    }
}

/// Format the closing summary block.
pub fn format_summary(summary: &SyncSummary) -> Vec<String> {
    if summary.total() == 0 {
        return vec![String::new(), "No images found".to_string()];
    }
    vec![String::new(), summary.to_string()]
}

/// Print one outcome line to stdout.
pub fn print_outcome(outcome: &SyncOutcome) {
    println!("{}", format_outcome(outcome));
}

/// Print the summary block to stdout.
pub fn print_summary(summary: &SyncSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan output
// ============================================================================

/// Format a dry-run plan, one line per step.
pub fn format_plan(steps: &[PlanStep]) -> Vec<String> {
    let mut lines: Vec<String> = steps
        .iter()
        .map(|step| match step {
            PlanStep::Create {
                destination,
                dimensions: Some((source, thumbnail)),
                ..
            } => format!(
                "{}{} ({} \u{2192} {})",
                status("create"),
                display(destination),
                source,
                thumbnail
            ),
            PlanStep::Create {
                destination,
                dimensions: None,
                ..
            } => format!("{}{} (size unknown)", status("create"), display(destination)),
            PlanStep::Skip { destination, .. } => {
                format!("{}{}", status("skip"), display(destination))
            }
            PlanStep::Unreadable { path, error } => {
                format!("{}{}: {}", status("error"), display(path), error)
            }
        })
        .collect();

    let creates = steps
        .iter()
        .filter(|s| matches!(s, PlanStep::Create { .. }))
        .count();
    let skips = steps
        .iter()
        .filter(|s| matches!(s, PlanStep::Skip { .. }))
        .count();
    lines.push(String::new());
    lines.push(format!("Would create {}, skip {}", creates, skips));
    lines
}

/// Print a dry-run plan to stdout.
pub fn print_plan(steps: &[PlanStep]) {
    for line in format_plan(steps) {
        println!("{}", line);
    }
}
