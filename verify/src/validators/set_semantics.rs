//! No output file repeats a statement.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use super::{display_name, output_files};
use crate::report::{Check, Evidence, Finding, VerifyReport};

/// Checks every `*.nt` file under `output` for duplicated lines.
///
/// # Errors
///
/// Returns an error if an output file cannot be read.
pub fn validate(output: &Path) -> Result<VerifyReport> {
    let mut report = VerifyReport::new();
    let mut evidence = Vec::new();
    let files = output_files(output)?;
    for path in &files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = display_name(output, path);
        evidence.extend(
            duplicated_lines(&content)
                .into_iter()
                .map(|(n, line)| Evidence::line(&name, n, format!("repeats {line}"))),
        );
    }

    if evidence.is_empty() {
        report.record(Finding::passed(
            Check::SetSemantics,
            format!("no duplicated statements in {} files", files.len()),
        ));
    } else {
        report.record(Finding::failed(
            Check::SetSemantics,
            format!("{} duplicated statements", evidence.len()),
            evidence,
        ));
    }
    Ok(report)
}

/// Lines that occur more than once, each reported once at the 1-based line
/// number of its first repeat.
pub(crate) fn duplicated_lines(content: &str) -> Vec<(usize, &str)> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .filter(|(_, line)| !seen.insert(*line) && reported.insert(*line))
        .map(|(n, line)| (n + 1, line))
        .collect()
}
