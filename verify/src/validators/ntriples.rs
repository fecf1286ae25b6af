//! Every line of every output file is one complete N-Triples statement.

use std::path::Path;

use anyhow::{Context, Result};
use bfdedup_engine::ntriples::parse_str;

use super::{display_name, output_files};
use crate::report::{Check, Evidence, Finding, VerifyReport};

/// Checks the statement shape of every `*.nt` file under `output`.
///
/// # Errors
///
/// Returns an error if an output file cannot be read.
pub fn validate(output: &Path) -> Result<VerifyReport> {
    let mut report = VerifyReport::new();
    let files = output_files(output)?;
    if files.is_empty() {
        report.record(Finding::failed(
            Check::NTriples,
            format!("no output files found in {}", output.display()),
            Vec::new(),
        ));
        return Ok(report);
    }

    let mut evidence = Vec::new();
    let mut lines = 0usize;
    for path in &files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = display_name(output, path);
        for (n, line) in content.lines().enumerate() {
            lines += 1;
            if let Some(problem) = check_line(line) {
                evidence.push(Evidence::line(&name, n + 1, problem));
            }
        }
    }

    if evidence.is_empty() {
        report.record(Finding::passed(
            Check::NTriples,
            format!("{lines} statement lines in {} files are well-formed", files.len()),
        ));
    } else {
        report.record(Finding::failed(
            Check::NTriples,
            format!("{} malformed lines", evidence.len()),
            evidence,
        ));
    }
    Ok(report)
}

fn check_line(line: &str) -> Option<String> {
    if !line.starts_with('<') {
        return Some("does not start with an IRI subject".to_string());
    }
    if !line.ends_with(" .") {
        return Some("does not end with ' .'".to_string());
    }
    match parse_str(line) {
        Ok(graph) if graph.len() == 1 => None,
        Ok(graph) => Some(format!("holds {} statements", graph.len())),
        Err(message) => Some(message),
    }
}
