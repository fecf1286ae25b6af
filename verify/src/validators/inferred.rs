//! The inferred-statement file exists, holds only `owl:sameAs`, and has no
//! duplicates.

use std::path::Path;

use anyhow::{Context, Result};
use bfdedup_engine::ntriples::parse_str;
use bfdedup_engine::rewrite::INFERRED_FILE;
use bfdedup_engine::Vocabulary;

use super::set_semantics::duplicated_lines;
use crate::report::{Check, Evidence, Finding, VerifyReport};

/// Checks `<output>/inferred.nt`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn validate(output: &Path) -> Result<VerifyReport> {
    let mut report = VerifyReport::new();
    let path = output.join(INFERRED_FILE);
    if !path.exists() {
        report.record(Finding::failed(
            Check::Inferred,
            format!("{INFERRED_FILE} not found in {}", output.display()),
            vec![Evidence::file(INFERRED_FILE, "missing")],
        ));
        return Ok(report);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let duplicates = duplicated_lines(&content);
    if !duplicates.is_empty() {
        report.record(Finding::failed(
            Check::Inferred,
            format!("{INFERRED_FILE} repeats {} statements", duplicates.len()),
            duplicates
                .into_iter()
                .map(|(n, line)| Evidence::line(INFERRED_FILE, n, format!("repeats {line}")))
                .collect(),
        ));
    }

    let graph = match parse_str(&content) {
        Ok(graph) => graph,
        Err(message) => {
            report.record(Finding::failed(
                Check::Inferred,
                format!("{INFERRED_FILE} does not parse"),
                vec![Evidence::file(INFERRED_FILE, message)],
            ));
            return Ok(report);
        }
    };
    if graph.is_empty() {
        report.record(Finding::warning(
            Check::Inferred,
            format!("{INFERRED_FILE} is empty"),
            vec![Evidence::file(INFERRED_FILE, "no owl:sameAs statements were inferred")],
        ));
        return Ok(report);
    }

    let same_as = Vocabulary::bibframe().owl_same_as;
    let other: Vec<Evidence> = graph
        .iter()
        .filter(|s| s.predicate != same_as)
        .map(|s| Evidence::file(INFERRED_FILE, format!("unexpected {s}")))
        .collect();
    if other.is_empty() {
        report.record(Finding::passed(
            Check::Inferred,
            format!("{} owl:sameAs statements", graph.len()),
        ));
    } else {
        report.record(Finding::failed(
            Check::Inferred,
            format!("{} inferred statements are not owl:sameAs", other.len()),
            other,
        ));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Tally;

    const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let report = validate(dir.path()).unwrap();
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.evidence, vec![Evidence::file(INFERRED_FILE, "missing")]);
    }

    #[test]
    fn empty_file_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INFERRED_FILE), "").unwrap();
        let report = validate(dir.path()).unwrap();
        assert!(report.is_clean());
        assert_eq!(
            report.tally(),
            Tally {
                passed: 0,
                warnings: 1,
                failed: 0
            }
        );
    }

    #[test]
    fn same_as_statements_pass() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(INFERRED_FILE),
            format!("<http://ex/i1> <{SAME_AS}> <http://www.worldcat.org/oclc/1> .\n"),
        )
        .unwrap();
        assert_eq!(validate(dir.path()).unwrap().tally().passed, 1);
    }

    #[test]
    fn other_predicates_fail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(INFERRED_FILE),
            "<http://ex/i1> <http://ex/p> <http://ex/i2> .\n",
        )
        .unwrap();
        assert_eq!(validate(dir.path()).unwrap().tally().failed, 1);
    }
}
