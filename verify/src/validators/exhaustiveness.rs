//! No output statement mentions an IRI the remapping table sends elsewhere.

use std::path::Path;

use anyhow::{Context, Result};
use bfdedup_engine::ntriples::parse_str;
use bfdedup_engine::pipeline::REMAPPING_FILE;
use bfdedup_engine::{Node, RemappingTable};

use super::{display_name, output_files};
use crate::report::{Check, Evidence, Finding, VerifyReport};

const MAX_EVIDENCE: usize = 20;

/// Checks every output file against `<work>/remapping.tsv`.
///
/// Files that do not parse are left to the N-Triples validator.
///
/// # Errors
///
/// Returns an error if the table or an output file cannot be read.
pub fn validate(output: &Path, work: &Path) -> Result<VerifyReport> {
    let mut report = VerifyReport::new();
    let table_path = work.join(REMAPPING_FILE);
    if !table_path.exists() {
        report.record(Finding::failed(
            Check::Exhaustiveness,
            format!("{REMAPPING_FILE} not found in {}", work.display()),
            vec![Evidence::file(REMAPPING_FILE, "missing")],
        ));
        return Ok(report);
    }
    let tsv = std::fs::read_to_string(&table_path)
        .with_context(|| format!("Failed to read {}", table_path.display()))?;
    let table = match RemappingTable::from_tsv(&tsv) {
        Ok(table) => table,
        Err(line) => {
            report.record(Finding::failed(
                Check::Exhaustiveness,
                format!("{REMAPPING_FILE} is malformed"),
                vec![Evidence::file(REMAPPING_FILE, format!("bad entry {line}"))],
            ));
            return Ok(report);
        }
    };

    let mut evidence = Vec::new();
    for path in output_files(output)? {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let Ok(graph) = parse_str(&content) else {
            continue;
        };
        let name = display_name(output, &path);
        for statement in &graph {
            let object = match &statement.object {
                Node::Iri(iri) => Some(iri.as_str()),
                Node::Literal(_) => None,
            };
            for iri in std::iter::once(statement.subject.as_str()).chain(object) {
                if table.canonical(iri) != iri {
                    evidence.push(Evidence::file(
                        &name,
                        format!("<{iri}> should be <{}>", table.canonical(iri)),
                    ));
                }
            }
        }
    }

    if evidence.is_empty() {
        report.record(Finding::passed(
            Check::Exhaustiveness,
            format!("no output statement uses any of {} remapped IRIs", table.len()),
        ));
    } else {
        report.record(
            Finding::failed(
                Check::Exhaustiveness,
                format!("{} references to remapped IRIs survived rewriting", evidence.len()),
                evidence,
            )
            .cap_evidence(MAX_EVIDENCE),
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(table: &str, output: &str) -> (tempfile::TempDir, VerifyReport) {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let work = dir.path().join("work");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::create_dir_all(&work).unwrap();
        std::fs::write(work.join(REMAPPING_FILE), table).unwrap();
        std::fs::write(out.join("a.nt"), output).unwrap();
        let report = validate(&out, &work).unwrap();
        (dir, report)
    }

    #[test]
    fn canonical_output_passes() {
        let (_dir, report) = setup(
            "http://ex/p2\thttp://ex/p1\n",
            "<http://ex/w> <http://ex/creator> <http://ex/p1> .\n",
        );
        assert!(report.is_clean());
    }

    #[test]
    fn surviving_duplicate_iri_fails() {
        let (_dir, report) = setup(
            "http://ex/p2\thttp://ex/p1\n",
            "<http://ex/w> <http://ex/creator> <http://ex/p2> .\n",
        );
        let failure = report.failures().next().unwrap();
        assert_eq!(
            failure.evidence,
            vec![Evidence::file("a.nt", "<http://ex/p2> should be <http://ex/p1>")]
        );
    }

    #[test]
    fn missing_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let report = validate(dir.path(), dir.path()).unwrap();
        assert_eq!(report.tally().failed, 1);
    }
}
