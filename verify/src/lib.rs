//! Verification suite for finished bfdedup runs.
//!
//! Checks the files a run left behind, independently of the run's own
//! report.
//!
//! | Validator | Check |
//! |-----------|-------|
//! | `output/ntriples` | every line is one statement ending in ` .` |
//! | `output/set-semantics` | no file repeats a statement |
//! | `output/exhaustiveness` | no statement uses an IRI `remapping.tsv` sends elsewhere |
//! | `output/inferred` | `inferred.nt` exists, holds only `owl:sameAs`, no repeats |
//!
//! # Entry Point
//!
//! ```no_run
//! use bfdedup_verify::{run_all, RunDirs};
//! use std::path::PathBuf;
//!
//! let dirs = RunDirs {
//!     output: PathBuf::from("deduped"),
//!     work: PathBuf::from("deduped.work"),
//! };
//! let report = run_all(&dirs).expect("Failed to run verification");
//! assert!(report.is_clean());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod report;
pub mod validators;

pub use report::{Check, Evidence, Finding, Location, Tally, Verdict, VerifyReport};

/// Directories of a finished run.
#[derive(Debug, Clone)]
pub struct RunDirs {
    /// Output directory (rewritten files, `inferred.nt`).
    pub output: std::path::PathBuf,
    /// Work directory (`remapping.tsv`, partitions).
    pub work: std::path::PathBuf,
}

/// Runs all validators and returns the aggregated report.
///
/// # Errors
///
/// Returns an error only if a file system operation fails.
pub fn run_all(dirs: &RunDirs) -> anyhow::Result<VerifyReport> {
    let mut report = VerifyReport::new();
    for check in Check::ALL {
        let findings = match check {
            Check::NTriples => validators::ntriples::validate(&dirs.output)?,
            Check::SetSemantics => validators::set_semantics::validate(&dirs.output)?,
            Check::Exhaustiveness => validators::exhaustiveness::validate(&dirs.output, &dirs.work)?,
            Check::Inferred => validators::inferred::validate(&dirs.output)?,
        };
        report.merge(findings);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfdedup_engine::pipeline::{self, RunPaths};
    use bfdedup_engine::Context;

    #[test]
    fn a_real_run_verifies_clean() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir_all(&input).unwrap();
        let person = |id: &str| {
            format!(
                "<http://data.example.org/{id}> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://bibframe.org/vocab/Person> .\n\
                 <http://data.example.org/{id}> <http://bibframe.org/vocab/label> \"Twain, Mark\" .\n\
                 <http://data.example.org/w{id}> <http://bibframe.org/vocab/creator> <http://data.example.org/{id}> .\n"
            )
        };
        std::fs::write(input.join("a.nt"), person("p1")).unwrap();
        std::fs::write(input.join("b.nt"), person("p2")).unwrap();

        let paths = RunPaths::new(&input, dir.path().join("out"));
        pipeline::run(&paths, &Context::standard("http://data.example.org/")).unwrap();

        let report = run_all(&RunDirs {
            output: paths.output.clone(),
            work: paths.work.clone(),
        })
        .unwrap();
        let failures: Vec<_> = report.failures().collect();
        assert!(failures.is_empty(), "verification failures: {:#?}", failures);
    }

    #[test]
    fn a_tampered_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let work = dir.path().join("work");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::create_dir_all(&work).unwrap();
        std::fs::write(work.join("remapping.tsv"), "http://ex/b\thttp://ex/a\n").unwrap();
        std::fs::write(
            out.join("x.nt"),
            "<http://ex/b> <http://ex/p> \"v\" .\n<http://ex/b> <http://ex/p> \"v\" .\n",
        )
        .unwrap();
        let report = run_all(&RunDirs { output: out, work }).unwrap();
        let failed: Vec<Check> = report.failures().map(|f| f.check).collect();
        assert_eq!(
            failed,
            vec![Check::SetSemantics, Check::Exhaustiveness, Check::Inferred]
        );
    }
}
