//! The full run: partition, resolve every partition, rewrite.
//!
//! Run layout:
//!
//! | Path | Content |
//! |------|---------|
//! | `<work>/partitions/<Type>.nt` | accumulated type partitions |
//! | `<work>/partitions/remainder.nt` | unclaimed statements |
//! | `<work>/remapping.tsv` | `original\tcanonical`, remaps only |
//! | `<output>/<relative path>` | one rewritten file per input file |
//! | `<output>/inferred.nt` | inferred `owl:sameAs` statements |
//! | `<output>/run-report.json` | diagnostics and counters |

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Context;
use crate::corpus::Corpus;
use crate::error::{DedupError, Result};
use crate::model::Graph;
use crate::partition::{partition, Partitions};
use crate::report::{Diagnostic, RunReport};
use crate::resolve::{resolve, Closure, RemappingTable, Resolution};
use crate::rewrite::{check_reserved, rewrite};
use crate::writer::write_text;

/// Subdirectory of the work directory holding partition files.
pub const PARTITIONS_DIR: &str = "partitions";
/// Remapping table file in the work directory.
pub const REMAPPING_FILE: &str = "remapping.tsv";
/// Run report file in the output directory.
pub const REPORT_FILE: &str = "run-report.json";

/// Input, output, and work locations of a run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    /// Directory tree of input `*.nt` files.
    pub input: PathBuf,
    /// Directory receiving rewritten files.
    pub output: PathBuf,
    /// Directory receiving partitions and the remapping table.
    pub work: PathBuf,
}

impl RunPaths {
    /// Paths with the default work directory, a `.work` sibling of the
    /// output directory.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let output = output.into();
        let work = default_work_dir(&output);
        Self {
            input: input.into(),
            output,
            work,
        }
    }

    /// Overrides the work directory.
    #[must_use]
    pub fn with_work(mut self, work: impl Into<PathBuf>) -> Self {
        self.work = work.into();
        self
    }

    /// `<work>/partitions`.
    #[must_use]
    pub fn partitions_dir(&self) -> PathBuf {
        self.work.join(PARTITIONS_DIR)
    }

    /// `<work>/remapping.tsv`.
    #[must_use]
    pub fn remapping_file(&self) -> PathBuf {
        self.work.join(REMAPPING_FILE)
    }

    /// `<output>/run-report.json`.
    #[must_use]
    pub fn report_file(&self) -> PathBuf {
        self.output.join(REPORT_FILE)
    }
}

/// The default work directory of `output`: `<output>.work`, beside it.
#[must_use]
pub fn default_work_dir(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".work");
    output.with_file_name(name)
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// Final remapping table, chains collapsed.
    pub table: RemappingTable,
    /// Inferred statements.
    pub inferred: Graph,
    /// Rewritten files.
    pub outputs: Vec<PathBuf>,
    /// Diagnostics and counters of all stages.
    pub report: RunReport,
}

/// Runs only the partition stage, into `<work>/partitions`.
///
/// # Errors
///
/// Returns [`DedupError::Setup`] if the input directory cannot be read or
/// the partition directory cannot be written.
pub fn run_partition(input: &Path, work: &Path, ctx: &Context) -> Result<Partitions> {
    log_precedence(ctx);
    let corpus = Corpus::from_dir(input)?;
    info!(input = %input.display(), files = corpus.len(), "corpus discovered");
    partition(&corpus, ctx, &work.join(PARTITIONS_DIR))
}

/// Runs the whole pipeline.
///
/// # Errors
///
/// Returns [`DedupError::Setup`] if an input, work, or output location
/// cannot be read or written, or if an input file would be overwritten by
/// `inferred.nt`. Malformed and empty input files are not errors; they are
/// skipped and listed in the report.
pub fn run(paths: &RunPaths, ctx: &Context) -> Result<RunOutcome> {
    log_precedence(ctx);
    let corpus = Corpus::from_dir(&paths.input)?;
    info!(input = %paths.input.display(), files = corpus.len(), "corpus discovered");
    check_reserved(&corpus, &paths.output)?;

    let partitions = partition(&corpus, ctx, &paths.partitions_dir())?;
    let mut report = partitions.report;

    let mut resolution = Resolution::new();
    for part in &partitions.partitions {
        resolution.absorb(resolve(part, ctx)?);
    }
    let Resolution {
        mut table,
        inferred,
        report: resolve_report,
    } = resolution;
    report.extend(resolve_report);

    let closure = table.close();
    if closure.collapsed > 0 {
        debug!(entries = closure.collapsed, "collapsed remap chains");
    }
    if let Some(diagnostic) = cycle_warning(&closure, &table) {
        warn!(entries = closure.cyclic.len(), "remap cycles left unresolved");
        report.push(diagnostic);
    }
    write_text(&paths.remapping_file(), &table.to_tsv())?;
    info!(
        entries = table.len(),
        remaps = table.remaps().count(),
        file = %paths.remapping_file().display(),
        "remapping table written"
    );

    let summary = rewrite(&corpus, &table, &inferred, &paths.output)?;
    report.extend(summary.report);
    report.stats.inferred_statements = inferred.len();

    let report_file = paths.report_file();
    let json = report
        .to_json()
        .map_err(|e| DedupError::setup(&report_file, std::io::Error::other(e)))?;
    write_text(&report_file, &json)?;

    info!(
        files = report.stats.files_rewritten,
        skipped = report.stats.files_skipped,
        merged = report.stats.resources_merged,
        inferred = report.stats.inferred_statements,
        warnings = report.warning_count(),
        "run complete"
    );

    Ok(RunOutcome {
        table,
        inferred,
        outputs: summary.outputs,
        report,
    })
}

fn cycle_warning(closure: &Closure, table: &RemappingTable) -> Option<Diagnostic> {
    if closure.cyclic.is_empty() {
        return None;
    }
    Some(Diagnostic::warn_with_details(
        "close",
        format!(
            "{} remapping entries run into a cycle; output will still mention them",
            closure.cyclic.len()
        ),
        closure
            .cyclic
            .iter()
            .map(|iri| format!("{iri} -> {}", table.canonical(iri)))
            .collect(),
    ))
}

fn log_precedence(ctx: &Context) {
    let order: Vec<&str> = ctx.registry.types().map(|t| t.as_str()).collect();
    info!(order = %order.join(", "), "partition precedence");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_work_dir_is_an_output_sibling() {
        let paths = RunPaths::new("/data/in", "/data/out");
        assert_eq!(paths.work, PathBuf::from("/data/out.work"));
        assert_eq!(paths.partitions_dir(), PathBuf::from("/data/out.work/partitions"));
        assert_eq!(paths.report_file(), PathBuf::from("/data/out/run-report.json"));
    }

    #[test]
    fn explicit_work_dir_wins() {
        let paths = RunPaths::new("in", "out").with_work("scratch");
        assert_eq!(paths.remapping_file(), PathBuf::from("scratch/remapping.tsv"));
    }

    #[test]
    fn remap_cycles_become_a_warning() {
        let mut table = RemappingTable::new();
        table.insert("http://ex/a", "http://ex/b");
        table.insert("http://ex/b", "http://ex/a");
        let closure = table.close();
        let diagnostic = cycle_warning(&closure, &table).unwrap();
        assert_eq!(diagnostic.stage, "close");
        assert_eq!(
            diagnostic.details,
            vec!["http://ex/a -> http://ex/b", "http://ex/b -> http://ex/a"]
        );

        let mut acyclic = RemappingTable::new();
        acyclic.insert("http://ex/x", "http://ex/y");
        assert!(cycle_warning(&acyclic.close(), &acyclic).is_none());
    }

    #[test]
    fn missing_input_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = RunPaths::new(dir.path().join("absent"), dir.path().join("out"));
        let err = run(&paths, &Context::standard("http://data.example.org/")).unwrap_err();
        assert!(matches!(err, DedupError::Setup { .. }));
    }
}
