//! Second pass: apply the remapping table to every input file.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::corpus::Corpus;
use crate::error::{DedupError, Result};
use crate::model::{Graph, Node, Statement};
use crate::ntriples;
use crate::report::{Diagnostic, RunReport};
use crate::resolve::RemappingTable;
use crate::writer::{ensure_dir, write_graph};

/// File name of the inferred-statement output.
pub const INFERRED_FILE: &str = "inferred.nt";

/// What the rewrite pass produced.
#[derive(Debug, Default)]
pub struct RewriteSummary {
    /// Rewritten files, in corpus order.
    pub outputs: Vec<PathBuf>,
    /// The inferred-statement file.
    pub inferred: PathBuf,
    /// Statements removed because rewriting made them identical to another.
    pub collapsed: usize,
    /// Diagnostics and counters.
    pub report: RunReport,
}

/// Substitutes subject and object IRIs through `table`.
///
/// Predicates and literals are never touched. The result is a set, so
/// statements that become identical collapse.
#[must_use]
pub fn rewrite_graph(graph: &Graph, table: &RemappingTable) -> Graph {
    graph
        .iter()
        .map(|s| {
            let object = match &s.object {
                Node::Iri(iri) => Node::iri(table.canonical(iri)),
                literal @ Node::Literal(_) => literal.clone(),
            };
            Statement::new(table.canonical(&s.subject), s.predicate.as_str(), object)
        })
        .collect()
}

/// Fails if a corpus file would be mirrored onto `<out>/inferred.nt`.
///
/// # Errors
///
/// Returns [`DedupError::Setup`] naming the reserved output path.
pub fn check_reserved(corpus: &Corpus, out: &Path) -> Result<()> {
    let reserved = Path::new(INFERRED_FILE);
    match corpus.files().iter().find(|f| corpus.relative(f) == reserved) {
        Some(file) => Err(DedupError::setup(
            out.join(INFERRED_FILE),
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!(
                    "input {} would be overwritten by the inferred statements; rename it",
                    file.display()
                ),
            ),
        )),
        None => Ok(()),
    }
}

/// Rewrites every file of `corpus` into `out`, mirroring relative paths,
/// and writes `inferred` once as [`INFERRED_FILE`].
///
/// Files that fail to parse are skipped and reported.
///
/// # Errors
///
/// Returns [`DedupError::Setup`] if an output file cannot be written, or
/// if the corpus holds a top-level `inferred.nt` (see [`check_reserved`]).
pub fn rewrite(
    corpus: &Corpus,
    table: &RemappingTable,
    inferred: &Graph,
    out: &Path,
) -> Result<RewriteSummary> {
    check_reserved(corpus, out)?;
    ensure_dir(out)?;
    let mut summary = RewriteSummary::default();

    for path in corpus.files() {
        let graph = match ntriples::read_file(path) {
            Ok(graph) => graph,
            Err(e) if e.is_per_file() => {
                error!(file = %path.display(), error = %e, "skipping input file");
                summary.report.push(Diagnostic::error("rewrite", e.to_string()));
                continue;
            }
            Err(e) => return Err(e),
        };
        let rewritten = rewrite_graph(&graph, table);
        let collapsed = graph.len() - rewritten.len();
        let target = out.join(corpus.relative(path));
        write_graph(&target, &rewritten)?;
        debug!(file = %target.display(), statements = rewritten.len(), collapsed, "rewritten");
        summary.collapsed += collapsed;
        summary.report.stats.files_rewritten += 1;
        summary.outputs.push(target);
    }

    summary.inferred = out.join(INFERRED_FILE);
    write_graph(&summary.inferred, inferred)?;

    info!(
        files = summary.report.stats.files_rewritten,
        collapsed = summary.collapsed,
        inferred = inferred.len(),
        "rewrite complete"
    );
    summary.report.push(Diagnostic::info(
        "rewrite",
        format!(
            "{} files rewritten, {} statements collapsed, {} inferred",
            summary.report.stats.files_rewritten,
            summary.collapsed,
            inferred.len()
        ),
    ));
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Literal;

    fn table() -> RemappingTable {
        let mut t = RemappingTable::new();
        t.insert("http://ex/p2", "http://ex/p1");
        t.insert("http://ex/p1", "http://ex/p1");
        t
    }

    #[test]
    fn subjects_and_objects_are_substituted() {
        let g: Graph = [
            Statement::link("http://ex/p2", "http://ex/p2", "http://ex/p2"),
            Statement::literal("http://ex/w", "http://ex/note", Literal::plain("http://ex/p2")),
        ]
        .into_iter()
        .collect();
        let out = rewrite_graph(&g, &table());
        assert!(out.contains(&Statement::link("http://ex/p1", "http://ex/p2", "http://ex/p1")));
        assert!(out.contains(&Statement::literal(
            "http://ex/w",
            "http://ex/note",
            Literal::plain("http://ex/p2")
        )));
    }

    #[test]
    fn merged_duplicates_collapse() {
        let g: Graph = [
            Statement::link("http://ex/w", "http://ex/creator", "http://ex/p1"),
            Statement::link("http://ex/w", "http://ex/creator", "http://ex/p2"),
        ]
        .into_iter()
        .collect();
        assert_eq!(rewrite_graph(&g, &table()).len(), 1);
    }

    #[test]
    fn rewriting_twice_changes_nothing() {
        let g: Graph = [Statement::link("http://ex/p2", "http://ex/knows", "http://ex/x")]
            .into_iter()
            .collect();
        let once = rewrite_graph(&g, &table());
        assert_eq!(rewrite_graph(&once, &table()), once);
    }

    #[test]
    fn output_mirrors_input_tree() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(input.path().join("sub")).unwrap();
        std::fs::write(
            input.path().join("sub").join("a.nt"),
            "<http://ex/p2> <http://ex/knows> <http://ex/x> .\n",
        )
        .unwrap();
        std::fs::write(input.path().join("broken.nt"), "<http://ex/a> .\n").unwrap();
        let corpus = Corpus::from_dir(input.path()).unwrap();
        let summary = rewrite(&corpus, &table(), &Graph::new(), out.path()).unwrap();
        assert_eq!(summary.report.stats.files_rewritten, 1);
        assert_eq!(summary.report.error_count(), 1);
        let text = std::fs::read_to_string(out.path().join("sub").join("a.nt")).unwrap();
        assert_eq!(text, "<http://ex/p1> <http://ex/knows> <http://ex/x> .\n");
        assert!(out.path().join(INFERRED_FILE).exists());
        assert!(summary
            .report
            .diagnostics
            .iter()
            .any(|d| d.severity == crate::report::Severity::Info && d.stage == "rewrite"));
    }

    #[test]
    fn input_on_the_inferred_path_is_refused() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(
            input.path().join(INFERRED_FILE),
            "<http://ex/a> <http://ex/note> \"keep me\" .\n",
        )
        .unwrap();
        let corpus = Corpus::from_dir(input.path()).unwrap();
        let err = rewrite(&corpus, &table(), &Graph::new(), out.path()).unwrap_err();
        assert!(matches!(err, DedupError::Setup { .. }));
        assert!(!out.path().join(INFERRED_FILE).exists());
    }

    #[test]
    fn nested_inferred_name_is_allowed() {
        let input = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(input.path().join("sub")).unwrap();
        std::fs::write(input.path().join("sub").join(INFERRED_FILE), "").unwrap();
        let corpus = Corpus::from_dir(input.path()).unwrap();
        assert!(check_reserved(&corpus, Path::new("out")).is_ok());
    }
}
