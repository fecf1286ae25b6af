//! Type partitioning.
//!
//! Each input file is split by entity type: for every rule in precedence
//! order, the statements about resources of that type, plus the statements
//! about resources one hop away along the rule's hop predicates, are taken
//! out of the file. Whatever no rule claims is the remainder. Taken
//! statements leave the file's working set, so a resource that matches
//! several rules lands in the first one only.
//!
//! Splits are appended to one accumulating file per type, so each type's
//! working set is bounded by that type's share of the corpus rather than by
//! the whole corpus.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::config::Context;
use crate::corpus::Corpus;
use crate::entity::EntityType;
use crate::error::{DedupError, Result};
use crate::model::{Graph, Statement};
use crate::ntriples;
use crate::report::{Diagnostic, RunReport};
use crate::writer::{ensure_dir, AppendSink};

/// File name of the remainder partition.
pub const REMAINDER_FILE: &str = "remainder.nt";

/// One file's statements, split by type.
#[derive(Debug, Default)]
pub struct Split {
    /// Statements claimed by each type.
    pub by_type: BTreeMap<EntityType, Graph>,
    /// Statements no rule claimed.
    pub remainder: Graph,
}

/// Splits one graph by the context's rules.
#[must_use]
pub fn split_graph(graph: Graph, ctx: &Context) -> Split {
    let mut remaining = graph;
    let mut by_type = BTreeMap::new();

    for rule in ctx.registry.rules() {
        let members: HashSet<String> = remaining
            .subjects_of_type(&ctx.vocab.rdf_type, &rule.class)
            .map(str::to_owned)
            .collect();
        if members.is_empty() {
            continue;
        }

        let mut claimed = members.clone();
        for statement in remaining.iter() {
            if members.contains(&statement.subject) && rule.hops.contains(&statement.predicate) {
                if let Some(target) = statement.object.as_iri() {
                    claimed.insert(target.to_owned());
                }
            }
        }

        let (taken, rest): (Vec<Statement>, Vec<Statement>) = remaining
            .into_iter()
            .partition(|s| claimed.contains(&s.subject));
        remaining = rest.into_iter().collect();
        by_type.insert(rule.entity_type, taken.into_iter().collect());
    }

    Split {
        by_type,
        remainder: remaining,
    }
}

/// One type's accumulated partition file.
#[derive(Debug, Clone)]
pub struct Partition {
    /// The type.
    pub entity_type: EntityType,
    /// Partition file.
    pub path: PathBuf,
    /// Statements appended (before cross-file de-duplication).
    pub statements: usize,
}

impl Partition {
    /// Loads the partition into memory.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Setup`] if the file cannot be read back.
    pub fn load(&self) -> Result<Graph> {
        if self.statements == 0 {
            return Ok(Graph::new());
        }
        ntriples::read_file(&self.path).map_err(|e| match e {
            DedupError::EmptyFile { path } => DedupError::setup(
                path,
                std::io::Error::other("partition file lost its statements"),
            ),
            DedupError::Parse { path, message } => {
                DedupError::setup(path, std::io::Error::other(message))
            }
            other => other,
        })
    }
}

/// All partitions of a corpus.
#[derive(Debug)]
pub struct Partitions {
    /// Directory holding the partition files.
    pub dir: PathBuf,
    /// Type partitions in precedence order.
    pub partitions: Vec<Partition>,
    /// Remainder partition file.
    pub remainder: PathBuf,
    /// Diagnostics and counters from partitioning.
    pub report: RunReport,
}

impl Partitions {
    /// The partition of `entity_type`, if registered.
    #[must_use]
    pub fn get(&self, entity_type: EntityType) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.entity_type == entity_type)
    }
}

/// Partitions every file of `corpus` into `dir`.
///
/// Partition files are truncated first. Malformed and empty input files
/// are skipped and reported.
///
/// # Errors
///
/// Returns [`DedupError::Setup`] if `dir` or a partition file cannot be
/// created or written.
pub fn partition(corpus: &Corpus, ctx: &Context, dir: &Path) -> Result<Partitions> {
    ensure_dir(dir)?;

    let mut sinks = Vec::new();
    for entity_type in ctx.registry.types() {
        let path = dir.join(format!("{entity_type}.{}", crate::corpus::NTRIPLES_EXTENSION));
        sinks.push((entity_type, AppendSink::create(&path)?));
    }
    let mut remainder = AppendSink::create(&dir.join(REMAINDER_FILE))?;
    let mut report = RunReport::new();

    for path in corpus.files() {
        let graph = match ntriples::read_file(path) {
            Ok(graph) => graph,
            Err(e) if e.is_per_file() => {
                error!(file = %path.display(), error = %e, "skipping input file");
                report.push(Diagnostic::error("partition", e.to_string()));
                report.stats.files_skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let statements = graph.len();
        let split = split_graph(graph, ctx);
        for (entity_type, sink) in &mut sinks {
            if let Some(part) = split.by_type.get(entity_type) {
                sink.append(part)?;
            }
        }
        remainder.append(&split.remainder)?;
        report.stats.files_partitioned += 1;
        report.stats.remainder_statements += split.remainder.len();
        debug!(
            file = %path.display(),
            statements,
            remainder = split.remainder.len(),
            "partitioned"
        );
    }

    let mut partitions = Vec::with_capacity(sinks.len());
    for (entity_type, sink) in sinks {
        let statements = sink.written();
        let path = sink.finish()?;
        partitions.push(Partition {
            entity_type,
            path,
            statements,
        });
    }
    let remainder = remainder.finish()?;

    info!(
        files = report.stats.files_partitioned,
        skipped = report.stats.files_skipped,
        remainder = report.stats.remainder_statements,
        "partitioning complete"
    );
    report.push(Diagnostic::info(
        "partition",
        format!(
            "{} files partitioned, {} skipped, {} statements in the remainder",
            report.stats.files_partitioned,
            report.stats.files_skipped,
            report.stats.remainder_statements
        ),
    ));

    Ok(Partitions {
        dir: dir.to_path_buf(),
        partitions,
        remainder,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Literal;

    const NS: &str = "http://data.example.org/";

    fn ctx() -> Context {
        Context::standard(NS)
    }

    fn typed(s: &str, class: &str) -> Statement {
        Statement::link(s, ctx().vocab.rdf_type, class)
    }

    #[test]
    fn statements_go_to_their_subject_type() {
        let c = ctx();
        let g: Graph = [
            typed("http://data.example.org/p1", &EntityType::Person.class_iri()),
            Statement::literal("http://data.example.org/p1", &c.vocab.label, Literal::plain("A")),
            typed("http://data.example.org/w1", &EntityType::Work.class_iri()),
            Statement::link("http://data.example.org/w1", "http://bibframe.org/vocab/creator", "http://data.example.org/p1"),
            Statement::literal("http://data.example.org/x", "http://ex/note", Literal::plain("n")),
        ]
        .into_iter()
        .collect();
        let split = split_graph(g, &c);
        assert_eq!(split.by_type[&EntityType::Person].len(), 2);
        assert_eq!(split.by_type[&EntityType::Work].len(), 2);
        assert_eq!(split.remainder.len(), 1);
    }

    #[test]
    fn hop_targets_follow_their_host() {
        let c = ctx();
        let g: Graph = [
            typed("http://data.example.org/t1", &EntityType::Topic.class_iri()),
            Statement::link("http://data.example.org/t1", &c.vocab.has_authority, "http://data.example.org/a1"),
            typed("http://data.example.org/a1", &EntityType::Authority.class_iri()),
            Statement::literal("http://data.example.org/a1", &c.vocab.authoritative_label, Literal::plain("Cats")),
        ]
        .into_iter()
        .collect();
        let split = split_graph(g, &c);
        assert_eq!(split.by_type[&EntityType::Topic].len(), 4);
        assert!(!split.by_type.contains_key(&EntityType::Authority));
    }

    #[test]
    fn multi_typed_resource_goes_to_first_rule_only() {
        let c = ctx();
        let g: Graph = [
            typed("http://data.example.org/t1", &EntityType::Topic.class_iri()),
            typed("http://data.example.org/t1", &EntityType::Authority.class_iri()),
        ]
        .into_iter()
        .collect();
        let split = split_graph(g, &c);
        assert_eq!(split.by_type[&EntityType::Topic].len(), 2);
        assert!(!split.by_type.contains_key(&EntityType::Authority));
    }

    #[test]
    fn partitions_accumulate_and_skip_bad_files() {
        let input = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let person = format!(
            "<{NS}p{{n}}> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://bibframe.org/vocab/Person> .\n"
        );
        std::fs::write(input.path().join("1.nt"), person.replace("{n}", "1")).unwrap();
        std::fs::write(input.path().join("2.nt"), person.replace("{n}", "2")).unwrap();
        std::fs::write(input.path().join("3.nt"), "not n-triples\n").unwrap();
        std::fs::write(input.path().join("4.nt"), "").unwrap();

        let corpus = Corpus::from_dir(input.path()).unwrap();
        let parts = partition(&corpus, &ctx(), work.path()).unwrap();
        assert_eq!(parts.report.stats.files_partitioned, 2);
        assert_eq!(parts.report.stats.files_skipped, 2);
        assert_eq!(parts.report.error_count(), 2);
        let persons = parts.get(EntityType::Person).unwrap();
        assert_eq!(persons.statements, 2);
        assert_eq!(persons.load().unwrap().len(), 2);
        assert!(parts.get(EntityType::Work).unwrap().load().unwrap().is_empty());
    }
}
