//! Entity resolution for converted bibliographic N-Triples.
//!
//! `bfdedup-engine` takes a directory of BIBFRAME N-Triples files in which
//! every record minted its own IRIs for the people, topics, works and items
//! it mentions, and collapses duplicates onto one canonical IRI each.
//!
//! The run has three stages:
//!
//! 1. [`partition`](partition::partition) splits each file by entity type
//!    into one accumulating partition file per type.
//! 2. [`resolve`](resolve::resolve) computes an identity key for every
//!    resource of a partition and chooses a canonical IRI per key: an
//!    external authority IRI, a minted hash IRI, or the first-seen local IRI.
//! 3. [`rewrite`](rewrite::rewrite) applies the resulting
//!    [`RemappingTable`] to every input file.
//!
//! # Entry Point
//!
//! ```no_run
//! use bfdedup_engine::{pipeline, Context, RunPaths};
//!
//! let ctx = Context::standard("http://data.example.org/");
//! let paths = RunPaths::new("records", "deduped");
//! let outcome = pipeline::run(&paths, &ctx).expect("run failed");
//! println!("{} resources merged", outcome.report.stats.resources_merged);
//! ```
//!
//! # In-memory use
//!
//! ```
//! use bfdedup_engine::{ntriples, partition, resolve, rewrite, Context, EntityType};
//!
//! let ctx = Context::standard("http://data.example.org/");
//! let graph = ntriples::parse_str(concat!(
//!     "<http://data.example.org/p1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://bibframe.org/vocab/Person> .\n",
//!     "<http://data.example.org/p1> <http://bibframe.org/vocab/label> \"Twain, Mark\" .\n",
//!     "<http://data.example.org/p2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://bibframe.org/vocab/Person> .\n",
//!     "<http://data.example.org/p2> <http://bibframe.org/vocab/label> \"TWAIN, Mark.\" .\n",
//! ))
//! .unwrap();
//! let split = partition::split_graph(graph.clone(), &ctx);
//! let rule = ctx.registry.rule(EntityType::Person).unwrap();
//! let resolution = resolve::resolve_graph(rule, &split.by_type[&EntityType::Person], &ctx);
//! let rewritten = rewrite::rewrite_graph(&graph, &resolution.table);
//! // both type statements collapse into one; the two labels differ
//! assert_eq!(rewritten.len(), 3);
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod corpus;
pub mod entity;
pub mod error;
pub mod key;
pub mod mint;
pub mod model;
pub mod normalize;
pub mod ntriples;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod rewrite;
pub mod vocab;
pub mod writer;

pub use config::{Config, Context};
pub use corpus::Corpus;
pub use entity::{EntityRule, EntityType, KeyPolicy, MergeMode, Registry};
pub use error::{DedupError, Result};
pub use key::IdentityKey;
pub use model::{Graph, Literal, Node, Statement};
pub use normalize::NacoTable;
pub use pipeline::{RunOutcome, RunPaths};
pub use report::{Diagnostic, RunReport, RunStats, Severity};
pub use resolve::{Closure, RemappingTable, Resolution};
pub use vocab::Vocabulary;
