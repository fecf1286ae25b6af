//! `bfdedup`: collapses duplicate entities in a directory of BIBFRAME N-Triples.
//!
//! **Subcommands:**
//! - `run`: partition, resolve and rewrite the whole corpus
//! - `partition`: only split the corpus into per-type partition files
//! - `normalize`: print the normalized form of each label
//!
//! **Usage:**
//! ```
//! bfdedup run --input <dir> --output <dir> [--work <dir>] [--config <toml>]
//!             [--namespace <iri>] [--no-mint] [--verbose]
//! bfdedup partition --input <dir> --work <dir> [--config <toml>]
//! bfdedup normalize [--agent] <label>...
//! ```
//!
//! Logging goes to stderr and honours `RUST_LOG`.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use bfdedup_engine::normalize::{truncate_subdivision, DEFAULT_SUBDIVISION_DELIMITERS};
use bfdedup_engine::pipeline::{self, RunPaths};
use bfdedup_engine::{Config, Context, NacoTable};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Entity resolution for converted bibliographic N-Triples.
#[derive(Parser)]
#[command(name = "bfdedup", version, about = "Deduplicate BIBFRAME N-Triples entities")]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the whole pipeline.
    Run {
        /// Directory tree of input `*.nt` files.
        #[arg(long)]
        input: PathBuf,

        /// Directory for rewritten files.
        #[arg(long)]
        output: PathBuf,

        /// Directory for partitions and the remapping table
        /// (default: `<output>.work`).
        #[arg(long)]
        work: Option<PathBuf>,

        #[command(flatten)]
        settings: Settings,
    },

    /// Only partition the corpus.
    Partition {
        /// Directory tree of input `*.nt` files.
        #[arg(long)]
        input: PathBuf,

        /// Directory receiving `partitions/`.
        #[arg(long)]
        work: PathBuf,

        #[command(flatten)]
        settings: Settings,
    },

    /// Print normalized labels, one per line.
    Normalize {
        /// Cut each label at its first subdivision delimiter first, as
        /// agent labels are.
        #[arg(long)]
        agent: bool,

        /// Labels to normalize.
        #[arg(required = true)]
        labels: Vec<String>,
    },
}

/// Options shared by the pipeline subcommands.
#[derive(Args)]
struct Settings {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Local namespace (overrides `namespace.local`).
    #[arg(long)]
    namespace: Option<String>,

    /// Keep the first-seen local IRI instead of minting hash IRIs.
    #[arg(long)]
    no_mint: bool,
}

impl Settings {
    fn context(&self) -> Result<Context> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(namespace) = &self.namespace {
            config.namespace.local.clone_from(namespace);
        }
        if self.no_mint {
            config.namespace.mint = false;
        }
        Context::from_config(&config).context("Invalid configuration")
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "bfdedup=debug" } else { "bfdedup=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Command::Run {
            input,
            output,
            work,
            settings,
        } => {
            let ctx = settings.context()?;
            let mut paths = RunPaths::new(input, output);
            if let Some(work) = work {
                paths = paths.with_work(work);
            }
            info!(namespace = %ctx.local_namespace, mint = ctx.mint, "starting run");
            let outcome = pipeline::run(&paths, &ctx).with_context(|| {
                format!("Run failed for input {}", paths.input.display())
            })?;

            let stats = &outcome.report.stats;
            println!("bfdedup run");
            println!("  Files rewritten: {}", stats.files_rewritten);
            println!("  Files skipped:   {}", stats.files_skipped);
            println!("  Resources seen:  {}", stats.resources_seen);
            println!("  Merged:          {}", stats.resources_merged);
            println!("  Inferred:        {}", stats.inferred_statements);
            println!("  Warnings:        {}", outcome.report.warning_count());
            println!("  Output:          {}", paths.output.display());
            println!("  Remapping table: {}", paths.remapping_file().display());
            println!("  Report:          {}", paths.report_file().display());
        }
        Command::Partition {
            input,
            work,
            settings,
        } => {
            let ctx = settings.context()?;
            let partitions = pipeline::run_partition(&input, &work, &ctx)
                .with_context(|| format!("Partitioning failed for input {}", input.display()))?;
            for part in &partitions.partitions {
                if part.statements > 0 {
                    println!("  {:<14} {:>9}  {}", part.entity_type, part.statements, part.path.display());
                }
            }
            println!(
                "  {:<14} {:>9}  {}",
                "remainder",
                partitions.report.stats.remainder_statements,
                partitions.remainder.display()
            );
            if partitions.report.stats.files_skipped > 0 {
                eprintln!(
                    "{} input file(s) skipped; see the log for details.",
                    partitions.report.stats.files_skipped
                );
            }
        }
        Command::Normalize { agent, labels } => {
            let naco = NacoTable::standard();
            for label in &labels {
                let text = if agent {
                    truncate_subdivision(label, DEFAULT_SUBDIVISION_DELIMITERS)
                } else {
                    label.as_str()
                };
                println!("{}", naco.normalize(text));
            }
        }
    }

    Ok(())
}
