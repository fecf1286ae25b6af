//! `bfdedup-verify`: checks the output of a finished `bfdedup run`.
//!
//! Runs the verification suite over the output and work directories:
//! N-Triples shape, set semantics, remapping exhaustiveness and the
//! inferred-statement file.
//!
//! **Usage:**
//! ```
//! bfdedup-verify --output <dir> [--work <dir>]
//! ```
//!
//! Exits non-zero if any check fails.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use bfdedup_engine::pipeline::default_work_dir;
use bfdedup_verify::{run_all, RunDirs};
use clap::Parser;

/// Verify a finished bfdedup run.
#[derive(Parser)]
#[command(name = "bfdedup-verify", version, about = "Verify the output of a bfdedup run")]
struct Args {
    /// Output directory of the run.
    #[arg(long)]
    output: PathBuf,

    /// Work directory of the run (default: `<output>.work`).
    #[arg(long)]
    work: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let work = args
        .work
        .unwrap_or_else(|| default_work_dir(&args.output));
    let dirs = RunDirs {
        output: args.output,
        work,
    };

    let report = run_all(&dirs)
        .with_context(|| format!("Failed to verify {}", dirs.output.display()))?;

    println!("bfdedup Verification Report");
    println!("===========================");
    println!();

    for finding in report.findings() {
        println!("[{}] {}: {}", finding.verdict.label(), finding.check, finding.summary);
        for evidence in &finding.evidence {
            println!("       {evidence}");
        }
        if finding.omitted > 0 {
            println!("       ... and {} more", finding.omitted);
        }
    }

    let tally = report.tally();
    println!();
    println!(
        "Summary: {} passed, {} warnings, {} failed",
        tally.passed, tally.warnings, tally.failed
    );

    if tally.failed > 0 {
        eprintln!("Verification FAILED: {} check(s) did not pass.", tally.failed);
        process::exit(1);
    }

    println!("Verification PASSED.");
    Ok(())
}
