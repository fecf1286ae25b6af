//! Findings of the verification suite.
//!
//! Each [`Check`] contributes one or more [`Finding`]s. A failing finding
//! carries [`Evidence`]: the file (and line, when known) that broke the
//! check, with a note saying what was found there.

use std::fmt;
use std::path::PathBuf;

/// The checks run over a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Check {
    /// Every output line is one N-Triples statement.
    NTriples,
    /// No output file repeats a statement.
    SetSemantics,
    /// No output statement uses a remapped IRI.
    Exhaustiveness,
    /// `inferred.nt` exists and holds only `owl:sameAs`.
    Inferred,
}

impl Check {
    /// All checks, in the order [`crate::run_all`] runs them.
    pub const ALL: [Check; 4] = [
        Check::NTriples,
        Check::SetSemantics,
        Check::Exhaustiveness,
        Check::Inferred,
    ];

    /// Stable identifier used in console output.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Check::NTriples => "output/ntriples",
            Check::SetSemantics => "output/set-semantics",
            Check::Exhaustiveness => "output/exhaustiveness",
            Check::Inferred => "output/inferred",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.id())
    }
}

/// Outcome of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The check held.
    Pass,
    /// Suspicious but not a violation.
    Warning,
    /// The check was violated.
    Failure,
}

impl Verdict {
    /// Fixed-width label for console output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Warning => "WARN",
            Verdict::Failure => "FAIL",
        }
    }
}

/// Where a piece of evidence was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A file, relative to the directory it was found in.
    File(PathBuf),
    /// A 1-based line of a file.
    Line(PathBuf, usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Line(path, line) => write!(f, "{}:{line}", path.display()),
        }
    }
}

/// One offending place and what is wrong there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    /// Where.
    pub location: Location,
    /// What.
    pub note: String,
}

impl Evidence {
    /// Evidence about a whole file.
    pub fn file(path: impl Into<PathBuf>, note: impl Into<String>) -> Self {
        Self {
            location: Location::File(path.into()),
            note: note.into(),
        }
    }

    /// Evidence about one line of a file.
    pub fn line(path: impl Into<PathBuf>, line: usize, note: impl Into<String>) -> Self {
        Self {
            location: Location::Line(path.into(), line),
            note: note.into(),
        }
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.note)
    }
}

/// What one check concluded.
#[derive(Debug, Clone)]
pub struct Finding {
    /// Check that produced it.
    pub check: Check,
    /// Outcome.
    pub verdict: Verdict,
    /// One-line summary.
    pub summary: String,
    /// Offending locations, possibly capped.
    pub evidence: Vec<Evidence>,
    /// Evidence dropped by [`Finding::cap_evidence`].
    pub omitted: usize,
}

impl Finding {
    fn new(check: Check, verdict: Verdict, summary: String, evidence: Vec<Evidence>) -> Self {
        Self {
            check,
            verdict,
            summary,
            evidence,
            omitted: 0,
        }
    }

    /// The check held.
    pub fn passed(check: Check, summary: impl Into<String>) -> Self {
        Self::new(check, Verdict::Pass, summary.into(), Vec::new())
    }

    /// The check held, with a caveat at `evidence`.
    pub fn warning(check: Check, summary: impl Into<String>, evidence: Vec<Evidence>) -> Self {
        Self::new(check, Verdict::Warning, summary.into(), evidence)
    }

    /// The check was violated at every place in `evidence`.
    pub fn failed(check: Check, summary: impl Into<String>, evidence: Vec<Evidence>) -> Self {
        Self::new(check, Verdict::Failure, summary.into(), evidence)
    }

    /// Keeps at most `max` pieces of evidence and counts the rest.
    #[must_use]
    pub fn cap_evidence(mut self, max: usize) -> Self {
        if self.evidence.len() > max {
            self.omitted += self.evidence.len() - max;
            self.evidence.truncate(max);
        }
        self
    }

    /// Returns true if the check was violated.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.verdict == Verdict::Failure
    }
}

/// Finding counts by verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Passing findings.
    pub passed: usize,
    /// Warnings.
    pub warnings: usize,
    /// Failures.
    pub failed: usize,
}

/// Every finding of a verification run.
#[derive(Debug, Default)]
pub struct VerifyReport {
    findings: Vec<Finding>,
}

impl VerifyReport {
    /// An empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finding.
    pub fn record(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Appends the findings of another report.
    pub fn merge(&mut self, other: VerifyReport) {
        self.findings.extend(other.findings);
    }

    /// All findings, in the order they were recorded.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings of one check.
    pub fn of(&self, check: Check) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.check == check)
    }

    /// Failing findings.
    pub fn failures(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_failure())
    }

    /// Counts by verdict.
    #[must_use]
    pub fn tally(&self) -> Tally {
        self.findings.iter().fold(Tally::default(), |mut t, f| {
            match f.verdict {
                Verdict::Pass => t.passed += 1,
                Verdict::Warning => t.warnings += 1,
                Verdict::Failure => t.failed += 1,
            }
            t
        })
    }

    /// Returns true if no check was violated.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}
