//! Run report types: diagnostics, severity levels, and stage counters.
//!
//! Every recoverable issue a stage meets (a skipped file, an authority whose
//! label disagrees with its host, a conflicting remap) becomes a
//! [`Diagnostic`]. The finished [`RunReport`] is written next to the output
//! as JSON.

use serde::Serialize;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational.
    Info,
    /// Recovered locally; output is complete but worth a look.
    Warning,
    /// A file was skipped.
    Error,
}

/// A single diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Stage that produced this diagnostic (`partition`, `resolve/Person`, ...).
    pub stage: String,
    /// Human-readable message.
    pub message: String,
    /// Severity.
    pub severity: Severity,
    /// Optional additional detail lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl Diagnostic {
    /// Creates an informational diagnostic.
    pub fn info(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            severity: Severity::Info,
            details: Vec::new(),
        }
    }

    /// Creates a warning.
    pub fn warn(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            severity: Severity::Warning,
            details: Vec::new(),
        }
    }

    /// Creates a warning with additional detail lines.
    pub fn warn_with_details(
        stage: impl Into<String>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            severity: Severity::Warning,
            details,
        }
    }

    /// Creates an error diagnostic.
    pub fn error(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            severity: Severity::Error,
            details: Vec::new(),
        }
    }

    /// Returns true if this diagnostic records a skipped file.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Input files read successfully by the partitioner.
    pub files_partitioned: usize,
    /// Input files skipped (malformed or empty).
    pub files_skipped: usize,
    /// Statements routed to the remainder partition.
    pub remainder_statements: usize,
    /// Typed resources examined by the resolver.
    pub resources_seen: usize,
    /// Resources that produced an identity key.
    pub resources_keyed: usize,
    /// Resources remapped to a different IRI.
    pub resources_merged: usize,
    /// Inferred statements emitted.
    pub inferred_statements: usize,
    /// Output files written by the rewriter.
    pub files_rewritten: usize,
}

impl RunStats {
    /// Adds every counter of `other` to this one.
    pub fn absorb(&mut self, other: &RunStats) {
        self.files_partitioned += other.files_partitioned;
        self.files_skipped += other.files_skipped;
        self.remainder_statements += other.remainder_statements;
        self.resources_seen += other.resources_seen;
        self.resources_keyed += other.resources_keyed;
        self.resources_merged += other.resources_merged;
        self.inferred_statements += other.inferred_statements;
        self.files_rewritten += other.files_rewritten;
    }
}

/// Aggregated diagnostics and counters from all stages.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// All diagnostics in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
    /// Counters.
    pub stats: RunStats,
}

impl RunReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Extends this report with the diagnostics and counters of another.
    pub fn extend(&mut self, other: RunReport) {
        self.diagnostics.extend(other.diagnostics);
        self.stats.absorb(&other.stats);
    }

    /// Returns the count of skipped-file diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Returns the count of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
