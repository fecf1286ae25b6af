//! Writes N-Triples outputs and run artifacts.
//!
//! Whole-file outputs go to a `.tmp` sibling first and are renamed into
//! place, so a file under its final name is always complete. Partition files
//! grow by appending, one input file at a time.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{DedupError, Result};
use crate::model::{Graph, Statement};
use crate::ntriples;

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Creates a directory and its parents.
///
/// # Errors
///
/// Returns [`DedupError::Setup`] if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| DedupError::setup(dir, e))
}

/// Writes a text file atomically, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`DedupError::Setup`] if the directory cannot be created or the
/// file cannot be written.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, content).map_err(|e| DedupError::setup(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| DedupError::setup(path, e))
}

/// Writes a graph as N-Triples, atomically.
///
/// # Errors
///
/// Returns [`DedupError::Setup`] if the file cannot be written.
pub fn write_graph(path: &Path, graph: &Graph) -> Result<()> {
    write_text(path, &ntriples::to_ntriples(graph))
}

/// An N-Triples file that grows by appending.
#[derive(Debug)]
pub struct AppendSink {
    path: PathBuf,
    out: BufWriter<File>,
    written: usize,
}

impl AppendSink {
    /// Creates (or truncates) the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Setup`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| DedupError::setup(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            written: 0,
        })
    }

    /// Appends statements.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Setup`] if the write fails.
    pub fn append<'a>(&mut self, statements: impl IntoIterator<Item = &'a Statement>) -> Result<()> {
        let mut buf = String::new();
        for statement in statements {
            ntriples::push_statement(&mut buf, statement);
            self.written += 1;
        }
        self.out
            .write_all(buf.as_bytes())
            .map_err(|e| DedupError::setup(&self.path, e))
    }

    /// Number of statements appended so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Setup`] if the flush fails.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.out
            .flush()
            .map_err(|e| DedupError::setup(&self.path, e))?;
        Ok(self.path)
    }
}
