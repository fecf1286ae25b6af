//! Input corpus discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{DedupError, Result};

/// File extension of corpus files.
pub const NTRIPLES_EXTENSION: &str = "nt";

/// The ordered list of N-Triples files under an input directory.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl Corpus {
    /// Walks `root` recursively and collects `*.nt` files in path order.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Setup`] if `root` or any directory below it
    /// cannot be read.
    pub fn from_dir(root: &Path) -> Result<Self> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                DedupError::setup(path, source)
            })?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().map(|x| x == NTRIPLES_EXTENSION).unwrap_or(false)
            {
                files.push(path.to_path_buf());
            }
        }
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Files in processing order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// `path` relative to the corpus root, for mirroring into an output tree.
    #[must_use]
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the corpus has no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
