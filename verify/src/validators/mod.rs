//! Validators over a finished run's output and work directories.

pub mod exhaustiveness;
pub mod inferred;
pub mod ntriples;
pub mod set_semantics;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bfdedup_engine::corpus::NTRIPLES_EXTENSION;
use walkdir::WalkDir;

/// Every `*.nt` file under `output`, sorted by path.
///
/// # Errors
///
/// Returns an error if `output` cannot be walked.
pub fn output_files(output: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(output).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to walk {}", output.display()))?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().map(|x| x == NTRIPLES_EXTENSION).unwrap_or(false)
        {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// `path` relative to `root`, for evidence locations.
pub(crate) fn display_name(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
