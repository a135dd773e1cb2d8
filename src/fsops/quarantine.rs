//! Quarantine of unreadable files
//!
//! Files the fingerprinter cannot decode are moved into a per-scope `Error`
//! folder, created on first use. The folder name is part of every scope's
//! exclusion set, so quarantined files are never re-walked. A same-named
//! file already in quarantine causes the move to be skipped with a logged
//! conflict; nothing is ever silently overwritten.

use crate::core::error::{DedupError, Result};
use crate::core::scope::Scope;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one quarantine request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuarantineOutcome {
    /// File moved into the error folder
    Moved(PathBuf),
    /// A same-named file already sits in quarantine; move skipped
    Conflict,
    /// Dry run: where the file would have gone
    Planned(PathBuf),
}

/// Moves unreadable files into the scope's error folder.
pub struct Quarantine {
    error_dir: PathBuf,
    dry_run: bool,
}

impl Quarantine {
    pub fn new(scope: &Scope) -> Self {
        Self {
            error_dir: scope.error_dir(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Move `path` into the error folder.
    ///
    /// The folder is created on first use. Conflicts are skipped and
    /// reported through the outcome, not as errors; the file stays where
    /// it was and the run continues.
    pub fn quarantine(&self, path: &Path) -> Result<QuarantineOutcome> {
        let name = path
            .file_name()
            .ok_or_else(|| DedupError::Filesystem {
                path: path.to_path_buf(),
                message: "file has no usable name".to_string(),
            })?;
        let dest = self.error_dir.join(name);

        if dest.exists() {
            warn!(
                "Quarantine conflict: '{}' already holds a file named '{}', leaving {} in place",
                self.error_dir.display(),
                name.to_string_lossy(),
                path.display()
            );
            return Ok(QuarantineOutcome::Conflict);
        }

        if self.dry_run {
            info!(
                "[dry-run] Would quarantine {} -> {}",
                path.display(),
                dest.display()
            );
            return Ok(QuarantineOutcome::Planned(dest));
        }

        fs::create_dir_all(&self.error_dir).map_err(|e| DedupError::Filesystem {
            path: self.error_dir.clone(),
            message: format!("failed to create quarantine folder: {}", e),
        })?;

        fs::rename(path, &dest).map_err(|e| DedupError::Filesystem {
            path: path.to_path_buf(),
            message: format!("quarantine move to '{}' failed: {}", dest.display(), e),
        })?;

        info!("Quarantined {} -> {}", path.display(), dest.display());
        Ok(QuarantineOutcome::Moved(dest))
    }
}
