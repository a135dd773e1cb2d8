//! Scope: one directory subtree processed as an atomic unit
//!
//! A scope bundles the root path with its exclusion set (folder names that
//! are never traversed), the extension allow-list, the ignore marker for
//! files triaged by an earlier pass, and the completion suffix appended to
//! the folder name once a run finishes. The quarantine folder name is
//! always part of the exclusion set so quarantined files are never
//! re-walked.

use crate::core::error::{DedupError, Result};
use log::info;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Folder that receives unreadable files, created inside the scope root.
pub const ERROR_FOLDER: &str = "Error";

/// Folder that receives non-canonical duplicates under the
/// move-to-duplicates-folder disposition.
pub const DUPLICATES_FOLDER: &str = "Duplicates";

/// Suffix appended to a scope's folder name once a run completes, so a
/// batch pass over sibling folders does not reselect it.
pub const DEFAULT_COMPLETION_SUFFIX: &str = "_Done";

/// Trailing marker on filenames already triaged by an earlier pass.
pub const DEFAULT_IGNORE_MARKER: &str = ".xxjpg";

/// Image extensions considered for fingerprinting (lowercase, no dot).
pub fn default_allowed_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "bmp", "gif", "tiff"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Folder names never traversed. `Error` and `Duplicates` are produced by
/// this tool; the rest are category folders produced by the downstream
/// classification pipeline.
pub fn default_excluded_folders() -> Vec<String> {
    [
        ERROR_FOLDER,
        DUPLICATES_FOLDER,
        "Document",
        "Screenshot",
        "Meme",
        "Photograph",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// One directory subtree plus its processing rules.
#[derive(Debug, Clone)]
pub struct Scope {
    root: PathBuf,
    allowed_extensions: Vec<String>,
    excluded_folders: HashSet<String>,
    ignore_marker: String,
    completion_suffix: String,
}

impl Scope {
    /// Create a scope rooted at `root` with default rules.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        let mut excluded: HashSet<String> = default_excluded_folders().into_iter().collect();
        excluded.insert(ERROR_FOLDER.to_string());

        Self {
            root: root.into(),
            allowed_extensions: default_allowed_extensions(),
            excluded_folders: excluded,
            ignore_marker: DEFAULT_IGNORE_MARKER.to_string(),
            completion_suffix: DEFAULT_COMPLETION_SUFFIX.to_string(),
        }
    }

    /// Replace the extension allow-list (entries compared case-insensitively).
    pub fn with_allowed_extensions(mut self, extensions: &[String]) -> Self {
        self.allowed_extensions = extensions.iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Replace the excluded folder set. The quarantine folder is re-added
    /// unconditionally; it must never be re-walked.
    pub fn with_excluded_folders(mut self, folders: &[String]) -> Self {
        self.excluded_folders = folders.iter().cloned().collect();
        self.excluded_folders.insert(ERROR_FOLDER.to_string());
        self
    }

    pub fn with_ignore_marker(mut self, marker: &str) -> Self {
        self.ignore_marker = marker.to_lowercase();
        self
    }

    pub fn with_completion_suffix(mut self, suffix: &str) -> Self {
        self.completion_suffix = suffix.to_string();
        self
    }

    /// Fail fast if the configured root is missing. Fatal for this scope
    /// only; a batch driver catches it and proceeds to the next scope.
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(DedupError::ScopeNotFound(self.root.clone()));
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Quarantine destination for this scope (not created here).
    pub fn error_dir(&self) -> PathBuf {
        self.root.join(ERROR_FOLDER)
    }

    /// Duplicates destination for this scope (not created here).
    pub fn duplicates_dir(&self) -> PathBuf {
        self.root.join(DUPLICATES_FOLDER)
    }

    /// Case-sensitive exact match against the exclusion set.
    pub fn is_excluded_folder(&self, name: &str) -> bool {
        self.excluded_folders.contains(name)
    }

    /// Whether the file's extension is in the allow-list (case-insensitive).
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .map(|e| self.allowed_extensions.iter().any(|a| a == &e))
            .unwrap_or(false)
    }

    /// Whether the filename carries the trailing ignore marker.
    pub fn is_ignored_name(&self, name: &str) -> bool {
        !self.ignore_marker.is_empty() && name.to_lowercase().ends_with(&self.ignore_marker)
    }

    pub fn completion_suffix(&self) -> &str {
        &self.completion_suffix
    }

    /// Whether the scope folder already carries the completion marker.
    pub fn is_complete(&self) -> bool {
        self.root
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(&self.completion_suffix))
            .unwrap_or(false)
    }

    /// Append the completion marker to the scope's folder name.
    ///
    /// Idempotent: a root that already carries the marker is returned
    /// unchanged, so an interrupted-and-rerun scope never accumulates
    /// multiple markers.
    pub fn mark_complete(&self) -> Result<PathBuf> {
        if self.is_complete() {
            return Ok(self.root.clone());
        }

        let name = self
            .root
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DedupError::Filesystem {
                path: self.root.clone(),
                message: "scope root has no folder name".to_string(),
            })?;

        let target = self
            .root
            .with_file_name(format!("{}{}", name, self.completion_suffix));

        fs::rename(&self.root, &target).map_err(|e| DedupError::Filesystem {
            path: self.root.clone(),
            message: format!("failed to mark scope complete: {}", e),
        })?;

        info!(
            "Marked scope complete: {} -> {}",
            self.root.display(),
            target.display()
        );
        Ok(target)
    }
}
