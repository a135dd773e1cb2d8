//! Directory traversal for one scope
//!
//! Walks the scope subtree and produces the candidate file list in a
//! deterministic (file-name sorted) order. Directories whose name is in the
//! scope's exclusion set are never descended into; files are included only
//! when their extension is on the allow-list and their name does not carry
//! the ignore marker. Inaccessible entries are logged and skipped, never
//! fatal.

use crate::core::scope::Scope;
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Collect every candidate file under the scope root.
///
/// The walk is finite and single-pass; the returned list is the full
/// discovery order for the run, so the caller knows the total up front and
/// can report monotonic progress against it.
pub fn collect_files(scope: &Scope) -> Vec<PathBuf> {
    WalkDir::new(scope.root())
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            // Never prune the root itself; exclusion matches directory
            // names, not the configured starting point.
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map(|name| !scope.is_excluded_folder(name))
                .unwrap_or(true)
        })
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!("Skipping inaccessible entry during walk: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            if scope.is_ignored_name(&name) {
                return false;
            }
            scope.matches_extension(entry.path())
        })
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_collects_allowed_extensions_recursively() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("sub/b.PNG"));
        touch(&dir.path().join("sub/deeper/c.tiff"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("noext"));

        let scope = Scope::new(dir.path());
        let files = collect_files(&scope);
        assert_eq!(files.len(), 3);
        assert!(files.iter().any(|p| p.ends_with("a.jpg")));
        assert!(files.iter().any(|p| p.ends_with("sub/b.PNG")));
        assert!(files.iter().any(|p| p.ends_with("sub/deeper/c.tiff")));
    }

    #[test]
    fn test_excluded_folders_are_not_descended() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("keep.jpg"));
        touch(&dir.path().join("Error/bad.jpg"));
        touch(&dir.path().join("Duplicates/dup.jpg"));
        touch(&dir.path().join("sub/Error/nested.jpg"));

        let scope = Scope::new(dir.path());
        let files = collect_files(&scope);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.jpg"));
    }

    #[test]
    fn test_exclusion_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("error/ok.jpg"));

        let scope = Scope::new(dir.path());
        let files = collect_files(&scope);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_ignore_marker_skips_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("seen.jpg"));
        touch(&dir.path().join("triaged.xxjpg"));
        // Marker check is independent of the extension check: with a marker
        // of ".old.jpg" this file still has an allowed extension.
        touch(&dir.path().join("legacy.old.jpg"));

        let scope = Scope::new(dir.path()).with_ignore_marker(".old.jpg");
        let files = collect_files(&scope);
        assert_eq!(files.len(), 2);
        assert!(!files.iter().any(|p| p.ends_with("legacy.old.jpg")));
    }

    #[test]
    fn test_order_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("c.jpg"));
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("b.jpg"));

        let scope = Scope::new(dir.path());
        let first = collect_files(&scope);
        let second = collect_files(&scope);
        assert_eq!(first, second);

        let names: Vec<_> = first
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }
}
