//! Rename/placement executor for ranked duplicate group members
//!
//! Earlier passes over the same collections implemented several slightly
//! different rename schemes; this module is the single consolidated engine,
//! parameterized by a [`Disposition`] instead of parallel code paths.
//!
//! Target grammar under `rename-in-place`:
//! `<basename>_Size<rank>[_<W>x<H>]<ext>`; the resolution token is omitted
//! for the canonical (rank 1) member. When the original filename already
//! carries a `WxH` token, that literal token is reused rather than
//! reformatting the measured resolution, so pre-existing naming survives.
//!
//! Collision policy: probe `<name>-1`, `<name>-2`, ... until a free name is
//! found, up to a bounded number of attempts. Failures are reported to the
//! caller and the file stays where it was; a failed member never aborts the
//! run.

use crate::core::error::{DedupError, Result};
use crate::core::scope::Scope;
use crate::duplicate::resolver::RankedMember;
use clap::ValueEnum;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Where non-canonical duplicates end up. One mode per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    /// Rename every ranked member in place with the `_Size<rank>` grammar.
    #[default]
    RenameInPlace,
    /// Leave rank 1 untouched; move ranks >= 2 into the scope's
    /// `Duplicates` subfolder, keeping their original filenames.
    MoveToDuplicatesFolder,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::RenameInPlace => write!(f, "rename-in-place"),
            Disposition::MoveToDuplicatesFolder => write!(f, "move-to-duplicates-folder"),
        }
    }
}

/// Outcome of disposing one ranked member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposal {
    /// Renamed in place to the new path
    Renamed(PathBuf),
    /// Moved into the duplicates folder
    Moved(PathBuf),
    /// Left untouched (canonical member under move disposition, or a
    /// member that already carries a rank suffix from an earlier pass)
    Unchanged,
    /// Dry run: the path the member would have received
    Planned(PathBuf),
}

/// Computes collision-free target names and applies the rename/move.
///
/// Check-then-rename is not atomic, so disposal must stay serialized per
/// destination directory; the orchestrator calls this from a single thread.
pub struct Namer {
    disposition: Disposition,
    duplicates_dir: PathBuf,
    legacy_resolution_tokens: bool,
    collision_limit: u32,
    dry_run: bool,
    resolution_re: Regex,
    rank_suffix_re: Regex,
}

impl Namer {
    pub fn new(scope: &Scope, disposition: Disposition) -> Self {
        Self {
            disposition,
            duplicates_dir: scope.duplicates_dir(),
            legacy_resolution_tokens: true,
            collision_limit: 9_999,
            dry_run: false,
            resolution_re: Regex::new(r"\b\d+\s*x\s*\d+\b").expect("valid resolution pattern"),
            rank_suffix_re: Regex::new(r"_Size\d+").expect("valid rank suffix pattern"),
        }
    }

    /// Gate reuse of filename-embedded `WxH` tokens (legacy-name
    /// compatibility). Enabled by default.
    pub fn with_legacy_tokens(mut self, enabled: bool) -> Self {
        self.legacy_resolution_tokens = enabled;
        self
    }

    /// Bound the number of `-N` collision probes per member.
    pub fn with_collision_limit(mut self, limit: u32) -> Self {
        self.collision_limit = limit;
        self
    }

    /// Compute targets without touching the filesystem.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Dispose one ranked member according to the configured mode.
    ///
    /// On success the member's record path is updated to the new location
    /// (its single permitted mutation). Errors leave the file and the
    /// record untouched; the caller logs and continues with the rest of
    /// the group.
    pub fn dispose(&self, member: &mut RankedMember) -> Result<Disposal> {
        match self.disposition {
            Disposition::RenameInPlace => self.rename_in_place(member),
            Disposition::MoveToDuplicatesFolder => self.move_to_duplicates(member),
        }
    }

    fn rename_in_place(&self, member: &mut RankedMember) -> Result<Disposal> {
        let source = member.record.path.clone();
        let (dir, stem, ext) = split_path(&source)?;

        // A stem that already carries a rank suffix was disposed by an
        // earlier (possibly interrupted) pass; re-suffixing it would
        // compound the grammar.
        if self.rank_suffix_re.is_match(&stem) {
            debug!(
                "Skipping already-ranked file: {} (rank {})",
                source.display(),
                member.rank
            );
            return Ok(Disposal::Unchanged);
        }

        let mut new_stem = format!("{}_Size{}", stem, member.rank);
        if member.rank >= 2 {
            let token = self
                .legacy_token(&stem)
                .unwrap_or_else(|| member.record.resolution_token());
            new_stem.push('_');
            new_stem.push_str(&token);
        }

        let target = self.probe_free_name(&dir, &new_stem, &ext, &source)?;
        if self.dry_run {
            info!(
                "[dry-run] Would rename {} -> {}",
                source.display(),
                target.display()
            );
            return Ok(Disposal::Planned(target));
        }

        fs::rename(&source, &target).map_err(|e| DedupError::Filesystem {
            path: source.clone(),
            message: format!("rename to '{}' failed: {}", target.display(), e),
        })?;

        info!("Renamed {} -> {}", source.display(), target.display());
        member.record.path = target.clone();
        Ok(Disposal::Renamed(target))
    }

    fn move_to_duplicates(&self, member: &mut RankedMember) -> Result<Disposal> {
        if member.is_canonical() {
            return Ok(Disposal::Unchanged);
        }

        let source = member.record.path.clone();
        let (_, stem, ext) = split_path(&source)?;

        if !self.dry_run {
            fs::create_dir_all(&self.duplicates_dir).map_err(|e| DedupError::Filesystem {
                path: self.duplicates_dir.clone(),
                message: format!("failed to create duplicates folder: {}", e),
            })?;
        }

        let target = self.probe_free_name(&self.duplicates_dir, &stem, &ext, &source)?;
        if self.dry_run {
            info!(
                "[dry-run] Would move {} -> {}",
                source.display(),
                target.display()
            );
            return Ok(Disposal::Planned(target));
        }

        fs::rename(&source, &target).map_err(|e| DedupError::Filesystem {
            path: source.clone(),
            message: format!("move to '{}' failed: {}", target.display(), e),
        })?;

        info!("Moved duplicate {} -> {}", source.display(), target.display());
        member.record.path = target.clone();
        Ok(Disposal::Moved(target))
    }

    /// First free path for `<stem><ext>` in `dir`, probing `-N` counters.
    fn probe_free_name(&self, dir: &Path, stem: &str, ext: &str, source: &Path) -> Result<PathBuf> {
        let plain = dir.join(format!("{}{}", stem, ext));
        if !plain.exists() {
            return Ok(plain);
        }

        for n in 1..=self.collision_limit {
            let candidate = dir.join(format!("{}-{}{}", stem, n, ext));
            if !candidate.exists() {
                warn!(
                    "Target name occupied, using counter suffix: {}",
                    candidate.display()
                );
                return Ok(candidate);
            }
        }

        Err(DedupError::Filesystem {
            path: source.to_path_buf(),
            message: format!(
                "collision probing exhausted after {} attempts for '{}{}' in '{}'",
                self.collision_limit,
                stem,
                ext,
                dir.display()
            ),
        })
    }

    /// Literal `WxH` token from the filename stem, whitespace stripped.
    fn legacy_token(&self, stem: &str) -> Option<String> {
        if !self.legacy_resolution_tokens {
            return None;
        }
        self.resolution_re
            .find(stem)
            .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect())
    }
}

/// Split into (parent dir, stem, extension-with-dot).
fn split_path(path: &Path) -> Result<(PathBuf, String, String)> {
    let dir = path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| DedupError::Filesystem {
            path: path.to_path_buf(),
            message: "file has no usable name".to_string(),
        })?
        .to_string();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    Ok((dir, stem, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicate::index::ImageRecord;
    use std::fs;

    fn member(path: &Path, width: u32, height: u32, rank: usize) -> RankedMember {
        RankedMember {
            record: ImageRecord {
                path: path.to_path_buf(),
                fingerprint: 1,
                width,
                height,
                discovery_order: rank,
            },
            rank,
        }
    }

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_canonical_rename_omits_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let scope = Scope::new(dir.path());
        let source = dir.path().join("photoA_big.jpg");
        touch(&source);

        let namer = Namer::new(&scope, Disposition::RenameInPlace);
        let mut m = member(&source, 1920, 1080, 1);
        let disposal = namer.dispose(&mut m).unwrap();

        let expected = dir.path().join("photoA_big_Size1.jpg");
        assert_eq!(disposal, Disposal::Renamed(expected.clone()));
        assert!(expected.exists());
        assert!(!source.exists());
        assert_eq!(m.record.path, expected);
    }

    #[test]
    fn test_duplicate_rename_includes_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let scope = Scope::new(dir.path());
        let source = dir.path().join("photoA.jpg");
        touch(&source);

        let namer = Namer::new(&scope, Disposition::RenameInPlace);
        let mut m = member(&source, 640, 480, 2);
        namer.dispose(&mut m).unwrap();

        assert!(dir.path().join("photoA_Size2_640x480.jpg").exists());
    }

    #[test]
    fn test_legacy_token_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let scope = Scope::new(dir.path());
        let source = dir.path().join("scan 1024 x 768 copy.png");
        touch(&source);

        let namer = Namer::new(&scope, Disposition::RenameInPlace);
        // Measured resolution differs from the filename token; the literal
        // token wins, with whitespace stripped.
        let mut m = member(&source, 2048, 1536, 3);
        namer.dispose(&mut m).unwrap();

        assert!(dir
            .path()
            .join("scan 1024 x 768 copy_Size3_1024x768.png")
            .exists());
    }

    #[test]
    fn test_legacy_token_disabled_uses_measured_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let scope = Scope::new(dir.path());
        let source = dir.path().join("scan_1024x768.png");
        touch(&source);

        let namer = Namer::new(&scope, Disposition::RenameInPlace).with_legacy_tokens(false);
        let mut m = member(&source, 2048, 1536, 2);
        namer.dispose(&mut m).unwrap();

        assert!(dir.path().join("scan_1024x768_Size2_2048x1536.png").exists());
    }

    #[test]
    fn test_collision_appends_counter() {
        let dir = tempfile::tempdir().unwrap();
        let scope = Scope::new(dir.path());
        let source = dir.path().join("doc.jpg");
        touch(&source);
        // Both the plain target and the first counter slot are occupied.
        touch(&dir.path().join("doc_Size2_640x480.jpg"));
        touch(&dir.path().join("doc_Size2_640x480-1.jpg"));

        let namer = Namer::new(&scope, Disposition::RenameInPlace);
        let mut m = member(&source, 640, 480, 2);
        let disposal = namer.dispose(&mut m).unwrap();

        let expected = dir.path().join("doc_Size2_640x480-2.jpg");
        assert_eq!(disposal, Disposal::Renamed(expected.clone()));
        assert!(expected.exists());
    }

    #[test]
    fn test_collision_exhaustion_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let scope = Scope::new(dir.path());
        let source = dir.path().join("doc.jpg");
        touch(&source);
        touch(&dir.path().join("doc_Size2_640x480.jpg"));
        touch(&dir.path().join("doc_Size2_640x480-1.jpg"));

        let namer = Namer::new(&scope, Disposition::RenameInPlace).with_collision_limit(1);
        let mut m = member(&source, 640, 480, 2);
        let err = namer.dispose(&mut m).unwrap_err();

        assert_eq!(err.kind(), "filesystem");
        // The file stays put and the record is not mutated.
        assert!(source.exists());
        assert_eq!(m.record.path, source);
    }

    #[test]
    fn test_already_ranked_stem_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let scope = Scope::new(dir.path());
        let source = dir.path().join("photoA_Size1.jpg");
        touch(&source);

        let namer = Namer::new(&scope, Disposition::RenameInPlace);
        let mut m = member(&source, 1920, 1080, 1);
        assert_eq!(namer.dispose(&mut m).unwrap(), Disposal::Unchanged);
        assert!(source.exists());
    }

    #[test]
    fn test_move_disposition_keeps_canonical_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let scope = Scope::new(dir.path());
        let keep = dir.path().join("best.jpg");
        let dup = dir.path().join("worse.jpg");
        touch(&keep);
        touch(&dup);

        let namer = Namer::new(&scope, Disposition::MoveToDuplicatesFolder);

        let mut canonical = member(&keep, 1920, 1080, 1);
        assert_eq!(namer.dispose(&mut canonical).unwrap(), Disposal::Unchanged);
        assert!(keep.exists());

        let mut duplicate = member(&dup, 640, 480, 2);
        let disposal = namer.dispose(&mut duplicate).unwrap();
        let expected = scope.duplicates_dir().join("worse.jpg");
        assert_eq!(disposal, Disposal::Moved(expected.clone()));
        assert!(expected.exists());
        assert!(!dup.exists());
    }

    #[test]
    fn test_move_collision_in_duplicates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let scope = Scope::new(dir.path());
        let dup = dir.path().join("sub");
        fs::create_dir(&dup).unwrap();
        let source = dup.join("img.jpg");
        touch(&source);

        fs::create_dir_all(scope.duplicates_dir()).unwrap();
        touch(&scope.duplicates_dir().join("img.jpg"));

        let namer = Namer::new(&scope, Disposition::MoveToDuplicatesFolder);
        let mut m = member(&source, 640, 480, 2);
        let disposal = namer.dispose(&mut m).unwrap();

        assert_eq!(
            disposal,
            Disposal::Moved(scope.duplicates_dir().join("img-1.jpg"))
        );
    }

    #[test]
    fn test_dry_run_leaves_filesystem_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let scope = Scope::new(dir.path());
        let source = dir.path().join("photoA.jpg");
        touch(&source);

        let namer = Namer::new(&scope, Disposition::RenameInPlace).with_dry_run(true);
        let mut m = member(&source, 640, 480, 2);
        let disposal = namer.dispose(&mut m).unwrap();

        assert_eq!(
            disposal,
            Disposal::Planned(dir.path().join("photoA_Size2_640x480.jpg"))
        );
        assert!(source.exists());
        assert_eq!(m.record.path, source);
    }
}
