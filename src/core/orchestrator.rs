//! End-to-end processing of one scope, and the batch driver
//!
//! Sequence for one scope: validate the root, walk the subtree for the full
//! candidate list (which fixes the progress total), fingerprint every file
//! (optionally in parallel), then in a single thread insert successes into
//! the index, quarantine unreadables, rank each duplicate group, and
//! dispose each ranked member. On completion the scope folder receives its
//! completion marker so a later batch pass skips it.
//!
//! Filesystem check-then-rename is not atomic, so everything that mutates
//! the tree (quarantine and disposition) runs after the parallel
//! fingerprint phase, on the calling thread.

use crate::core::config::Config;
use crate::core::error::{DedupError, Result};
use crate::core::scope::Scope;
use crate::duplicate::fingerprint::{
    fingerprint_file, fingerprint_file_bounded, fingerprint_hex, Fingerprinted,
};
use crate::duplicate::index::{HashIndex, ImageRecord};
use crate::duplicate::resolver;
use crate::fsops::namer::{Disposal, Disposition, Namer};
use crate::fsops::quarantine::{Quarantine, QuarantineOutcome};
use crate::fsops::walker;
use log::{error, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Per-run options distilled from config + CLI flags.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub disposition: Disposition,
    pub dry_run: bool,
    pub legacy_resolution_tokens: bool,
    pub collision_limit: u32,
    pub parallel: bool,
    pub decode_timeout: Duration,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            disposition: config.disposition.mode,
            dry_run: false,
            legacy_resolution_tokens: config.naming.legacy_resolution_tokens,
            collision_limit: config.naming.collision_limit,
            parallel: config.performance.parallel,
            decode_timeout: Duration::from_secs(config.performance.decode_timeout_secs),
        }
    }

    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// What happened during one scope run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Scope root as configured (before any completion rename)
    pub scope: String,
    /// Candidate files found by the walk
    pub discovered: usize,
    /// Files actually fingerprinted or quarantined
    pub processed: usize,
    /// Duplicate groups (two or more members)
    pub groups: usize,
    /// Non-canonical members across all groups
    pub duplicates: usize,
    /// Files renamed in place
    pub renamed: usize,
    /// Files moved into the duplicates folder
    pub moved: usize,
    /// Dry run: dispositions that would have happened
    pub planned: usize,
    /// Unreadable files moved to quarantine
    pub quarantined: usize,
    /// Quarantine moves skipped because of a same-name conflict
    pub quarantine_conflicts: usize,
    /// Non-fatal errors (failed renames/moves, quarantine failures)
    pub errors: usize,
    /// Run stopped early by a shutdown request
    pub interrupted: bool,
    /// RFC 3339 timestamp taken when the run finished
    pub finished_at: String,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

/// Per-file outcome of the fingerprint phase. `None` means the file was
/// skipped because shutdown was requested before it was reached.
type HashOutcome = Option<Result<Fingerprinted>>;

/// Run one scope end-to-end.
///
/// `progress` is invoked as `(processed, total)` after each file of the
/// fingerprint phase; the count is monotonic and reaches the total unless
/// the run is interrupted.
///
/// # Errors
///
/// Fails fast with [`DedupError::ScopeNotFound`] when the root is missing.
/// Everything else is logged, counted in the report, and survives.
pub fn run_scope<F>(
    scope: &Scope,
    options: &RunOptions,
    shutdown: &AtomicBool,
    progress: F,
) -> Result<RunReport>
where
    F: Fn(usize, usize) + Send + Sync,
{
    scope.validate()?;
    let start = Instant::now();

    let files = walker::collect_files(scope);
    let total = files.len();
    info!(
        "Scope {}: discovered {} candidate file(s)",
        scope.root().display(),
        total
    );

    let mut report = RunReport {
        scope: scope.root().display().to_string(),
        discovered: total,
        ..Default::default()
    };

    // Phase 1: fingerprint (pure, read-only, safe to parallelize).
    let processed = AtomicUsize::new(0);
    let hash_one = |path: &PathBuf| -> HashOutcome {
        if shutdown.load(Ordering::SeqCst) {
            return None;
        }
        let result = if options.parallel {
            fingerprint_file_bounded(path, options.decode_timeout)
        } else {
            fingerprint_file(path)
        };
        let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
        progress(done, total);
        Some(result)
    };

    let outcomes: Vec<HashOutcome> = if options.parallel {
        files.par_iter().map(hash_one).collect()
    } else {
        files.iter().map(hash_one).collect()
    };
    report.processed = processed.load(Ordering::Relaxed);

    // Phase 2: serialized index building and quarantine, in discovery order.
    let quarantine = Quarantine::new(scope).with_dry_run(options.dry_run);
    let mut index = HashIndex::new();

    for (discovery_order, (path, outcome)) in files.iter().zip(outcomes).enumerate() {
        match outcome {
            None => {}
            Some(Ok(hashed)) => {
                index.insert(ImageRecord {
                    path: path.clone(),
                    fingerprint: hashed.fingerprint,
                    width: hashed.width,
                    height: hashed.height,
                    discovery_order,
                });
            }
            Some(Err(err @ DedupError::Unreadable { .. })) => {
                warn!(
                    "Unreadable file (kind={}): {} -> quarantine",
                    err.kind(),
                    path.display()
                );
                match quarantine.quarantine(path) {
                    Ok(QuarantineOutcome::Moved(_)) => report.quarantined += 1,
                    Ok(QuarantineOutcome::Planned(_)) => report.quarantined += 1,
                    Ok(QuarantineOutcome::Conflict) => report.quarantine_conflicts += 1,
                    Err(qerr) => {
                        error!(
                            "Quarantine failed (kind={}): {} left in place: {}",
                            qerr.kind(),
                            path.display(),
                            qerr
                        );
                        report.errors += 1;
                    }
                }
            }
            Some(Err(err)) => {
                error!(
                    "Failed to process (kind={}): {}: {}",
                    err.kind(),
                    path.display(),
                    err
                );
                report.errors += 1;
            }
        }
    }

    if shutdown.load(Ordering::SeqCst) {
        info!(
            "Scope {} interrupted after {} of {} file(s); already-disposed files stay disposed",
            scope.root().display(),
            report.processed,
            total
        );
        report.interrupted = true;
        return Ok(finish(report, start));
    }

    // Phase 3: group, rank, dispose (still serialized).
    let namer = Namer::new(scope, options.disposition)
        .with_legacy_tokens(options.legacy_resolution_tokens)
        .with_collision_limit(options.collision_limit)
        .with_dry_run(options.dry_run);

    let groups = index.groups_with_duplicates();
    report.groups = groups.len();

    for group in groups {
        if shutdown.load(Ordering::SeqCst) {
            report.interrupted = true;
            break;
        }

        info!(
            "Duplicate group {} with {} member(s)",
            fingerprint_hex(group.fingerprint),
            group.members.len()
        );

        for mut member in resolver::rank(group) {
            if member.rank >= 2 {
                report.duplicates += 1;
            }
            match namer.dispose(&mut member) {
                Ok(Disposal::Renamed(_)) => report.renamed += 1,
                Ok(Disposal::Moved(_)) => report.moved += 1,
                Ok(Disposal::Planned(_)) => report.planned += 1,
                Ok(Disposal::Unchanged) => {}
                Err(err) => {
                    error!(
                        "Disposition failed (kind={}): {} left at original location: {}",
                        err.kind(),
                        member.record.path.display(),
                        err
                    );
                    report.errors += 1;
                }
            }
        }
    }

    // Mark the scope so a later batch pass does not reselect it. Skipped
    // for dry runs and interrupted runs; those scopes stay eligible.
    if !options.dry_run && !report.interrupted {
        if let Err(err) = scope.mark_complete() {
            error!(
                "Could not mark scope complete (kind={}): {}",
                err.kind(),
                err
            );
            report.errors += 1;
        }
    }

    Ok(finish(report, start))
}

fn finish(mut report: RunReport, start: Instant) -> RunReport {
    report.duration_ms = start.elapsed().as_millis() as u64;
    report.finished_at = chrono::Utc::now().to_rfc3339();
    report
}

/// Summary of a batch pass over sibling scopes.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub scopes_run: usize,
    pub scopes_skipped: usize,
    pub scopes_failed: usize,
    pub reports: Vec<RunReport>,
}

/// Process every eligible subfolder of `parent` as its own scope.
///
/// Subfolders already carrying the completion marker, and subfolders whose
/// name is in the excluded set, are skipped. A scope's fatal error is
/// logged and the driver proceeds to the next scope; it never aborts the
/// batch. `progress` is invoked as `(scope_root, processed, total)`.
pub fn run_batch<F>(
    parent: &Path,
    config: &Config,
    options: &RunOptions,
    shutdown: &AtomicBool,
    progress: F,
) -> Result<BatchSummary>
where
    F: Fn(&Path, usize, usize) + Send + Sync,
{
    if !parent.is_dir() {
        return Err(DedupError::ScopeNotFound(parent.to_path_buf()));
    }

    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(parent)
        .map_err(|e| DedupError::Io(format!("failed to list '{}': {}", parent.display(), e)))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();

    let mut summary = BatchSummary::default();

    for subdir in subdirs {
        if shutdown.load(Ordering::SeqCst) {
            info!("Batch interrupted; remaining scopes left unprocessed");
            break;
        }

        let name = subdir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let scope = config.scope_for(&subdir);

        if scope.is_complete() || config.scan.excluded_folders.contains(&name) {
            info!("Skipping scope {}", subdir.display());
            summary.scopes_skipped += 1;
            continue;
        }

        info!("Processing scope {}", subdir.display());
        match run_scope(&scope, options, shutdown, |done, total| {
            progress(&subdir, done, total)
        }) {
            Ok(report) => {
                summary.scopes_run += 1;
                summary.reports.push(report);
            }
            Err(err) => {
                error!(
                    "Scope failed (kind={}): {}: {}",
                    err.kind(),
                    subdir.display(),
                    err
                );
                summary.scopes_failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::fs;

    /// Quadrant pattern at the given resolution; identical coarse content
    /// regardless of size, so re-scaled copies fingerprint identically.
    fn quadrants(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = if (x < width / 2) == (y < height / 2) {
                    255
                } else {
                    0
                };
                img.put_pixel(x, y, Rgb([v, v, v]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = ((x + y) * 255 / (width + height)) as u8;
                img.put_pixel(x, y, Rgb([v, v, v]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    /// A scope folder holding one duplicate pair (same content, two
    /// resolutions), one distinct image, and one corrupt file.
    fn build_scope_dir(parent: &Path) -> PathBuf {
        let root = parent.join("batch01");
        fs::create_dir(&root).unwrap();
        quadrants(256, 256).save(root.join("big.png")).unwrap();
        quadrants(64, 64).save(root.join("small.png")).unwrap();
        gradient(64, 64).save(root.join("other.png")).unwrap();
        fs::write(root.join("bad.jpg"), b"not an image at all").unwrap();
        root
    }

    fn sequential_options() -> RunOptions {
        RunOptions::from_config(&Config::default()).with_dry_run(false)
    }

    fn count_files_recursively(dir: &Path) -> usize {
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count()
    }

    #[test]
    fn test_full_run_renames_and_quarantines() {
        let parent = tempfile::tempdir().unwrap();
        let root = build_scope_dir(parent.path());
        let scope = Scope::new(&root);
        let shutdown = AtomicBool::new(false);

        let report = run_scope(&scope, &sequential_options(), &shutdown, |_, _| {}).unwrap();

        assert_eq!(report.discovered, 4);
        assert_eq!(report.processed, 4);
        assert_eq!(report.groups, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.renamed, 2);
        assert_eq!(report.quarantined, 1);
        assert_eq!(report.errors, 0);
        assert!(!report.interrupted);

        // Scope folder carries the completion marker now.
        let done_root = parent.path().join("batch01_Done");
        assert!(done_root.is_dir());

        // Canonical member is the larger copy; the smaller one carries its
        // own basename, rank, and measured resolution.
        assert!(done_root.join("big_Size1.png").exists());
        assert!(done_root.join("small_Size2_64x64.png").exists());
        // Singleton group: untouched.
        assert!(done_root.join("other.png").exists());
        // Unreadable file quarantined.
        assert!(done_root.join("Error").join("bad.jpg").exists());
    }

    #[test]
    fn test_no_data_loss_across_all_locations() {
        let parent = tempfile::tempdir().unwrap();
        let root = build_scope_dir(parent.path());
        let before = count_files_recursively(&root);

        let scope = Scope::new(&root);
        let shutdown = AtomicBool::new(false);
        run_scope(&scope, &sequential_options(), &shutdown, |_, _| {}).unwrap();

        let after = count_files_recursively(&parent.path().join("batch01_Done"));
        assert_eq!(before, after);
    }

    #[test]
    fn test_progress_is_monotonic_and_reaches_total() {
        let parent = tempfile::tempdir().unwrap();
        let root = build_scope_dir(parent.path());
        let scope = Scope::new(&root);
        let shutdown = AtomicBool::new(false);

        let seen = std::sync::Mutex::new(Vec::new());
        let mut options = sequential_options();
        options.parallel = false;
        run_scope(&scope, &options, &shutdown, |done, total| {
            seen.lock().unwrap().push((done, total));
        })
        .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.last(), Some(&(4, 4)));
        assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_move_disposition_leaves_canonical_untouched() {
        let parent = tempfile::tempdir().unwrap();
        let root = build_scope_dir(parent.path());
        let scope = Scope::new(&root);
        let shutdown = AtomicBool::new(false);
        let options = sequential_options().with_disposition(Disposition::MoveToDuplicatesFolder);

        let report = run_scope(&scope, &options, &shutdown, |_, _| {}).unwrap();

        assert_eq!(report.moved, 1);
        assert_eq!(report.renamed, 0);

        let done_root = parent.path().join("batch01_Done");
        assert!(done_root.join("big.png").exists());
        assert!(done_root.join("Duplicates").join("small.png").exists());
        assert!(!done_root.join("small.png").exists());
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let parent = tempfile::tempdir().unwrap();
        let root = build_scope_dir(parent.path());
        let scope = Scope::new(&root);
        let shutdown = AtomicBool::new(false);
        let options = sequential_options().with_dry_run(true);

        let report = run_scope(&scope, &options, &shutdown, |_, _| {}).unwrap();

        assert_eq!(report.planned, 2);
        assert_eq!(report.renamed, 0);
        // Quarantine counted as it would happen, but nothing moved.
        assert_eq!(report.quarantined, 1);
        assert!(root.join("bad.jpg").exists());
        assert!(root.join("big.png").exists());
        assert!(root.join("small.png").exists());
        // No completion marker on a dry run.
        assert!(root.is_dir());
        assert!(!parent.path().join("batch01_Done").exists());
    }

    #[test]
    fn test_missing_scope_fails_fast() {
        let scope = Scope::new("/no/such/scope");
        let shutdown = AtomicBool::new(false);
        let err = run_scope(&scope, &sequential_options(), &shutdown, |_, _| {}).unwrap_err();
        assert_eq!(err.kind(), "scope-not-found");
    }

    #[test]
    fn test_rerun_of_completed_scope_is_idempotent() {
        let parent = tempfile::tempdir().unwrap();
        let root = build_scope_dir(parent.path());
        let shutdown = AtomicBool::new(false);

        run_scope(&Scope::new(&root), &sequential_options(), &shutdown, |_, _| {}).unwrap();

        // Run again, directly on the already-completed folder.
        let done_root = parent.path().join("batch01_Done");
        let report = run_scope(
            &Scope::new(&done_root),
            &sequential_options(),
            &shutdown,
            |_, _| {},
        )
        .unwrap();

        // No crash, no second marker, no re-suffixed filenames.
        assert_eq!(report.errors, 0);
        assert!(done_root.is_dir());
        assert!(!parent.path().join("batch01_Done_Done").exists());
        assert!(done_root.join("big_Size1.png").exists());
        assert!(!done_root.join("big_Size1_Size1.png").exists());
    }

    #[test]
    fn test_interrupted_run_skips_disposition_and_marker() {
        let parent = tempfile::tempdir().unwrap();
        let root = build_scope_dir(parent.path());
        let scope = Scope::new(&root);
        // Shutdown requested before the run begins: every file is skipped.
        let shutdown = AtomicBool::new(true);

        let report = run_scope(&scope, &sequential_options(), &shutdown, |_, _| {}).unwrap();

        assert!(report.interrupted);
        assert_eq!(report.processed, 0);
        assert_eq!(report.renamed, 0);
        assert!(root.join("big.png").exists());
        assert!(!parent.path().join("batch01_Done").exists());
    }

    #[test]
    fn test_batch_processes_and_skips_siblings() {
        let parent = tempfile::tempdir().unwrap();
        let fresh = build_scope_dir(parent.path());

        // An already-completed sibling and an excluded category folder.
        fs::create_dir(parent.path().join("older_Done")).unwrap();
        fs::create_dir(parent.path().join("Document")).unwrap();

        let config = Config::default();
        let options = sequential_options();
        let shutdown = AtomicBool::new(false);

        let summary = run_batch(
            parent.path(),
            &config,
            &options,
            &shutdown,
            |_, _, _| {},
        )
        .unwrap();

        assert_eq!(summary.scopes_run, 1);
        assert_eq!(summary.scopes_skipped, 2);
        assert_eq!(summary.scopes_failed, 0);
        assert!(!fresh.exists());
        assert!(parent.path().join("batch01_Done").is_dir());
    }
}
