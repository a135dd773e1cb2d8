//! Perceptual fingerprinting of images
//!
//! Computes a 64-bit average-hash fingerprint plus the native resolution for
//! a single image. Every call uses the same resample dimensions and filter;
//! fingerprints are only comparable when produced identically, so these are
//! fixed constants rather than configuration.
//!
//! The fingerprint is deliberately lossy: it survives re-encoding and
//! resizing of visually identical content, but it is NOT invariant to
//! rotation, flips, or crops. That is a documented limitation of the
//! method, not a defect.

use crate::core::error::{DedupError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::path::Path;
use std::time::Duration;

/// Side length of the square the image is resampled to before hashing.
/// 8x8 gives the 64 pixels that map onto the 64 fingerprint bits.
pub const HASH_DIMENSION: u32 = 8;

/// Resample filter used for the downsample step. Must never vary between
/// calls within a run or across runs that compare fingerprints.
const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// A 64-bit perceptual fingerprint
pub type Fingerprint = u64;

/// Fingerprint plus the native resolution recorded before any resampling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprinted {
    /// The 64-bit average hash
    pub fingerprint: Fingerprint,
    /// Native width in pixels (always > 0 for a decodable image)
    pub width: u32,
    /// Native height in pixels (always > 0 for a decodable image)
    pub height: u32,
}

/// Fingerprint a single image file.
///
/// Decodes the image, records its native resolution, then computes the
/// average hash. Pure and read-only: the file is never modified.
///
/// # Errors
///
/// Returns [`DedupError::Unreadable`] when the file cannot be opened or
/// decoded. Callers route such files to quarantine.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprinted> {
    let img = image::open(path).map_err(|e| DedupError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let (width, height) = img.dimensions();

    Ok(Fingerprinted {
        fingerprint: average_hash(&img),
        width,
        height,
    })
}

/// Fingerprint a file with a bounded wait on the decode.
///
/// Runs the decode on a helper thread and waits at most `timeout`. A decode
/// that overruns is reported as [`DedupError::Unreadable`]; the helper
/// thread is detached and finishes (read-only) in the background. Used by
/// the parallel processing path, where a single hung decode must not stall
/// the whole run. A zero timeout disables the bound.
pub fn fingerprint_file_bounded(path: &Path, timeout: Duration) -> Result<Fingerprinted> {
    if timeout.is_zero() {
        return fingerprint_file(path);
    }

    let (tx, rx) = crossbeam_channel::bounded(1);
    let owned = path.to_path_buf();
    std::thread::spawn(move || {
        // Receiver may be gone if we timed out; nothing to do then.
        let _ = tx.send(fingerprint_file(&owned));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => Err(DedupError::Unreadable {
            path: path.to_path_buf(),
            reason: format!("decode timed out after {}s", timeout.as_secs()),
        }),
    }
}

/// Compute the average hash of an already-decoded image.
///
/// Resamples to [`HASH_DIMENSION`]² with the fixed filter, converts to
/// single-channel luminance, then sets bit *i* when pixel *i* exceeds the
/// arithmetic mean of all 64 pixels. The comparison is done in integers
/// (`pixel * 64 > sum`) so there is no floating-point rounding to drift
/// between platforms.
///
/// Exposed separately so tests can hash synthetic in-memory images.
pub fn average_hash(img: &DynamicImage) -> Fingerprint {
    let small = img.resize_exact(HASH_DIMENSION, HASH_DIMENSION, RESAMPLE_FILTER);
    let gray = small.to_luma8();

    let pixel_count = (HASH_DIMENSION * HASH_DIMENSION) as u64;
    let sum: u64 = gray.pixels().map(|p| p[0] as u64).sum();

    let mut hash: u64 = 0;
    for (i, pixel) in gray.pixels().enumerate() {
        if (pixel[0] as u64) * pixel_count > sum {
            hash |= 1 << i;
        }
    }
    hash
}

/// Render a fingerprint as fixed-width hex for log lines and reports.
pub fn fingerprint_hex(fingerprint: Fingerprint) -> String {
    format!("{:016x}", fingerprint)
}
