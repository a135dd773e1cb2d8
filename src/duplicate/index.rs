//! Fingerprint index for one traversal scope
//!
//! The index maps each fingerprint to the insertion-ordered list of image
//! records that produced it. One index is constructed per scope run and
//! passed through the pipeline; there is no process-wide state and no
//! eviction; the index is bounded by the size of the scope.
//!
//! Fingerprint equality is the sole duplicate criterion. Resolution is only
//! ever a ranking key, never a grouping key.

use crate::duplicate::fingerprint::Fingerprint;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// One discovered image.
///
/// Immutable after creation except `path`, which the namer updates exactly
/// once when the file is renamed or moved.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    /// Current location of the file. Unique within one run.
    pub path: PathBuf,
    /// 64-bit perceptual fingerprint
    pub fingerprint: Fingerprint,
    /// Native width in pixels
    pub width: u32,
    /// Native height in pixels
    pub height: u32,
    /// Monotonic counter assigned at walk time; breaks ranking ties
    pub discovery_order: usize,
}

impl ImageRecord {
    /// Pixel area used as the primary ranking key.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// `WxH` token as it appears in generated filenames.
    pub fn resolution_token(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// All records sharing one fingerprint, in discovery order.
///
/// Built transiently from the index after traversal, consumed by the namer,
/// then discarded.
#[derive(Debug, Clone)]
pub struct FingerprintGroup {
    pub fingerprint: Fingerprint,
    pub members: Vec<ImageRecord>,
}

/// Fingerprint → insertion-ordered records, for one scope.
#[derive(Debug, Default)]
pub struct HashIndex {
    buckets: HashMap<Fingerprint, Vec<ImageRecord>>,
    len: usize,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, preserving first-seen-first order per bucket.
    /// O(1) amortized.
    pub fn insert(&mut self, record: ImageRecord) {
        self.buckets
            .entry(record.fingerprint)
            .or_default()
            .push(record);
        self.len += 1;
    }

    /// Number of records inserted.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct fingerprints seen.
    pub fn distinct_fingerprints(&self) -> usize {
        self.buckets.len()
    }

    /// Consume the index into the groups holding two or more members.
    ///
    /// Intra-group order is the insertion order; the order of the groups
    /// themselves is unspecified and callers must not rely on it.
    pub fn groups_with_duplicates(self) -> Vec<FingerprintGroup> {
        self.buckets
            .into_iter()
            .filter(|(_, members)| members.len() >= 2)
            .map(|(fingerprint, members)| FingerprintGroup {
                fingerprint,
                members,
            })
            .collect()
    }
}
