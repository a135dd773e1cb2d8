//! Duplicate detection engine
//!
//! Fingerprinting, the per-scope fingerprint index, and duplicate-group
//! ranking. This is the algorithmic core of the tool; everything else is
//! plumbing around it.
//!
//! # Submodules
//!
//! - `fingerprint` - Perceptual average-hash fingerprinting
//! - `index` - Fingerprint index and image records for one scope
//! - `resolver` - Resolution-based ranking of duplicate groups

pub mod fingerprint;
pub mod index;
pub mod resolver;
