//! Photo Dedup Tool Library
//!
//! Canonicalizes large, disorganized image collections (typically folders
//! recovered from data-loss operations) by detecting near-duplicate images
//! with a perceptual fingerprint, ranking each duplicate group by
//! resolution, and renaming or relocating members so exactly one copy is
//! marked canonical. Unreadable files are quarantined into an excluded
//! folder so they are never reprocessed.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`core`] - Configuration, error handling, scope definition, and run
//!   orchestration
//! - [`duplicate`] - The detection engine: fingerprinting, the per-scope
//!   index, and group ranking
//! - [`fsops`] - Filesystem operations: traversal, renaming, quarantine
//! - [`collab`] - Capability traits for external collaborators
//!   (classifiers, interactive name providers)
//! - [`testdata`] - Seeded synthetic fixture generation
//! - [`cli`] - Command-line interface (only used by the binary)
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use photo_dedup_tool::core::config::Config;
//! use photo_dedup_tool::core::orchestrator::{run_scope, RunOptions};
//! use std::sync::atomic::AtomicBool;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default()?;
//!     let scope = config.scope_for("/photos/recovered/batch01");
//!     let options = RunOptions::from_config(&config);
//!     let shutdown = AtomicBool::new(false);
//!
//!     let report = run_scope(&scope, &options, &shutdown, |done, total| {
//!         println!("{}/{}", done, total);
//!     })?;
//!     println!("{} duplicate group(s)", report.groups);
//!     Ok(())
//! }
//! ```
//!
//! # What counts as a duplicate
//!
//! Two files are duplicates exactly when their perceptual fingerprints are
//! equal: an 8x8 Lanczos3 downsample to luminance, mean-split into 64 bits.
//! This survives re-encoding and resizing of the same visual content, but
//! is NOT invariant to rotation, flips, or crops, and it is not a
//! cryptographic integrity check. Resolution is only ever a ranking key
//! within a group, never a grouping key.

pub mod cli;
pub mod collab;
pub mod core;
pub mod duplicate;
pub mod fsops;
pub mod testdata;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
