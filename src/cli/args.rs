//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use crate::fsops::namer::Disposition;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Canonicalize recovered photo collections: detect near-duplicate images,
/// rank them by resolution, and rename or quarantine them deterministically
#[derive(Parser, Debug)]
#[command(name = "photo-dedup")]
#[command(author = "Vihaan Reddy M")]
#[command(version = "1.0.0")]
#[command(
    about = "Detect near-duplicate images and canonicalize their names",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Canonicalize duplicates in one folder (a single scope)
    Run {
        /// Scope root folder to process
        path: PathBuf,

        /// Where non-canonical duplicates are placed (overrides config)
        #[arg(short, long, value_enum)]
        disposition: Option<Disposition>,

        /// Show what would happen without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Write the JSON run report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Process every eligible subfolder of a parent folder as its own scope
    ///
    /// Subfolders that already carry the completion marker and folders on
    /// the excluded list are skipped.
    Batch {
        /// Parent folder whose subfolders are the scopes
        path: PathBuf,

        /// Where non-canonical duplicates are placed (overrides config)
        #[arg(short, long, value_enum)]
        disposition: Option<Disposition>,

        /// Show what would happen without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Write the JSON batch report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// List duplicate groups in a folder without changing anything
    Scan {
        /// Folder to scan
        path: PathBuf,
    },

    /// Generate synthetic test images for trying the tool
    ///
    /// Creates coarse block-pattern images, optional re-scaled duplicate
    /// copies, and optional corrupt files that exercise quarantining.
    GenTestdata {
        /// Output directory for generated files
        #[arg(short, long)]
        output: PathBuf,

        /// Number of distinct base images to generate
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,

        /// Include re-scaled duplicate copies
        #[arg(long)]
        duplicates: bool,

        /// Include corrupt (undecodable) files
        #[arg(long)]
        corrupt: bool,

        /// Seed for reproducible generation
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show or reset the configuration file
    ///
    /// The config file is stored at:
    /// - Windows: %APPDATA%\photo_dedup_tool\config.toml
    /// - Linux/macOS: ~/.config/photo_dedup_tool/config.toml
    ///
    /// If no config file exists, a default one will be created.
    Config {
        /// Show the config file path only
        #[arg(long)]
        path: bool,

        /// Reset config to defaults (creates a fresh config file)
        #[arg(long)]
        reset: bool,
    },

    /// Generate a configuration file at a specific location
    GenerateConfig {
        /// Output path for the config file (defaults to standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show current configuration
    ShowConfig,
}
