//! Core functionality module
//!
//! This module contains the core business logic for the photo dedup tool,
//! including configuration management, error handling, scope definition,
//! and run orchestration.
//!
//! # Submodules
//!
//! - `config` - Configuration loading, saving, and management
//! - `error` - Error types and result aliases
//! - `scope` - Scope definition, exclusion rules, completion markers
//! - `orchestrator` - End-to-end scope runs and the batch driver

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod scope;
