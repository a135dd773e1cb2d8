//! Filesystem operations
//!
//! Traversal, rename/placement, and quarantine. Everything here mutates or
//! reads the scope's subtree; the duplicate-detection core stays pure.
//!
//! # Submodules
//!
//! - `walker` - Candidate file discovery for one scope
//! - `namer` - Collision-free rename/move of ranked group members
//! - `quarantine` - Isolation of unreadable files

pub mod namer;
pub mod quarantine;
pub mod walker;
