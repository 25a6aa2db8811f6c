//! File input/output for trace sets.
//!
//! This module handles reading and writing traces files on disk:
//! - JSON traces files (current and legacy layouts)

pub mod json;

// Re-export main functions
pub use json::{load_from_json, save_to_json};
