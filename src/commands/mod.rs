//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod transform;
pub mod utils;

// Re-export main command functions
pub use models::{parse_literal, Operation, TransformArgs};
pub use transform::{apply_operation, execute_transform, validate_args};
pub use utils::{display_schema, display_version, inspect_file, show_traces};
