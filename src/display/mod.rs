//! Human-readable renderings of traces.

pub mod chars;

pub use chars::{default_map_to_chars, safe_name, trace_to_string, CharMap};
