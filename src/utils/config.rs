//! Configuration and constants for trace handling.

/// Current JSON-traces format version (Major.Minor.Patch)
pub const FORMAT_VERSION: &str = "0.1.4";

/// Module tag written on Event, Trace and TraceSet tagged objects.
/// Kept identical to the tag used by existing trace files.
pub const MODEL_MODULE: &str = "agilkia.json_traces";

// Keys of the tagged-object convention
pub const CLASS_KEY: &str = "__class__";
pub const MODULE_KEY: &str = "__module__";

// Class tags of the model types
pub const EVENT_CLASS: &str = "Event";
pub const TRACE_CLASS: &str = "Trace";
pub const TRACE_SET_CLASS: &str = "TraceSet";

// Reserved output keys
pub const STATUS_KEY: &str = "Status";
pub const ERROR_KEY: &str = "Error";

// Well-known metadata keys
pub const TIMESTAMP_KEY: &str = "timestamp";
pub const ACTION_CHARS_KEY: &str = "action_chars";
pub const RANDOM_STATE_KEY: &str = "random_state";
pub const DATASET_KEY: &str = "dataset";
pub const DATE_KEY: &str = "date";

/// Sentinel returned for metadata that cannot be resolved
pub const UNKNOWN: &str = "unknown";

/// Fractional digits kept when encoding decimal values
pub const DECIMAL_PLACES: u32 = 6;

/// Metadata `source` of sets upgraded from the pre-TraceSet list format
pub const LEGACY_SOURCE: &str = "Upgraded from version 0.1";

// ANSI escapes used when colouring failed events
pub const ANSI_RED: &str = "\x1b[91m";
pub const ANSI_RESET: &str = "\x1b[0m";

/// Fallback characters for the action char map: visible ASCII from '*'
/// onwards, then the punctuation below it (quotes excluded).
pub fn wildcard_chars() -> impl Iterator<Item = char> {
    (42u8..127).map(char::from).chain("!#$%&()".chars())
}
