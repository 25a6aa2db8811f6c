//! Analysis views over trace sets.
//!
//! - `features` - per-trace count matrices
//! - `clusters` - the pluggable clustering seam
//! - `table` - one row per event, for tabular tools

pub mod clusters;
pub mod features;
pub mod table;

pub use clusters::{Clusterer, ExactMatchClusterer};
pub use features::{get_trace_data, TraceData, TraceFeature};
pub use table::{event_rows, table_columns, EventRow};
