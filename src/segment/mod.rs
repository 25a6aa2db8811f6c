//! Segmentation of trace sets into new trace sets.
//!
//! Every algorithm is a pure function from a source set to a new set:
//! - the source set and its traces are never modified
//! - output traces are fresh, owned only by the output set
//! - the output set copies the source set's metadata
//! - cluster assignments are not carried over
//!
//! Missing keys never fail an algorithm; only ambiguous requests do.

pub mod filter;
pub mod group;
pub mod split;

pub use filter::filter_events;
pub use group::{group_by_input, group_by_meta};
pub use split::{split_by_action, split_by_input_change, split_by_time_gap};

use crate::model::trace_set::TraceSet;

/// Empty output set carrying the metadata of `source`
///
/// **Private** - shared by all segmentation algorithms
fn derived_set(source: &TraceSet) -> TraceSet {
    TraceSet::new(source.meta_data().clone())
}
