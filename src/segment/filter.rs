//! Filtering events by a metadata value.

use crate::model::event::Event;
use crate::model::trace::Trace;
use crate::model::trace_set::TraceSet;
use crate::model::value::Value;
use crate::segment::derived_set;
use log::debug;

/// Keep only events whose metadata `key` equals `value`
///
/// **Public** - e.g. keep the events of one user or one log level
///
/// # Arguments
/// * `traces` - source set, left unchanged
/// * `key` - event metadata key
/// * `value` - expected value; comparison is type-sensitive, so the
///   number 3 does not match the string "3"
/// * `remove_empty` - drop traces that lost all their events. Traces
///   that were already empty are always kept.
///
/// # Returns
/// One output trace per kept source trace, in order, with the source
/// trace's metadata
pub fn filter_events(traces: &TraceSet, key: &str, value: &Value, remove_empty: bool) -> TraceSet {
    let mut result = derived_set(traces);
    let mut dropped = 0usize;

    for source in traces {
        let kept: Vec<Event> = source
            .iter()
            .filter(|event| event.get_meta(key) == Some(value))
            .cloned()
            .collect();
        if remove_empty && kept.is_empty() && !source.is_empty() {
            dropped += 1;
            continue;
        }
        result.append(Trace::with_meta(kept, source.meta_data.clone()));
    }

    debug!(
        "filter_events('{}' == {}): kept {} traces, dropped {}",
        key,
        value,
        result.len(),
        dropped
    );
    result
}
