//! Regrouping events by the value of an input or metadata entry.

use crate::model::event::Event;
use crate::model::trace::Trace;
use crate::model::trace_set::TraceSet;
use crate::model::value::Value;
use crate::segment::derived_set;
use log::debug;

/// One output trace per distinct value of an input
///
/// **Public** - e.g. one trace per customer across all sessions
///
/// Events from all source traces are partitioned; each output trace keeps
/// its events in their original relative order. Output traces appear in
/// the order their value is first encountered. Events without the input
/// (or with a null value) are discarded.
pub fn group_by_input(traces: &TraceSet, input_name: &str) -> TraceSet {
    let result = group_events(traces, |event| event.input(input_name));
    debug!("group_by_input('{}'): {} groups", input_name, result.len());
    result
}

/// One output trace per distinct value of an event metadata entry
///
/// **Public** - same partitioning as `group_by_input`
pub fn group_by_meta(traces: &TraceSet, key: &str) -> TraceSet {
    let result = group_events(traces, |event| event.get_meta(key));
    debug!("group_by_meta('{}'): {} groups", key, result.len());
    result
}

/// **Private** - shared partitioning logic
fn group_events<F>(traces: &TraceSet, key_of: F) -> TraceSet
where
    F: Fn(&Event) -> Option<&Value>,
{
    // Values need not be hashable, so groups are found by linear search
    let mut groups: Vec<(Value, Vec<Event>)> = Vec::new();
    let mut discarded = 0usize;

    for event in traces.iter().flat_map(|source| source.iter()) {
        let Some(value) = key_of(event).filter(|value| !value.is_null()) else {
            discarded += 1;
            continue;
        };
        match groups.iter_mut().find(|(key, _)| *key == *value) {
            Some((_, members)) => members.push(event.clone()),
            None => groups.push((value.clone(), vec![event.clone()])),
        }
    }
    if discarded > 0 {
        debug!("{} events without a group value discarded", discarded);
    }

    let mut result = derived_set(traces);
    for (_, members) in groups {
        result.append(Trace::new(members));
    }
    result
}
