//! Splitting traces into shorter traces.

use crate::model::event::Event;
use crate::model::trace::Trace;
use crate::model::trace_set::TraceSet;
use crate::model::value::Value;
use crate::segment::derived_set;
use crate::utils::config::TIMESTAMP_KEY;
use crate::utils::error::SegmentError;
use chrono::{Duration, NaiveDateTime};
use log::{debug, warn};
use std::mem;

/// Start a new trace at every occurrence of an action
///
/// **Public** - splits sessions into individual transactions
///
/// # Arguments
/// * `traces` - source set, left unchanged
/// * `start_action` - action that begins each output trace. `None` is
///   an error. An action that never occurs leaves every trace unsplit.
///
/// # Returns
/// One output trace per run of events; events before the first
/// occurrence form their own leading trace
///
/// # Errors
/// * `SegmentError::AmbiguousOperation` - no start action was given
pub fn split_by_action(traces: &TraceSet, start_action: Option<&str>) -> Result<TraceSet, SegmentError> {
    let Some(start_action) = start_action else {
        return Err(SegmentError::AmbiguousOperation {
            operation: "split_by_action",
            reason: "no start action given".to_string(),
        });
    };

    let mut result = derived_set(traces);
    for source in traces {
        let mut current: Vec<Event> = Vec::new();
        for event in source.iter() {
            if event.action() == start_action && !current.is_empty() {
                result.append(Trace::new(mem::take(&mut current)));
            }
            current.push(event.clone());
        }
        result.append(Trace::new(current));
    }

    debug!(
        "split_by_action('{}'): {} traces -> {} traces",
        start_action,
        traces.len(),
        result.len()
    );
    Ok(result)
}

/// Start a new trace whenever an input changes value
///
/// **Public** - splits by session id, customer, etc.
///
/// A missing input counts as its own distinct value, so moving between
/// events with and without the input also starts a new trace.
pub fn split_by_input_change(traces: &TraceSet, input_name: &str) -> TraceSet {
    let mut result = derived_set(traces);
    for source in traces {
        let mut current: Vec<Event> = Vec::new();
        let mut previous: Option<Option<&Value>> = None;
        for event in source.iter() {
            let value = event.input(input_name);
            if previous.is_some_and(|prev| prev != value) && !current.is_empty() {
                result.append(Trace::new(mem::take(&mut current)));
            }
            previous = Some(value);
            current.push(event.clone());
        }
        result.append(Trace::new(current));
    }

    debug!(
        "split_by_input_change('{}'): {} traces -> {} traces",
        input_name,
        traces.len(),
        result.len()
    );
    result
}

/// Cut wherever two timestamped events are more than `delay` apart
///
/// **Public** - rebuilds sessions from logs
///
/// The source traces are treated as one continuous stream: a source
/// trace boundary is not a cut by itself, so consecutive source traces
/// whose events are close in time are merged. Events without a usable
/// `timestamp` stay in the current output trace and take no part in the
/// gap computation.
///
/// # Returns
/// New set; empty when the source set has no events
pub fn split_by_time_gap(traces: &TraceSet, delay: Duration) -> TraceSet {
    let mut result = derived_set(traces);
    let mut current: Vec<Event> = Vec::new();
    let mut previous: Option<NaiveDateTime> = None;

    for event in traces.iter().flat_map(|source| source.iter()) {
        match event.timestamp() {
            Some(stamp) => {
                if previous.is_some_and(|prev| stamp - prev > delay) && !current.is_empty() {
                    result.append(Trace::new(mem::take(&mut current)));
                }
                previous = Some(stamp);
            }
            None if event.get_meta(TIMESTAMP_KEY).is_some() => {
                warn!("Ignoring unreadable timestamp on '{}' event", event.action());
            }
            None => {}
        }
        current.push(event.clone());
    }
    if !current.is_empty() {
        result.append(Trace::new(current));
    }

    debug!(
        "split_by_time_gap({}s): {} traces -> {} traces",
        delay.num_seconds(),
        traces.len(),
        result.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::{fields, Fields};
    use pretty_assertions::assert_eq;

    fn named(action: &str, name: Option<&str>) -> Event {
        let inputs = name.map(|n| fields([("Name", n)])).unwrap_or_default();
        Event::new(action, inputs, Fields::new())
    }

    fn single(trace: Trace) -> TraceSet {
        let mut set = TraceSet::new(fields([("dataset", "split")]));
        set.append(trace);
        set
    }

    #[test]
    fn test_split_by_action_requires_action() {
        let set = single(Trace::new(vec![named("Order", None)]));
        assert!(matches!(
            split_by_action(&set, None),
            Err(SegmentError::AmbiguousOperation { .. })
        ));
    }

    #[test]
    fn test_split_by_absent_action_is_unchanged() {
        let set = single(Trace::new(vec![named("Skip", None), named("Order", None)]));
        let result = split_by_action(&set, Some("XYZ")).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0], set[0]);
        assert_eq!(result.get_meta("dataset"), Value::from("split"));
    }

    #[test]
    fn test_empty_source_trace_gives_empty_output() {
        let set = single(Trace::new(vec![]));
        assert_eq!(split_by_action(&set, Some("Order")).unwrap().len(), 1);
        assert_eq!(split_by_input_change(&set, "Name").len(), 1);
        assert_eq!(split_by_time_gap(&set, Duration::seconds(1)).len(), 0);
    }

    #[test]
    fn test_missing_input_is_a_distinct_value() {
        let set = single(Trace::new(vec![
            named("Order", Some("Mark")),
            named("Skip", None),
            named("Skip", None),
            named("Pay", Some("Mark")),
        ]));
        let result = split_by_input_change(&set, "Name");
        let lengths: Vec<usize> = result.iter().map(|t| t.len()).collect();
        assert_eq!(lengths, vec![1, 2, 1]);
    }

    #[test]
    fn test_untimed_events_are_carried_forward() {
        let stamped = |action: &str, stamp: &str| {
            Event::with_meta(action, Fields::new(), Fields::new(), fields([("timestamp", stamp)]))
        };
        let set = single(Trace::new(vec![
            stamped("a", "2020-02-16T12:00:00"),
            named("b", None),
            stamped("c", "2020-02-16T14:00:00"),
            named("d", None),
            stamped("e", "2020-02-16T14:10:00"),
        ]));
        let result = split_by_time_gap(&set, Duration::minutes(30));
        let lengths: Vec<usize> = result.iter().map(|t| t.len()).collect();
        assert_eq!(lengths, vec![2, 3]);
    }
}
