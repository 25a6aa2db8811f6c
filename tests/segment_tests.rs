use agilkia::{
    fields, filter_events, group_by_input, split_by_action, split_by_input_change, split_by_time_gap,
    Event, Fields, SegmentError, Trace, TraceSet, Value,
};
use chrono::Duration;
use pretty_assertions::assert_eq;

fn order() -> Event {
    Event::new("Order", fields([("Name", "Mark")]), fields([("Status", 0)]))
}

fn skip() -> Event {
    Event::new(
        "Skip",
        fields([("Size", 3)]),
        fields([("Status", Value::from(1)), ("Error", Value::from("Too big"))]),
    )
}

fn pay(name: &str) -> Event {
    Event::new(
        "Pay",
        fields([("Name", Value::from(name)), ("Amount", Value::from(23.45))]),
        fields([("Status", 0)]),
    )
}

fn timed(action: &str, stamp: &str) -> Event {
    Event::with_meta(action, Fields::new(), Fields::new(), fields([("timestamp", stamp)]))
}

fn keyed(action: &str, key: Option<Value>) -> Event {
    let meta = key.map(|k| fields([("key", k)])).unwrap_or_default();
    Event::with_meta(action, Fields::new(), Fields::new(), meta)
}

fn set_of(traces: Vec<Trace>) -> TraceSet {
    let mut set = TraceSet::new(fields([("dataset", "segment tests")]));
    for trace in traces {
        set.append(trace);
    }
    set
}

fn lengths(set: &TraceSet) -> Vec<usize> {
    set.iter().map(|trace| trace.len()).collect()
}

#[test]
fn test_split_by_action() {
    let traces = set_of(vec![Trace::new(vec![skip(), order(), pay("Mark"), order(), order(), skip()])]);

    let result = split_by_action(&traces, Some("Order")).unwrap();

    assert_eq!(lengths(&result), vec![1, 2, 1, 2]);
    let first_actions: Vec<&str> = result.iter().map(|t| t[0].action()).collect();
    assert_eq!(first_actions, vec!["Skip", "Order", "Order", "Order"]);
    // source untouched
    assert_eq!(lengths(&traces), vec![6]);
    assert_eq!(result.get_meta("dataset"), Value::from("segment tests"));
}

#[test]
fn test_split_without_action_is_ambiguous() {
    let traces = set_of(vec![Trace::new(vec![skip(), order()])]);
    let err = split_by_action(&traces, None).unwrap_err();
    assert!(matches!(err, SegmentError::AmbiguousOperation { operation: "split_by_action", .. }));
}

#[test]
fn test_split_by_input_change() {
    let traces = set_of(vec![Trace::new(vec![
        order(),
        pay("Mark"),
        pay("Merry"),
        pay("Mark"),
        skip(),
        order(),
    ])]);

    let result = split_by_input_change(&traces, "Name");

    // Mark Mark | Merry | Mark | (no Name) | Mark
    assert_eq!(lengths(&result), vec![2, 1, 1, 1, 1]);
    assert_eq!(result[1][0].input("Name"), Some(&Value::from("Merry")));
    assert_eq!(result[3][0].action(), "Skip");
}

#[test]
fn test_split_by_time_gap_within_trace() {
    let traces = set_of(vec![Trace::new(vec![
        timed("oldAction", "1970-01-01T00:00:32"),
        timed("recentAction", "2020-02-16T12:15:00"),
        timed("otherRecentAction", "2020-02-16T13:15:00"),
        timed("otherRecentAction", "2020-02-16T13:15:00"),
    ])]);

    assert_eq!(lengths(&split_by_time_gap(&traces, Duration::minutes(30))), vec![1, 1, 2]);
    assert_eq!(lengths(&split_by_time_gap(&traces, Duration::hours(30))), vec![1, 3]);
}

#[test]
fn test_split_by_time_gap_merges_across_traces() {
    let traces = set_of(vec![
        Trace::new(vec![timed("a", "2020-01-01T00:00:00"), timed("b", "2020-01-01T00:00:10")]),
        Trace::new(vec![timed("c", "2020-01-01T00:00:20"), timed("d", "2020-01-01T00:00:20")]),
    ]);

    let result = split_by_time_gap(&traces, Duration::seconds(30));

    assert_eq!(lengths(&result), vec![4]);
    let actions: Vec<&str> = result[0].iter().map(|e| e.action()).collect();
    assert_eq!(actions, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_group_by_input() {
    let traces = set_of(vec![Trace::new(vec![
        order(),
        pay("Mark"),
        pay("Merry"),
        pay("Mark"),
        skip(),
        order(),
    ])]);

    let result = group_by_input(&traces, "Name");

    assert_eq!(lengths(&result), vec![4, 1]);
    assert_eq!(result[0][0].input("Name"), Some(&Value::from("Mark")));
    assert_eq!(result[1][0].input("Name"), Some(&Value::from("Merry")));
}

#[test]
fn test_filter_events_is_type_sensitive() {
    let traces = set_of(vec![Trace::new(vec![
        keyed("someAction", Some(Value::from(3))),
        keyed("someAction", Some(Value::from("3"))),
        keyed("someAction", None),
        Event::new("someAction", fields([("key", 3)]), Fields::new()),
        keyed("otherAction", Some(Value::from(3))),
    ])]);

    let numbers = filter_events(&traces, "key", &Value::from(3), true);
    assert_eq!(lengths(&numbers), vec![2]);
    assert_eq!(numbers[0][1].action(), "otherAction");

    let strings = filter_events(&traces, "key", &Value::from("3"), true);
    assert_eq!(lengths(&strings), vec![1]);
}

#[test]
fn test_filter_events_remove_empty() {
    let traces = set_of(vec![
        Trace::new(vec![keyed("a", Some(Value::from(3))), keyed("b", Some(Value::from("3")))]),
        Trace::new(vec![keyed("c", Some(Value::from("something different")))]),
        Trace::new(vec![Event::new("d", fields([("key", 3)]), Fields::new()), keyed("e", Some(Value::from(3)))]),
        Trace::new(vec![]),
    ]);

    let removed = filter_events(&traces, "key", &Value::from(3), true);
    assert_eq!(lengths(&removed), vec![1, 1, 0]);

    let kept = filter_events(&traces, "key", &Value::from(3), false);
    assert_eq!(lengths(&kept), vec![1, 0, 1, 0]);
}

#[test]
fn test_outputs_are_fresh_traces() {
    let traces = set_of(vec![Trace::new(vec![order(), pay("Mark")])]);
    let mut result = split_by_action(&traces, Some("Pay")).unwrap();

    result.set_meta("dataset", "derived");

    assert_eq!(traces.get_meta("dataset"), Value::from("segment tests"));
    assert_eq!(result[0].get_meta("dataset"), Value::from("derived"));
    assert_eq!(traces[0].get_meta("dataset"), Value::from("segment tests"));
}
