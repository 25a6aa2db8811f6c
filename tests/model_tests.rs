use agilkia::{
    fields, get_trace_data, CharMap, Element, Event, Fields, Trace, TraceFeature, TraceSet, Value,
};
use pretty_assertions::assert_eq;
use std::rc::Rc;

fn event(action: &str, status: Value) -> Event {
    Event::new(action, Fields::new(), fields([("Status", status)]))
}

fn shop_set(dataset: &str) -> TraceSet {
    let mut traces = TraceSet::new(fields([("dataset", dataset), ("author", "tester")]));
    traces.append(Trace::new(vec![
        event("Skip", Value::from(1)),
        event("Order", Value::from(0)),
        event("Pay", Value::from(0)),
        event("Order", Value::from(0)),
        event("Order", Value::from(0)),
        event("Skip", Value::from(0)),
    ]));
    traces
}

#[test]
fn test_status_coercion() {
    assert_eq!(event("a", Value::from(2)).status(), 2);
    assert_eq!(event("a", Value::from("3")).status(), 3);
    assert_eq!(event("a", Value::from(1.9)).status(), 1);
    assert_eq!(event("a", Value::from("broken")).status(), 0);
    assert_eq!(Event::new("a", Fields::new(), Fields::new()).status(), 0);
}

#[test]
fn test_shared_trace_has_no_single_parent() {
    let first = shop_set("first");
    let shared = Rc::clone(&first.traces()[0]);
    assert_eq!(shared.get_meta("dataset"), Value::from("first"));

    let mut second = TraceSet::new(fields([("dataset", "second")]));
    second.append(Rc::clone(&shared));
    assert_eq!(shared.get_meta("dataset"), Value::from("unknown"));

    drop(second);
    assert_eq!(shared.get_meta("dataset"), Value::from("first"));

    drop(first);
    assert_eq!(shared.get_meta("dataset"), Value::from("unknown"));
}

#[test]
fn test_own_meta_shadows_set_meta() {
    let mut traces = TraceSet::new(fields([("dataset", "outer")]));
    traces.append(Trace::with_meta(vec![], fields([("dataset", "inner")])));
    traces.append(Trace::new(vec![]));

    assert_eq!(traces[0].get_meta("dataset"), Value::from("inner"));
    assert_eq!(traces[1].get_meta("dataset"), Value::from("outer"));
    assert_eq!(traces[1].get_meta("missing"), Value::from("unknown"));
}

#[test]
fn test_from_traces_inherits_single_parent() {
    let source = shop_set("shop");
    let regrouped = TraceSet::from_traces(source.iter().cloned());

    assert_eq!(regrouped.get_meta("dataset"), Value::from("shop"));
    assert_eq!(regrouped.get_meta("author"), Value::from("tester"));
    assert_eq!(regrouped.len(), 1);
}

#[test]
fn test_from_traces_with_mixed_parents_uses_defaults() {
    let left = shop_set("left");
    let right = shop_set("right");
    let mixed = TraceSet::from_traces(vec![Rc::clone(&left.traces()[0]), Rc::clone(&right.traces()[0])]);

    assert_eq!(mixed.get_meta("dataset"), Value::from("unknown"));
    assert_eq!(mixed.get_meta("action_chars"), Value::Null);
    assert!(mixed.meta_data().contains_key("date"));
}

#[test]
fn test_trace_chars() {
    let mut traces = shop_set("shop");

    assert_eq!(traces.trace_to_string(0, &[], false).as_deref(), Some("SOPOOS"));
    assert_eq!(traces.trace_to_string(0, &["Order"], false).as_deref(), Some("SOPOS"));
    assert_eq!(
        traces.trace_to_string(0, &[], true).as_deref(),
        Some("\x1b[91mS\x1b[0mOPOOS")
    );
    assert_eq!(traces.trace_to_string(1, &[], false), None);

    let given: CharMap = [("Order".to_string(), 'x')].into_iter().collect();
    traces.set_event_chars(Some(&given));
    assert_eq!(traces.trace_to_string(0, &[], false).as_deref(), Some("SxPxxS"));
    assert_eq!(
        traces.get_meta("action_chars"),
        Value::Map(fields([("Order", "x")]))
    );
}

#[test]
fn test_trace_data_counts_actions() {
    let traces = shop_set("shop");
    let data = get_trace_data(&traces, TraceFeature::ActionCounts, None);

    assert_eq!(data.columns, vec!["Order", "Pay", "Skip"]);
    assert_eq!(data.rows, vec![vec![3, 1, 2]]);
}

#[test]
fn test_markup_flattens_into_event_output() {
    let response = Element::new("Response")
        .with_attribute("code", 200)
        .with_child(Element::new("Item").with_text("tea"))
        .with_child(Element::new("Item").with_text(" cake "));
    let event = Event::new("Browse", Fields::new(), fields([("Body", response.flatten())]));

    assert_eq!(
        event.output("Body"),
        Some(&Value::Map(fields([
            ("code", Value::from(200)),
            ("Item", Value::from(vec!["tea", "cake"])),
        ])))
    );
}
