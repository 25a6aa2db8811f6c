use agilkia::codec::{decode_value, encode_value};
use agilkia::utils::config::FORMAT_VERSION;
use agilkia::{
    fields, from_json_str, load_from_json, save_to_json, to_json_string, DecodeError, Event, Fields,
    ObjectRef, OutputError, Record, Trace, TraceSet, TypeRegistry, Value,
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde_json::json;

#[derive(Debug, PartialEq)]
struct Money {
    currency: String,
    cents: i64,
}

impl Record for Money {
    const CLASS: &'static str = "Money";
    const MODULE: &'static str = "shop.types";

    fn to_fields(&self) -> Fields {
        fields([("currency", Value::from(self.currency.as_str())), ("cents", Value::from(self.cents))])
    }

    fn from_fields(fields: &Fields) -> Result<Self, DecodeError> {
        let invalid = |reason: &str| DecodeError::InvalidAttribute {
            class: Self::CLASS.to_string(),
            reason: reason.to_string(),
        };
        Ok(Self {
            currency: fields
                .get("currency")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("missing currency"))?
                .to_string(),
            cents: fields
                .get("cents")
                .and_then(Value::as_i64)
                .ok_or_else(|| invalid("missing cents"))?,
        })
    }
}

fn sample_traces() -> TraceSet {
    let mut traces = TraceSet::new(fields([
        ("date", "2019-09-17T18:58:00"),
        ("dataset", "shop"),
    ]));
    let mut first = Trace::new(vec![
        Event::with_meta(
            "Order",
            fields([("Name", Value::from("Mark")), ("Qty", Value::from(2))]),
            fields([("Status", 0)]),
            fields([("timestamp", "2019-09-17T18:58:00")]),
        ),
        Event::new(
            "Pay",
            fields([("Amount", 23.45)]),
            fields([("Status", Value::from(1)), ("Error", Value::from("Declined"))]),
        ),
    ]);
    first.set_meta("session", 1);
    traces.append(first);
    traces.append(Trace::new(vec![]));
    traces
}

#[test]
fn test_round_trip() {
    let traces = sample_traces();
    let text = to_json_string(&traces).unwrap();
    let loaded = from_json_str(&text, &TypeRegistry::new()).unwrap();

    assert_eq!(loaded.len(), traces.len());
    assert_eq!(loaded[0], traces[0]);
    assert_eq!(loaded[1], traces[1]);
    assert_eq!(*loaded.meta_data(), *traces.meta_data());
    assert_eq!(loaded[0][1].status(), 1);
    assert_eq!(loaded[0][1].error_message(), "Declined");
    assert_eq!(loaded.version(), FORMAT_VERSION);
}

#[test]
fn test_reencoding_is_byte_identical() {
    let text = to_json_string(&sample_traces()).unwrap();
    let loaded = from_json_str(&text, &TypeRegistry::new()).unwrap();
    assert_eq!(to_json_string(&loaded).unwrap(), text);
}

#[test]
fn test_document_layout() {
    let text = to_json_string(&sample_traces()).unwrap();
    let tree: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(tree["__class__"], json!("TraceSet"));
    assert_eq!(tree["__module__"], json!("agilkia.json_traces"));
    assert_eq!(tree["version"], json!(FORMAT_VERSION));
    assert_eq!(tree["traces"][0]["meta_data"], json!({"session": 1}));
    assert_eq!(tree["traces"][0]["events"][0]["meta_data"]["timestamp"], json!("2019-09-17T18:58:00"));

    let keys: Vec<&String> = tree.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["__class__", "__module__", "version", "meta_data", "traces"]);
}

#[test]
fn test_clusters_are_not_persisted() {
    let mut traces = sample_traces();
    traces.set_clusters(vec![0, 1]).unwrap();
    let text = to_json_string(&traces).unwrap();
    assert!(!text.contains("cluster"));

    let loaded = from_json_str(&text, &TypeRegistry::new()).unwrap();
    assert!(!loaded.is_clustered());
}

#[test]
fn test_rich_scalars_reload_as_plain_values() {
    let dt = NaiveDate::from_ymd_opt(2019, 9, 17).and_then(|d| d.and_hms_opt(18, 58, 0)).unwrap();
    let value = Value::Map(fields([
        ("price", Value::from(Decimal::from_f64_retain(3.4500048012).unwrap())),
        ("when", Value::from(dt)),
        ("tags", Value::set(vec!["a"])),
    ]));

    let tree = encode_value(&value).unwrap();
    assert_eq!(serde_json::to_string(&tree).unwrap(), r#"{"price":3.450005,"when":"2019-09-17T18:58:00","tags":["a"]}"#);

    let reloaded = decode_value(tree).unwrap();
    assert_eq!(
        reloaded,
        Value::Map(fields([
            ("price", Value::from(3.450005)),
            ("when", Value::from("2019-09-17T18:58:00")),
            ("tags", Value::from(vec!["a"])),
        ]))
    );
}

#[test]
fn test_custom_objects_need_registration() {
    let mut traces = TraceSet::new(Fields::new());
    let price = Money { currency: "AUD".into(), cents: 2345 };
    traces.append(Trace::new(vec![Event::new("Pay", fields([("price", price.to_value())]), Fields::new())]));
    let text = to_json_string(&traces).unwrap();

    let err = from_json_str(&text, &TypeRegistry::new()).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownType { ref class, ref module } if class == "Money" && module == "shop.types"));

    let mut registry = TypeRegistry::new();
    registry.register::<Money>();
    let loaded = from_json_str(&text, &registry).unwrap();
    let Some(Value::Object(object)) = loaded[0][0].input("price") else {
        panic!("price should be an object");
    };
    assert_eq!(object.to_record::<Money>().unwrap(), price);
}

#[test]
fn test_nested_objects() {
    let inner = ObjectRef::new("Dummy", "tests", fields([("f", vec![3.14])]));
    let outer = ObjectRef::new("Dummy", "tests", fields([("f", vec![3.14])]));
    outer.set_attr("extra", inner);

    let text = serde_json::to_string(&encode_value(&Value::from(outer)).unwrap()).unwrap();
    assert_eq!(
        text,
        r#"{"__class__":"Dummy","__module__":"tests","f":[3.14],"extra":{"__class__":"Dummy","__module__":"tests","f":[3.14]}}"#
    );
}

#[test]
fn test_self_reference_fails_save() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("cycle.json");

    let node = ObjectRef::new("Node", "tests", Fields::new());
    node.set_attr("next", Value::from(vec![Value::from(node.clone())]));
    let mut traces = TraceSet::new(Fields::new());
    traces.append(Trace::new(vec![Event::new("Walk", fields([("node", node)]), Fields::new())]));

    assert!(matches!(save_to_json(&traces, &path), Err(OutputError::Encode(_))));
    assert!(!path.exists());
}

#[test]
fn test_file_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("out/traces.json");

    let traces = sample_traces();
    save_to_json(&traces, &path).unwrap();
    let loaded = load_from_json(&path, &TypeRegistry::new()).unwrap();

    assert_eq!(loaded[0], traces[0]);
    assert_eq!(loaded.to_string(), "TraceSet 'shop' with 2 traces.");
}

#[test]
fn test_newer_file_version_is_flagged() {
    let text = r#"{"__class__": "TraceSet", "__module__": "agilkia.json_traces",
                   "version": "0.1.99", "meta_data": {}, "traces": []}"#;
    let loaded = from_json_str(text, &TypeRegistry::new()).unwrap();
    assert!(loaded.version_mismatch());
    assert_eq!(loaded.version(), "0.1.99");
}

#[test]
fn test_unknown_format_is_rejected() {
    let err = from_json_str(r#"{"hello": "world"}"#, &TypeRegistry::new()).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidFormat(_)));

    let err = from_json_str("not json", &TypeRegistry::new()).unwrap_err();
    assert!(matches!(err, DecodeError::Json(_)));
}
