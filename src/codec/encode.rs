//! Encoding of traces and values into JSON trees.
//!
//! Conversion rules:
//! - decimals are rounded half-to-even to six places, then written as numbers
//! - date-times, dates and times are written as ISO-8601 strings
//! - sets are written as lists
//! - custom objects are written as tagged objects with their public
//!   attributes (names not starting with `_`)
//!
//! Encoding tracks the custom objects currently being written and fails
//! fast when one of them is reached again, instead of recursing forever.

use crate::codec::schema::{EventDocument, JsonMap, TraceDocument, TraceSetDocument};
use crate::model::event::Event;
use crate::model::trace::Trace;
use crate::model::trace_set::TraceSet;
use crate::model::value::{iso_date, iso_datetime, iso_time, Fields, ObjectRef, Value};
use crate::utils::config::{CLASS_KEY, DECIMAL_PLACES, FORMAT_VERSION, MODULE_KEY};
use crate::utils::error::EncodeError;
use log::warn;
use rust_decimal::Decimal;
use serde_json::{Number, Value as Json};

/// Converts model objects into serializable documents
#[derive(Debug, Default)]
pub struct Encoder {
    /// Identities of the custom objects on the current path
    active: Vec<usize>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a whole trace set
    ///
    /// **Public** - main entry point for persistence
    ///
    /// # Returns
    /// Document stamped with the current format version
    ///
    /// # Errors
    /// * `EncodeError::Cycle` - a custom object contains itself
    pub fn encode_trace_set(&mut self, traces: &TraceSet) -> Result<TraceSetDocument, EncodeError> {
        let meta_data = self.encode_fields(&traces.meta_data())?;
        let documents = traces
            .iter()
            .map(|trace| self.encode_trace(trace))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TraceSetDocument::new(FORMAT_VERSION, meta_data, documents))
    }

    pub fn encode_trace(&mut self, trace: &Trace) -> Result<TraceDocument, EncodeError> {
        let events = trace
            .iter()
            .map(|event| self.encode_event(event))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TraceDocument::new(events, self.encode_fields(&trace.meta_data)?))
    }

    pub fn encode_event(&mut self, event: &Event) -> Result<EventDocument, EncodeError> {
        Ok(EventDocument::new(
            event.action(),
            self.encode_fields(event.inputs())?,
            self.encode_fields(event.outputs())?,
            self.encode_fields(&event.meta_data)?,
        ))
    }

    /// Encode an ordered field map, keeping key order
    pub fn encode_fields(&mut self, fields: &Fields) -> Result<JsonMap, EncodeError> {
        let mut tree = JsonMap::new();
        for (key, value) in fields {
            tree.insert(key.clone(), self.encode_value(value)?);
        }
        Ok(tree)
    }

    /// Encode a single value
    ///
    /// # Errors
    /// * `EncodeError::Cycle` - a custom object contains itself
    pub fn encode_value(&mut self, value: &Value) -> Result<Json, EncodeError> {
        Ok(match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Float(x) => encode_float(*x),
            Value::Str(s) => Json::String(s.clone()),
            Value::Decimal(d) => encode_decimal(d),
            Value::DateTime(dt) => Json::String(iso_datetime(dt)),
            Value::Date(d) => Json::String(iso_date(d)),
            Value::Time(t) => Json::String(iso_time(t)),
            Value::List(items) | Value::Set(items) => Json::Array(
                items
                    .iter()
                    .map(|item| self.encode_value(item))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(fields) => Json::Object(self.encode_fields(fields)?),
            Value::Object(object) => self.encode_object(object)?,
        })
    }

    fn encode_object(&mut self, object: &ObjectRef) -> Result<Json, EncodeError> {
        let identity = object.identity();
        if self.active.contains(&identity) {
            let object = object.borrow();
            return Err(EncodeError::Cycle {
                class: object.class.clone(),
                module: object.module.clone(),
            });
        }
        self.active.push(identity);
        let result = self.encode_attributes(object);
        self.active.pop();
        result
    }

    fn encode_attributes(&mut self, object: &ObjectRef) -> Result<Json, EncodeError> {
        let object = object.borrow();
        let mut tree = JsonMap::new();
        tree.insert(CLASS_KEY.to_string(), Json::String(object.class.clone()));
        tree.insert(MODULE_KEY.to_string(), Json::String(object.module.clone()));
        for (name, value) in object.fields.iter().filter(|(name, _)| !name.starts_with('_')) {
            tree.insert(name.clone(), self.encode_value(value)?);
        }
        Ok(Json::Object(tree))
    }
}

/// Round a decimal to six places (half-to-even) and write it as a number
///
/// **Public** - exposed for callers building JSON by hand
pub fn encode_decimal(value: &Decimal) -> Json {
    let rounded = value.round_dp(DECIMAL_PLACES).normalize();
    let text = rounded.to_string();
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Json::Number)
        .unwrap_or(Json::String(text))
}

/// JSON has no NaN or infinity; those are written as null
fn encode_float(value: f64) -> Json {
    match Number::from_f64(value) {
        Some(number) => Json::Number(number),
        None => {
            warn!("Non-finite float {} written as null", value);
            Json::Null
        }
    }
}
