//! A single observed interaction with the system under test.

use crate::model::value::{write_fields, Fields, Value};
use crate::utils::config::{ERROR_KEY, STATUS_KEY, TIMESTAMP_KEY};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use std::fmt;

/// One action call with its inputs, outputs and free-form metadata.
///
/// Action, inputs and outputs are fixed at construction; only the
/// metadata may be edited afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    action: String,
    inputs: Fields,
    outputs: Fields,
    pub meta_data: Fields,
}

impl Event {
    pub fn new(action: impl Into<String>, inputs: Fields, outputs: Fields) -> Self {
        Self::with_meta(action, inputs, outputs, Fields::new())
    }

    pub fn with_meta(
        action: impl Into<String>,
        inputs: Fields,
        outputs: Fields,
        meta_data: Fields,
    ) -> Self {
        Self {
            action: action.into(),
            inputs,
            outputs,
            meta_data,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn inputs(&self) -> &Fields {
        &self.inputs
    }

    pub fn outputs(&self) -> &Fields {
        &self.outputs
    }

    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name)
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    pub fn get_meta(&self, key: &str) -> Option<&Value> {
        self.meta_data.get(key)
    }

    /// Set a metadata value, returning the previous one
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.meta_data.insert(key.into(), value.into())
    }

    /// Integer status of the call
    ///
    /// **Public** - drives status counts, colouring and tabular views
    ///
    /// # Returns
    /// The `Status` output coerced to an integer. 0 (success) when the
    /// output is missing or cannot be read as a number.
    pub fn status(&self) -> i64 {
        match self.outputs.get(STATUS_KEY) {
            Some(Value::Int(n)) => *n,
            Some(Value::Float(x)) if x.is_finite() => x.trunc() as i64,
            Some(Value::Decimal(d)) => d.trunc().to_i64().unwrap_or(0),
            Some(Value::Str(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Error message of the call, or an empty string
    pub fn error_message(&self) -> String {
        match self.outputs.get(ERROR_KEY) {
            None | Some(Value::Null) => String::new(),
            Some(Value::Str(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Timestamp of the event, from the `timestamp` metadata entry
    ///
    /// **Public** - used by the time-gap segmentation
    ///
    /// # Returns
    /// `None` when the entry is missing or not a recognisable date-time
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self.meta_data.get(TIMESTAMP_KEY)? {
            Value::DateTime(dt) => Some(*dt),
            Value::Date(d) => d.and_hms_opt(0, 0, 0),
            Value::Str(text) => parse_timestamp(text),
            _ => None,
        }
    }
}

/// Parse an ISO-8601 timestamp, with or without UTC offset
///
/// **Public** - also used when reading timestamps from the command line
///
/// Offsets are normalised to UTC; naive timestamps are taken as-is.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = text.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event({}, ", self.action)?;
        write_fields(f, &self.inputs)?;
        write!(f, ", ")?;
        write_fields(f, &self.outputs)?;
        write!(f, ")")
    }
}
