//! Decoding of JSON trees back into traces and values.
//!
//! Supported inputs:
//! - the current tagged `TraceSet` document
//! - older 0.1.x documents (event metadata in top-level keys or in
//!   `properties`, `given_event_chars`, trace-level `random_state`)
//! - the original bare list-of-lists-of-events format
//!
//! Rich scalars are not reconstructed: dates come back as strings and
//! decimals as floats. Custom objects are only rebuilt for registered types.

use crate::codec::registry::{TypeRegistry, TypeTag};
use crate::codec::schema::{EventDocument, JsonMap, TraceDocument, TraceSetDocument};
use crate::codec::version::{EventLayout, FormatVersion, CURRENT};
use crate::model::event::Event;
use crate::model::trace::Trace;
use crate::model::trace_set::TraceSet;
use crate::model::value::{Fields, Value};
use crate::utils::config::{
    ACTION_CHARS_KEY, CLASS_KEY, DATASET_KEY, EVENT_CLASS, FORMAT_VERSION, LEGACY_SOURCE,
    MODEL_MODULE, MODULE_KEY, RANDOM_STATE_KEY, TRACE_CLASS, TRACE_SET_CLASS, UNKNOWN,
};
use crate::utils::error::DecodeError;
use log::{debug, warn};
use serde_json::Value as Json;

/// Longest excerpt of unrecognised input quoted in errors
const PREVIEW_CHARS: usize = 60;

/// Converts JSON trees into model objects
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Decode a whole traces file
    ///
    /// **Public** - main entry point for loading
    ///
    /// # Arguments
    /// * `tree` - parsed JSON; a list is taken as the legacy list format
    ///
    /// # Returns
    /// The fully built set; nothing is exposed on failure
    ///
    /// # Errors
    /// * `DecodeError::InvalidFormat` - not a recognised traces document
    /// * `DecodeError::UnsupportedVersion` - version older than the 0.1 series
    /// * `DecodeError::UnknownType` - a custom object type is not registered
    pub fn decode_trace_set(&self, tree: Json) -> Result<TraceSet, DecodeError> {
        let is_trace_set = tree.get(CLASS_KEY).and_then(Json::as_str) == Some(TRACE_SET_CLASS);
        match tree {
            Json::Array(items) => self.decode_legacy_list(items),
            Json::Object(_) if is_trace_set => {
                let document: TraceSetDocument = serde_json::from_value(tree)?;
                self.decode_document(document)
            }
            other => Err(DecodeError::InvalidFormat(format!(
                "unknown traces file format: {}",
                preview(&other)
            ))),
        }
    }

    fn decode_document(&self, document: TraceSetDocument) -> Result<TraceSet, DecodeError> {
        let stored: FormatVersion = document.version.parse()?;
        if stored.series() < CURRENT.series() {
            return Err(DecodeError::UnsupportedVersion(document.version));
        }
        let newer = stored > CURRENT;
        if newer {
            warn!(
                "Traces file has version {} but this library only understands up to {}",
                stored, CURRENT
            );
        } else if stored < CURRENT {
            debug!("Upgrading traces file from version {} to {}", stored, CURRENT);
        }

        let layout = EventLayout::for_version(&stored);
        let mut traces = TraceSet::new(self.decode_fields(document.meta_data)?);
        for trace in document.traces {
            traces.append(self.decode_trace(trace, layout)?);
        }

        if stored.series() == CURRENT.series() && stored.patch == 1 {
            if let Some(chars) = document.given_event_chars {
                traces.set_meta(ACTION_CHARS_KEY, self.decode_value(chars)?);
            }
        }

        let version = if newer {
            document.version
        } else {
            FORMAT_VERSION.to_string()
        };
        traces.restore_version(version, newer);
        Ok(traces)
    }

    fn decode_trace(&self, document: TraceDocument, layout: EventLayout) -> Result<Trace, DecodeError> {
        if document.class != TRACE_CLASS {
            return Err(DecodeError::InvalidFormat(format!(
                "expected a Trace, found '{}'",
                document.class
            )));
        }
        let mut meta_data = self.decode_fields(document.meta_data)?;
        if let Some(state) = document.random_state {
            meta_data.insert(RANDOM_STATE_KEY.to_string(), self.decode_value(state)?);
        }
        let events = document
            .events
            .into_iter()
            .map(|event| self.decode_event(event, layout))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Trace::with_meta(events, meta_data))
    }

    fn decode_event(&self, document: EventDocument, layout: EventLayout) -> Result<Event, DecodeError> {
        if let Some(class) = document.class.as_deref().filter(|class| *class != EVENT_CLASS) {
            return Err(DecodeError::InvalidFormat(format!(
                "expected an Event, found '{}'",
                class
            )));
        }
        let meta_data = match layout {
            EventLayout::TopLevelKeys => document.extra,
            EventLayout::Properties => document.properties.unwrap_or_default(),
            EventLayout::MetaData => document.meta_data.unwrap_or_default(),
        };
        Ok(Event::with_meta(
            document.action,
            self.decode_fields(document.inputs)?,
            self.decode_fields(document.outputs)?,
            self.decode_fields(meta_data)?,
        ))
    }

    /// Upgrade the original list-of-lists-of-events format
    fn decode_legacy_list(&self, items: Vec<Json>) -> Result<TraceSet, DecodeError> {
        let mut meta_data = Fields::new();
        meta_data.insert(DATASET_KEY.to_string(), Value::from(UNKNOWN));
        meta_data.insert("source".to_string(), Value::from(LEGACY_SOURCE));
        let mut traces = TraceSet::new(meta_data);

        for item in items {
            let events = match item {
                Json::Array(events) => events,
                other => {
                    return Err(DecodeError::InvalidFormat(format!(
                        "expected a list of events, found {}",
                        preview(&other)
                    )))
                }
            };
            let events = events
                .into_iter()
                .map(|event| {
                    let document: EventDocument = serde_json::from_value(event)?;
                    self.decode_event(document, EventLayout::TopLevelKeys)
                })
                .collect::<Result<Vec<_>, _>>()?;
            traces.append(Trace::new(events));
        }
        debug!("Upgraded {} traces from the list format", traces.len());
        Ok(traces)
    }

    /// Decode a JSON object into ordered fields
    pub fn decode_fields(&self, tree: JsonMap) -> Result<Fields, DecodeError> {
        let mut fields = Fields::new();
        for (key, value) in tree {
            fields.insert(key, self.decode_value(value)?);
        }
        Ok(fields)
    }

    /// Decode a single value
    ///
    /// # Errors
    /// * `DecodeError::InvalidFormat` - a model type appears inside a value
    /// * `DecodeError::UnknownType` - a tagged object type is not registered
    pub fn decode_value(&self, tree: Json) -> Result<Value, DecodeError> {
        Ok(match tree {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or(Value::Null),
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| self.decode_value(item))
                    .collect::<Result<_, _>>()?,
            ),
            Json::Object(map) => self.decode_object(map)?,
        })
    }

    fn decode_object(&self, map: JsonMap) -> Result<Value, DecodeError> {
        let Some(class) = map.get(CLASS_KEY).and_then(Json::as_str).map(str::to_string) else {
            return Ok(Value::Map(self.decode_fields(map)?));
        };
        let module = map
            .get(MODULE_KEY)
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string();

        if module == MODEL_MODULE && [EVENT_CLASS, TRACE_CLASS, TRACE_SET_CLASS].contains(&class.as_str()) {
            return Err(DecodeError::InvalidFormat(format!(
                "{} cannot appear inside an input, output or metadata value",
                class
            )));
        }

        let mut attributes = Fields::new();
        for (key, value) in map {
            if key != CLASS_KEY && key != MODULE_KEY {
                attributes.insert(key, self.decode_value(value)?);
            }
        }
        self.registry.resolve(TypeTag::new(class, module), attributes)
    }
}

/// Start of a JSON value, for error messages
fn preview(tree: &Json) -> String {
    let text = tree.to_string();
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text,
    }
}
