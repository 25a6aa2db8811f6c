//! On-disk JSON schema for traces files.
//!
//! This module defines the structure of the documents we read and write.
//! Model types are written as tagged objects carrying `__class__` and
//! `__module__` keys. Fields of older 0.1.x layouts are accepted on read
//! but never written.

use crate::utils::config::{EVENT_CLASS, MODEL_MODULE, TRACE_CLASS, TRACE_SET_CLASS};
use serde::{Deserialize, Serialize};

/// JSON object with insertion order preserved
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Top-level document of a traces file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSetDocument {
    #[serde(rename = "__class__")]
    pub class: String,

    #[serde(rename = "__module__", default)]
    pub module: String,

    /// Format version, "Major.Minor.Patch"
    pub version: String,

    #[serde(default)]
    pub meta_data: JsonMap,

    #[serde(default)]
    pub traces: Vec<TraceDocument>,

    /// Preferred action chars, version 0.1.1 only
    #[serde(default, skip_serializing)]
    pub given_event_chars: Option<serde_json::Value>,
}

impl TraceSetDocument {
    pub fn new(version: impl Into<String>, meta_data: JsonMap, traces: Vec<TraceDocument>) -> Self {
        Self {
            class: TRACE_SET_CLASS.to_string(),
            module: MODEL_MODULE.to_string(),
            version: version.into(),
            meta_data,
            traces,
            given_event_chars: None,
        }
    }
}

/// One trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDocument {
    #[serde(rename = "__class__")]
    pub class: String,

    #[serde(rename = "__module__", default)]
    pub module: String,

    #[serde(default)]
    pub events: Vec<EventDocument>,

    #[serde(default)]
    pub meta_data: JsonMap,

    /// Generator state, stored outside the metadata before 0.1.4
    #[serde(default, skip_serializing)]
    pub random_state: Option<serde_json::Value>,
}

impl TraceDocument {
    pub fn new(events: Vec<EventDocument>, meta_data: JsonMap) -> Self {
        Self {
            class: TRACE_CLASS.to_string(),
            module: MODEL_MODULE.to_string(),
            events,
            meta_data,
            random_state: None,
        }
    }
}

/// One event
///
/// Events of the pre-TraceSet list format carry no class tag, and keep
/// their metadata in extra top-level keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDocument {
    #[serde(rename = "__class__", default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(rename = "__module__", default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    pub action: String,

    #[serde(default)]
    pub inputs: JsonMap,

    #[serde(default)]
    pub outputs: JsonMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<JsonMap>,

    /// Event metadata in version 0.1.3
    #[serde(default, skip_serializing)]
    pub properties: Option<JsonMap>,

    /// Unrecognised top-level keys (event metadata up to 0.1.2)
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl EventDocument {
    pub fn new(action: impl Into<String>, inputs: JsonMap, outputs: JsonMap, meta_data: JsonMap) -> Self {
        Self {
            class: Some(EVENT_CLASS.to_string()),
            module: Some(MODEL_MODULE.to_string()),
            action: action.into(),
            inputs,
            outputs,
            meta_data: Some(meta_data),
            properties: None,
            extra: JsonMap::new(),
        }
    }
}
