//! Generic JSON serialization of traces and values.
//!
//! - `schema` - serde document types of the file format
//! - `encode` - model objects to JSON (lossy for rich scalars)
//! - `decode` - JSON to model objects, including older layouts
//! - `registry` - the explicit set of custom types decoding may build
//! - `version` - format versions and upgrade rules

pub mod decode;
pub mod encode;
pub mod registry;
pub mod schema;
pub mod version;

pub use decode::Decoder;
pub use encode::{encode_decimal, Encoder};
pub use registry::{Record, TypeRegistry, TypeTag};
pub use schema::{EventDocument, JsonMap, TraceDocument, TraceSetDocument};
pub use version::FormatVersion;

use crate::model::trace_set::TraceSet;
use crate::model::value::Value;
use crate::utils::error::{DecodeError, EncodeError};

/// Encode a trace set as pretty-printed JSON text
///
/// **Public** - in-memory counterpart of `save_to_json`
pub fn to_json_string(traces: &TraceSet) -> Result<String, EncodeError> {
    let document = Encoder::new().encode_trace_set(traces)?;
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Decode a trace set from JSON text
///
/// **Public** - in-memory counterpart of `load_from_json`
pub fn from_json_str(text: &str, registry: &TypeRegistry) -> Result<TraceSet, DecodeError> {
    let tree: serde_json::Value = serde_json::from_str(text)?;
    Decoder::new(registry).decode_trace_set(tree)
}

/// Encode a single value into a JSON tree
pub fn encode_value(value: &Value) -> Result<serde_json::Value, EncodeError> {
    Encoder::new().encode_value(value)
}

/// Decode a JSON tree into a value, without any custom types
pub fn decode_value(tree: serde_json::Value) -> Result<Value, DecodeError> {
    Decoder::new(&TypeRegistry::new()).decode_value(tree)
}
