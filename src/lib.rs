//! Agilkia
//!
//! Trace management for model-based testing: an event/trace data model
//! with inherited metadata, lossless-where-possible JSON persistence and
//! algorithms that re-segment traces.
//!
//! This crate provides the core implementation for the
//! `agilkia` CLI tool.
//!
//! ## Getting Started
//!
//! ```ignore
//! use agilkia::{load_from_json, split_by_action, TypeRegistry};
//!
//! let traces = load_from_json("sessions.json", &TypeRegistry::new())?;
//! let orders = split_by_action(&traces, Some("Order"))?;
//! orders.save_to_json("orders.json")?;
//! ```

pub mod analysis;
pub mod codec;
pub mod commands;
pub mod display;
pub mod model;
pub mod output;
pub mod segment;
pub mod utils;

pub use analysis::{get_trace_data, Clusterer, TraceData, TraceFeature};
pub use codec::{from_json_str, to_json_string, Record, TypeRegistry};
pub use display::{default_map_to_chars, safe_name, trace_to_string, CharMap};
pub use model::{fields, Element, Event, Fields, ObjectRef, Trace, TraceSet, Value};
pub use output::{load_from_json, save_to_json};
pub use segment::{
    filter_events, group_by_input, group_by_meta, split_by_action, split_by_input_change,
    split_by_time_gap,
};
pub use utils::{ClusterError, DecodeError, EncodeError, OutputError, SegmentError};
