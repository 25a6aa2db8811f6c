//! Trace data model.
//!
//! - `value` - dynamic values stored in events and metadata
//! - `event` - one action call with inputs, outputs and metadata
//! - `trace` - an ordered sequence of events
//! - `trace_set` - a collection of traces with set-level metadata
//! - `markup` - flattening of markup trees into values

pub mod event;
pub mod markup;
pub mod trace;
pub mod trace_set;
pub mod value;

pub use event::{parse_timestamp, Event};
pub use markup::Element;
pub use trace::Trace;
pub use trace_set::TraceSet;
pub use value::{fields, Fields, Object, ObjectRef, Value};
