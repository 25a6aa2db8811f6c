//! JSON traces file reader and writer.
//!
//! Writes TraceSets as pretty-printed JSON and reads them back,
//! upgrading older file layouts on the way in.

use crate::codec::decode::Decoder;
use crate::codec::encode::Encoder;
use crate::codec::registry::TypeRegistry;
use crate::model::trace_set::TraceSet;
use crate::model::value::{iso_datetime, Value};
use crate::utils::config::{DATASET_KEY, DATE_KEY};
use crate::utils::error::{DecodeError, EncodeError, OutputError};
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write a trace set to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `traces` - set to write
/// * `output_path` - Path to output JSON file
///
/// # Returns
/// Ok if file written successfully
///
/// # Errors
/// * `OutputError::Encode` - the set cannot be encoded (nothing is written)
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let traces = split_by_action(&traces, Some("Login"))?;
/// save_to_json(&traces, "sessions.json")?;
/// ```
pub fn save_to_json(traces: &TraceSet, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing {} traces to: {}", traces.len(), output_path.display());

    validate_output_path(output_path)?;

    // Encode first so a failure leaves no partial file behind
    let document = Encoder::new().encode_trace_set(traces)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create directory {}: {}", parent.display(), e))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &document).map_err(EncodeError::from)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!("Traces written successfully ({} bytes)", calculate_file_size(output_path));

    Ok(())
}

/// Read a trace set from a JSON file
///
/// **Public** - main entry point for JSON input
///
/// # Arguments
/// * `input_path` - Path to JSON file
/// * `registry` - custom object types that may be rebuilt
///
/// # Returns
/// The loaded set. Files in the original list format get `dataset` set
/// to the file name and `date` to the file modification time.
///
/// # Errors
/// * `OutputError::ReadFailed` - file cannot be opened
/// * `OutputError::Decode` - not a valid traces file
pub fn load_from_json(input_path: impl AsRef<Path>, registry: &TypeRegistry) -> Result<TraceSet, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading traces from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::ReadFailed)?;
    let tree: serde_json::Value =
        serde_json::from_reader(BufReader::new(file)).map_err(DecodeError::from)?;

    let legacy = tree.is_array();
    let mut traces = Decoder::new(registry).decode_trace_set(tree)?;

    if legacy {
        if let Some(name) = input_path.file_name() {
            traces.set_meta(DATASET_KEY, name.to_string_lossy().into_owned());
        }
        if let Some(modified) = modification_time(input_path) {
            traces.set_meta(DATE_KEY, Value::from(modified));
        }
    }

    info!(
        "Loaded {} traces from {} (version {})",
        traces.len(),
        input_path.display(),
        traces.version()
    );

    Ok(traces)
}

impl TraceSet {
    /// Save this set, see [`save_to_json`]
    pub fn save_to_json(&self, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
        save_to_json(self, output_path)
    }

    /// Load a set, see [`load_from_json`]
    pub fn load_from_json(input_path: impl AsRef<Path>, registry: &TypeRegistry) -> Result<Self, OutputError> {
        load_from_json(input_path, registry)
    }
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Calculate file size in bytes
///
/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Local modification time of a file, ISO-8601
fn modification_time(path: &Path) -> Option<String> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let local: chrono::DateTime<chrono::Local> = modified.into();
    Some(iso_datetime(&local.naive_local()))
}
