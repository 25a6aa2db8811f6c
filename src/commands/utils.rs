use crate::codec::registry::TypeRegistry;
use crate::model::value::Value;
use crate::output::load_from_json;
use crate::utils::config::{FORMAT_VERSION, MODEL_MODULE};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Summarise a traces file
///
/// **Public** - implementation of the `info` command
pub fn inspect_file(file_path: PathBuf) -> Result<()> {
    println!("Inspecting traces: {}", file_path.display());

    let traces = load_from_json(&file_path, &TypeRegistry::new())
        .with_context(|| format!("Failed to load {}", file_path.display()))?;

    let events: usize = traces.iter().map(|trace| trace.len()).sum();
    let actions = traces.all_action_names();

    println!("✓ Valid traces JSON");
    println!("  Version: {}", traces.version());
    if traces.version_mismatch() {
        println!("  Warning: written by a newer version than {}", FORMAT_VERSION);
    }
    println!("  Dataset: {}", display_meta(&traces.get_meta("dataset")));
    println!("  Date: {}", display_meta(&traces.get_meta("date")));
    println!("  Traces: {}", traces.len());
    println!("  Events: {}", events);
    println!("  Actions ({}):", actions.len());
    let chars = traces.get_event_chars();
    for action in &actions {
        let ch = chars.get(action).copied().unwrap_or('?');
        println!("    {} {}", ch, action);
    }

    Ok(())
}

/// Print one line per trace, one character per event
///
/// **Public** - implementation of the `show` command
pub fn show_traces(file_path: PathBuf, compress: &[String], color: bool, limit: Option<usize>) -> Result<()> {
    let traces = load_from_json(&file_path, &TypeRegistry::new())
        .with_context(|| format!("Failed to load {}", file_path.display()))?;

    let compress: Vec<&str> = compress.iter().map(String::as_str).collect();
    let shown = limit.unwrap_or(traces.len()).min(traces.len());
    for index in 0..shown {
        if let Some(line) = traces.trace_to_string(index, &compress, color) {
            println!("{}", line);
        }
    }
    if shown < traces.len() {
        println!("... {} more traces", traces.len() - shown);
    }

    Ok(())
}

/// Display schema information
///
/// **Public** - implementation of the `schema` command
pub fn display_schema(show_details: bool) {
    println!("Agilkia Traces File Schema");
    println!("Current Version: {}", FORMAT_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  __class__: \"TraceSet\"     - Type tag");
        println!("  __module__: string        - Always '{}'", MODEL_MODULE);
        println!("  version: string           - Format version (e.g., '{}')", FORMAT_VERSION);
        println!("  meta_data: object         - Set-level metadata (dataset, date, author, ...)");
        println!("  traces: array             - Traces, in order");
        println!("    __class__: \"Trace\"");
        println!("    events: array           - Events, in order");
        println!("      __class__: \"Event\"");
        println!("      action: string        - Action name");
        println!("      inputs: object        - Named input values");
        println!("      outputs: object       - Named output values ('Status', 'Error')");
        println!("      meta_data: object     - Event metadata ('timestamp', ...)");
        println!("    meta_data: object       - Trace metadata");
        println!();
        println!("Custom objects inside values are tagged with __class__ and __module__.");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
///
/// **Public** - implementation of the `version` command
pub fn display_version() {
    println!("Agilkia v{}", env!("CARGO_PKG_VERSION"));
    println!("Traces Format: v{}", FORMAT_VERSION);
    println!();
    println!("Trace management for model-based testing: load, split, group and filter traces.");
}

fn display_meta(value: &Value) -> String {
    match value {
        Value::Str(text) => text.clone(),
        other => other.to_string(),
    }
}
