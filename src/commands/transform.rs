//! Transform command implementation.
//!
//! The split, group and filter commands:
//! 1. Load the traces file
//! 2. Apply one segmentation operation
//! 3. Write the resulting traces file

use crate::codec::registry::TypeRegistry;
use crate::commands::models::{Operation, TransformArgs};
use crate::model::trace_set::TraceSet;
use crate::output::{load_from_json, save_to_json};
use crate::segment::{
    filter_events, group_by_input, group_by_meta, split_by_action, split_by_input_change,
    split_by_time_gap,
};
use anyhow::{Context, Result};
use chrono::TimeDelta;
use log::{debug, info};
use std::time::Instant;

/// Execute a transform command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Transform command arguments
///
/// # Returns
/// Ok if the output file was written, Err with context if any step fails
///
/// # Errors
/// * Unreadable or invalid input file
/// * Ambiguous split request
/// * File write errors
pub fn execute_transform(args: TransformArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Starting {} on: {}", args.operation.name(), args.input.display());

    info!("Step 1/3: Loading traces...");
    let traces = load_from_json(&args.input, &TypeRegistry::new())
        .with_context(|| format!("Failed to load traces from {}", args.input.display()))?;

    info!("Step 2/3: Applying {}...", args.operation.name());
    let result = apply_operation(&traces, &args.operation)?;

    debug!(
        "{} traces / {} events in, {} traces / {} events out",
        traces.len(),
        count_events(&traces),
        result.len(),
        count_events(&result)
    );

    info!("Step 3/3: Writing output file...");
    save_to_json(&result, &args.output).context("Failed to write traces JSON")?;

    info!("✓ {} traces written to: {}", result.len(), args.output.display());

    if args.print_summary {
        let chars = result.get_event_chars();
        for trace in &result {
            println!("{}", trace.to_chars(&chars, &[], false));
        }
    }

    info!("Transform completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

/// Run one operation on a loaded set
///
/// **Public** - also usable without touching the file system
pub fn apply_operation(traces: &TraceSet, operation: &Operation) -> Result<TraceSet> {
    let result = match operation {
        Operation::SplitByAction(action) => {
            split_by_action(traces, action.as_deref()).context("Cannot split traces")?
        }
        Operation::SplitByInput(input) => split_by_input_change(traces, input),
        Operation::SplitByGap(secs) => split_by_time_gap(traces, gap_duration(*secs)?),
        Operation::GroupByInput(input) => group_by_input(traces, input),
        Operation::GroupByMeta(key) => group_by_meta(traces, key),
        Operation::Filter {
            key,
            value,
            keep_empty,
        } => filter_events(traces, key, value, !keep_empty),
    };
    Ok(result)
}

fn gap_duration(secs: i64) -> Result<TimeDelta> {
    TimeDelta::try_seconds(secs).with_context(|| format!("Time gap of {} seconds is out of range", secs))
}

fn count_events(traces: &TraceSet) -> usize {
    traces.iter().map(|trace| trace.len()).sum()
}

/// Validate transform arguments
///
/// **Public** - can be called before execute_transform for early validation
///
/// # Arguments
/// * `args` - Arguments to validate
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &TransformArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.output == args.input {
        anyhow::bail!("Output path must differ from the input path");
    }

    match &args.operation {
        Operation::SplitByAction(Some(name))
        | Operation::SplitByInput(name)
        | Operation::GroupByInput(name)
        | Operation::GroupByMeta(name)
            if name.trim().is_empty() =>
        {
            anyhow::bail!("Name for {} cannot be empty", args.operation.name());
        }
        Operation::SplitByGap(secs) if *secs <= 0 => {
            anyhow::bail!("Time gap must be greater than 0 seconds");
        }
        Operation::SplitByGap(secs) => {
            gap_duration(*secs)?;
        }
        Operation::Filter { key, .. } if key.trim().is_empty() => {
            anyhow::bail!("Filter key cannot be empty");
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::Event;
    use crate::model::trace::Trace;
    use crate::model::value::{fields, Fields, Value};
    use tempfile::NamedTempFile;

    fn args_for(input: &NamedTempFile, operation: Operation) -> TransformArgs {
        TransformArgs {
            input: input.path().to_path_buf(),
            output: input.path().with_extension("out.json"),
            operation,
            print_summary: false,
        }
    }

    #[test]
    fn test_validate_args_valid() {
        let input = NamedTempFile::new().unwrap();
        let args = args_for(&input, Operation::SplitByAction(Some("Order".into())));
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_missing_input() {
        let args = TransformArgs {
            input: "does/not/exist.json".into(),
            ..TransformArgs::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_same_output() {
        let input = NamedTempFile::new().unwrap();
        let mut args = args_for(&input, Operation::GroupByInput("Name".into()));
        args.output = args.input.clone();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_empty_name() {
        let input = NamedTempFile::new().unwrap();
        let args = args_for(&input, Operation::SplitByInput(" ".into()));
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_gap_zero() {
        let input = NamedTempFile::new().unwrap();
        let args = args_for(&input, Operation::SplitByGap(0));
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_gap_out_of_range() {
        let input = NamedTempFile::new().unwrap();
        let args = args_for(&input, Operation::SplitByGap(i64::MAX));
        assert!(validate_args(&args).is_err());

        let traces = TraceSet::new(Fields::new());
        assert!(apply_operation(&traces, &Operation::SplitByGap(i64::MAX)).is_err());
        assert!(apply_operation(&traces, &Operation::SplitByGap(60)).is_ok());
    }

    #[test]
    fn test_ambiguous_split_fails() {
        let traces = TraceSet::new(Fields::new());
        assert!(apply_operation(&traces, &Operation::SplitByAction(None)).is_err());
    }

    #[test]
    fn test_execute_transform_writes_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("in.json");
        let output = temp_dir.path().join("out.json");

        let mut traces = TraceSet::new(Fields::new());
        let event = |action: &str, level: i64| {
            Event::with_meta(action, Fields::new(), Fields::new(), fields([("level", level)]))
        };
        traces.append(Trace::new(vec![event("Order", 1), event("Pay", 2)]));
        traces.save_to_json(&input).unwrap();

        let args = TransformArgs {
            input,
            output: output.clone(),
            operation: Operation::Filter {
                key: "level".into(),
                value: Value::Int(2),
                keep_empty: false,
            },
            print_summary: false,
        };
        execute_transform(args).unwrap();

        let result = TraceSet::load_from_json(&output, &TypeRegistry::new()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 1);
        assert_eq!(result[0][0].action(), "Pay");
    }
}
