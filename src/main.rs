//! Agilkia CLI
//!
//! Trace management for model-based testing.
//! Inspects, splits, groups and filters traces files.

use agilkia::commands::{
    display_schema, display_version, execute_transform, inspect_file, parse_literal, show_traces,
    validate_args, Operation, TransformArgs,
};
use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// Agilkia - trace management for model-based testing
#[derive(Parser, Debug)]
#[command(name = "agilkia")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarise a traces file
    Info {
        /// Path to traces JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print each trace as one character per event
    Show {
        /// Path to traces JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Actions whose consecutive repeats are shown once (comma separated)
        #[arg(long, value_delimiter = ',')]
        compress: Vec<String>,

        /// Colour failed events red
        #[arg(long)]
        color: bool,

        /// Show at most this many traces
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Split traces into shorter traces
    Split {
        /// Input traces JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Output traces JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Start a new trace at each occurrence of this action
        #[arg(long)]
        action: Option<String>,

        /// Start a new trace whenever this input changes
        #[arg(long)]
        input: Option<String>,

        /// Cut where events are more than this many seconds apart
        #[arg(long)]
        gap_secs: Option<i64>,

        /// Print the resulting traces
        #[arg(long)]
        summary: bool,
    },

    /// Regroup events into one trace per distinct value
    Group {
        /// Input traces JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Output traces JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Group by this input
        #[arg(long, conflicts_with = "meta", required_unless_present = "meta")]
        input: Option<String>,

        /// Group by this event metadata key
        #[arg(long)]
        meta: Option<String>,

        /// Print the resulting traces
        #[arg(long)]
        summary: bool,
    },

    /// Keep only events with a given metadata value
    Filter {
        /// Input traces JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Output traces JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Event metadata key
        #[arg(long)]
        key: String,

        /// Expected value, as a JSON literal (3, "3", true, ...)
        #[arg(long)]
        value: String,

        /// Keep traces that lose all their events
        #[arg(long)]
        keep_empty: bool,

        /// Print the resulting traces
        #[arg(long)]
        summary: bool,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Info { file } => {
            inspect_file(file)?;
        }

        Commands::Show {
            file,
            compress,
            color,
            limit,
        } => {
            show_traces(file, &compress, color, limit)?;
        }

        Commands::Split {
            file,
            output,
            action,
            input,
            gap_secs,
            summary,
        } => {
            let operation = Operation::from_split_flags(action, input, gap_secs)?;
            run_transform(file, output, operation, summary)?;
        }

        Commands::Group {
            file,
            output,
            input,
            meta,
            summary,
        } => {
            let operation = match (input, meta) {
                (Some(input), _) => Operation::GroupByInput(input),
                (None, Some(meta)) => Operation::GroupByMeta(meta),
                (None, None) => anyhow::bail!("Choose one of --input or --meta"),
            };
            run_transform(file, output, operation, summary)?;
        }

        Commands::Filter {
            file,
            output,
            key,
            value,
            keep_empty,
            summary,
        } => {
            let operation = Operation::Filter {
                key,
                value: parse_literal(&value),
                keep_empty,
            };
            run_transform(file, output, operation, summary)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate and run one transform command
///
/// **Private** - shared by split, group and filter
fn run_transform(input: PathBuf, output: PathBuf, operation: Operation, print_summary: bool) -> Result<()> {
    let args = TransformArgs {
        input,
        output,
        operation,
        print_summary,
    };

    // Validate args first
    validate_args(&args)?;

    execute_transform(args)
}
