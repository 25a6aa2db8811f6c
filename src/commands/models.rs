use crate::codec;
use crate::model::value::Value;
use std::path::PathBuf;

/// A segmentation step applied by the transform commands
///
/// **Public** - built by main.rs from CLI flags
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Start a new trace at each occurrence of the action
    SplitByAction(Option<String>),

    /// Start a new trace whenever the input changes
    SplitByInput(String),

    /// Cut where consecutive events are more than this many seconds apart
    SplitByGap(i64),

    /// One trace per distinct input value
    GroupByInput(String),

    /// One trace per distinct event metadata value
    GroupByMeta(String),

    /// Keep events whose metadata `key` equals `value`
    Filter {
        key: String,
        value: Value,
        keep_empty: bool,
    },
}

impl Operation {
    /// Pick the split operation from the `split` command flags
    ///
    /// **Public** - at most one criterion may be given. With none, the
    /// action split is chosen without an action and fails later as
    /// ambiguous.
    pub fn from_split_flags(
        action: Option<String>,
        input: Option<String>,
        gap_secs: Option<i64>,
    ) -> anyhow::Result<Self> {
        match (action, input, gap_secs) {
            (action, None, None) => Ok(Operation::SplitByAction(action)),
            (None, Some(input), None) => Ok(Operation::SplitByInput(input)),
            (None, None, Some(secs)) => Ok(Operation::SplitByGap(secs)),
            _ => anyhow::bail!("Choose only one of --action, --input or --gap-secs"),
        }
    }

    /// Short name for log messages
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SplitByAction(_) => "split by action",
            Operation::SplitByInput(_) => "split by input change",
            Operation::SplitByGap(_) => "split by time gap",
            Operation::GroupByInput(_) => "group by input",
            Operation::GroupByMeta(_) => "group by metadata",
            Operation::Filter { .. } => "filter events",
        }
    }
}

/// Arguments for the transform commands (split, group, filter)
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct TransformArgs {
    /// Traces file to read
    pub input: PathBuf,

    /// Traces file to write
    pub output: PathBuf,

    /// What to do with the traces
    pub operation: Operation,

    /// Print one line per output trace
    pub print_summary: bool,
}

impl Default for TransformArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("traces.json"),
            output: PathBuf::from("traces.out.json"),
            operation: Operation::SplitByAction(None),
            print_summary: false,
        }
    }
}

/// Parse a command-line value as a JSON literal
///
/// **Public** - `3` is a number, `"3"` or `abc` a string, `true` a bool
pub fn parse_literal(text: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|tree| codec::decode_value(tree).ok())
        .unwrap_or_else(|| Value::from(text))
}
