//! Per-trace feature vectors for clustering and statistics.
//!
//! Each trace is summarised as a row of counts. Columns are the sorted
//! union of the keys seen across all traces, unless the caller fixes them.

use crate::model::trace::Trace;
use crate::model::trace_set::TraceSet;
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;

/// What to count in each trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceFeature {
    /// Occurrences of each action
    #[default]
    ActionCounts,
    /// Occurrences of each `action_status` pair
    ActionStatusCounts,
}

impl TraceFeature {
    fn counts(&self, trace: &Trace) -> IndexMap<String, usize> {
        match self {
            TraceFeature::ActionCounts => trace.action_counts(),
            TraceFeature::ActionStatusCounts => trace.action_status_counts(),
        }
    }
}

/// One row of counts per trace
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TraceData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<usize>>,
}

impl TraceData {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<usize>> {
        let index = self.columns.iter().position(|column| column == name)?;
        Some(self.rows.iter().map(|row| row[index]).collect())
    }
}

/// Build the feature matrix of a set
///
/// **Public** - input to `TraceSet::create_clusters`
///
/// # Arguments
/// * `traces` - set to summarise
/// * `feature` - what to count
/// * `columns` - fixed column names; `None` uses every key seen, sorted
///
/// # Returns
/// One row per trace; counts missing from a trace are zero
pub fn get_trace_data(traces: &TraceSet, feature: TraceFeature, columns: Option<&[String]>) -> TraceData {
    let counts: Vec<IndexMap<String, usize>> = traces.iter().map(|trace| feature.counts(trace)).collect();

    let columns: Vec<String> = match columns {
        Some(columns) => columns.to_vec(),
        None => counts
            .iter()
            .flat_map(|row| row.keys().cloned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect(),
    };

    let rows = counts
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    debug!("{:?} matrix: {} traces x {} columns", feature, traces.len(), columns.len());
    TraceData { columns, rows }
}

impl TraceSet {
    /// Feature matrix of this set, see [`get_trace_data`]
    pub fn get_trace_data(&self, feature: TraceFeature, columns: Option<&[String]>) -> TraceData {
        get_trace_data(self, feature, columns)
    }
}
