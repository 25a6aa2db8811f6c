//! Seam for external clustering algorithms.
//!
//! The library does not cluster traces itself. Callers plug in any
//! algorithm that maps feature rows to labels; the resulting assignment
//! is kept on the `TraceSet` until the set changes.

use crate::analysis::features::TraceData;

/// A clustering algorithm over trace feature rows
pub trait Clusterer {
    /// Name used in log messages
    fn name(&self) -> &str {
        "clusterer"
    }

    /// Assign a cluster label (0, 1, ...) to every row of `data`
    fn fit(&mut self, data: &TraceData) -> Vec<usize>;
}

/// Groups traces with identical feature rows
///
/// Labels are given in order of first appearance. Handy as a baseline,
/// and to find duplicate behaviours in generated test suites.
#[derive(Debug, Default)]
pub struct ExactMatchClusterer;

impl Clusterer for ExactMatchClusterer {
    fn name(&self) -> &str {
        "exact-match"
    }

    fn fit(&mut self, data: &TraceData) -> Vec<usize> {
        let mut seen: Vec<&Vec<usize>> = Vec::new();
        data.rows
            .iter()
            .map(|row| match seen.iter().position(|known| *known == row) {
                Some(label) => label,
                None => {
                    seen.push(row);
                    seen.len() - 1
                }
            })
            .collect()
    }
}
