//! Flat, one-row-per-event view of a trace set.
//!
//! Suited to spreadsheets and dataframe tools: fixed leading columns
//! (`Trace`, `Event`, `Action`, `Status`, `Error`) followed by every
//! input and output name in encounter order.

use crate::model::event::Event;
use crate::model::trace_set::TraceSet;
use crate::model::value::Value;
use crate::utils::config::{ERROR_KEY, STATUS_KEY};
use indexmap::IndexSet;

/// Leading columns of every table
pub const FIXED_COLUMNS: [&str; 5] = ["Trace", "Event", "Action", "Status", "Error"];

/// One event with its position in the set
#[derive(Debug, Clone, Copy)]
pub struct EventRow<'a> {
    pub trace: usize,
    pub event: usize,
    pub record: &'a Event,
}

impl<'a> EventRow<'a> {
    pub fn action(&self) -> &'a str {
        self.record.action()
    }

    pub fn status(&self) -> i64 {
        self.record.status()
    }

    pub fn error_message(&self) -> String {
        self.record.error_message()
    }

    /// Value of a table column for this row; `None` for an empty cell
    pub fn cell(&self, column: &str) -> Option<Value> {
        match column {
            "Trace" => i64::try_from(self.trace).ok().map(Value::Int),
            "Event" => i64::try_from(self.event).ok().map(Value::Int),
            "Action" => Some(Value::from(self.action())),
            "Status" => Some(Value::Int(self.status())),
            "Error" => Some(Value::from(self.error_message())),
            name => self
                .record
                .input(name)
                .or_else(|| self.record.output(name))
                .cloned(),
        }
    }
}

/// Column names of the table view of `traces`
pub fn table_columns(traces: &TraceSet) -> Vec<String> {
    let mut columns: IndexSet<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    for event in traces.iter().flat_map(|trace| trace.iter()) {
        columns.extend(event.inputs().keys().cloned());
    }
    for event in traces.iter().flat_map(|trace| trace.iter()) {
        columns.extend(
            event
                .outputs()
                .keys()
                .filter(|key| *key != STATUS_KEY && *key != ERROR_KEY)
                .cloned(),
        );
    }
    columns.into_iter().collect()
}

/// Every event of the set, trace by trace
pub fn event_rows(traces: &TraceSet) -> impl Iterator<Item = EventRow<'_>> {
    traces.iter().enumerate().flat_map(|(trace_index, trace)| {
        trace.iter().enumerate().map(move |(event_index, record)| EventRow {
            trace: trace_index,
            event: event_index,
            record,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::trace::Trace;
    use crate::model::value::{fields, Fields};
    use pretty_assertions::assert_eq;

    fn sample() -> TraceSet {
        let mut set = TraceSet::new(Fields::new());
        set.append(Trace::new(vec![
            Event::new("Order", fields([("Name", "Mark")]), fields([("Status", 0)])),
            Event::new(
                "Pay",
                fields([("Amount", 3.5)]),
                fields([("Status", Value::from(2)), ("Error", Value::from("Declined")), ("Receipt", Value::Null)]),
            ),
        ]));
        set.append(Trace::new(vec![Event::new("Skip", Fields::new(), Fields::new())]));
        set
    }

    #[test]
    fn test_columns() {
        assert_eq!(
            table_columns(&sample()),
            vec!["Trace", "Event", "Action", "Status", "Error", "Name", "Amount", "Receipt"]
        );
    }

    #[test]
    fn test_rows() {
        let set = sample();
        let rows: Vec<EventRow<'_>> = event_rows(&set).collect();
        assert_eq!(rows.len(), 3);

        let pay = rows[1];
        assert_eq!((pay.trace, pay.event), (0, 1));
        assert_eq!(pay.cell("Status"), Some(Value::Int(2)));
        assert_eq!(pay.cell("Error"), Some(Value::from("Declined")));
        assert_eq!(pay.cell("Amount"), Some(Value::Float(3.5)));
        assert_eq!(pay.cell("Name"), None);

        let skip = rows[2];
        assert_eq!(skip.cell("Trace"), Some(Value::Int(1)));
        assert_eq!(skip.cell("Error"), Some(Value::from("")));
    }
}
