//! An ordered sequence of events, e.g. one test case or one user session.
//!
//! A trace may belong to several trace sets at once. It keeps only weak
//! back-references to those sets, so it never keeps a set alive and
//! metadata lookups simply ignore sets that have been dropped.

use crate::display::chars::{trace_to_string, CharMap};
use crate::model::event::Event;
use crate::model::trace_set::SetScope;
use crate::model::value::{Fields, Value};
use crate::utils::config::{RANDOM_STATE_KEY, UNKNOWN};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Index;
use std::rc::{Rc, Weak};

/// Ordered list of events plus trace-level metadata
#[derive(Debug, Default)]
pub struct Trace {
    events: Vec<Event>,
    pub meta_data: Fields,
    owners: RefCell<Vec<Weak<SetScope>>>,
}

impl Trace {
    pub fn new(events: Vec<Event>) -> Self {
        Self::with_meta(events, Fields::new())
    }

    pub fn with_meta(events: Vec<Event>, meta_data: Fields) -> Self {
        Self {
            events,
            meta_data,
            owners: RefCell::new(Vec::new()),
        }
    }

    /// Record the generator state that produced this trace
    pub fn with_random_state(mut self, state: impl Into<Value>) -> Self {
        self.meta_data.insert(RANDOM_STATE_KEY.to_string(), state.into());
        self
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Metadata lookup with inheritance
    ///
    /// **Public** - main metadata accessor for traces
    ///
    /// # Returns
    /// The trace's own entry when present. Otherwise the entry of the one
    /// live set containing this trace. The `"unknown"` sentinel when the
    /// key is missing or the trace belongs to no set or to several sets.
    pub fn get_meta(&self, key: &str) -> Value {
        if let Some(value) = self.meta_data.get(key) {
            return value.clone();
        }
        match self.sole_owner() {
            Some(scope) => scope.get(key),
            None => Value::from(UNKNOWN),
        }
    }

    /// Set a trace-level metadata value, returning the previous one
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.meta_data.insert(key.into(), value.into())
    }

    /// Count of each action name, in first-seen order
    pub fn action_counts(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for event in &self.events {
            *counts.entry(event.action().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Count of each `action_status` pair, e.g. `"Order_0"`
    pub fn action_status_counts(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for event in &self.events {
            let key = format!("{}_{}", event.action(), event.status());
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }

    /// One character per event, using the given action char map
    pub fn to_chars(&self, to_char: &CharMap, compress: &[&str], color_status: bool) -> String {
        trace_to_string(&self.events, to_char, compress, color_status)
    }

    /// Register a set that now contains this trace
    ///
    /// **Private** - called by `TraceSet::append`
    pub(crate) fn adopt(&self, scope: &Rc<SetScope>) {
        let mut owners = self.owners.borrow_mut();
        owners.retain(|owner| owner.strong_count() > 0);
        let candidate = Rc::downgrade(scope);
        if !owners.iter().any(|owner| Weak::ptr_eq(owner, &candidate)) {
            owners.push(candidate);
        }
    }

    /// Forget a set that no longer contains this trace
    ///
    /// **Private** - called by `TraceSet::trace_mut`
    pub(crate) fn disown(&self, scope: &Rc<SetScope>) {
        let gone = Rc::downgrade(scope);
        self.owners
            .borrow_mut()
            .retain(|owner| owner.strong_count() > 0 && !Weak::ptr_eq(owner, &gone));
    }

    /// Most recent live set that adopted this trace
    ///
    /// **Private** - used when a new set inherits metadata
    pub(crate) fn latest_owner(&self) -> Option<Rc<SetScope>> {
        self.owners.borrow().iter().rev().find_map(Weak::upgrade)
    }

    fn sole_owner(&self) -> Option<Rc<SetScope>> {
        let live: Vec<Rc<SetScope>> = self.owners.borrow().iter().filter_map(Weak::upgrade).collect();
        match live.as_slice() {
            [only] => Some(Rc::clone(only)),
            _ => None,
        }
    }
}

/// Copies events and metadata; the copy belongs to no set.
impl Clone for Trace {
    fn clone(&self) -> Self {
        Self::with_meta(self.events.clone(), self.meta_data.clone())
    }
}

impl PartialEq for Trace {
    fn eq(&self, other: &Self) -> bool {
        self.events == other.events && self.meta_data == other.meta_data
    }
}

impl Index<usize> for Trace {
    type Output = Event;

    fn index(&self, index: usize) -> &Event {
        &self.events[index]
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl FromIterator<Event> for Trace {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trace(")?;
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", event)?;
        }
        write!(f, ")")
    }
}
