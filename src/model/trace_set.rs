//! A collection of traces plus set-level metadata.
//!
//! The set owns its metadata through a shared scope. Member traces hold
//! weak references to that scope, which gives them read access to the
//! set's metadata without creating ownership cycles.
//!
//! Transient state (cluster labels, the action char cache) is never
//! persisted and is invalidated whenever a trace is appended.

use crate::analysis::clusters::Clusterer;
use crate::analysis::features::TraceData;
use crate::display::chars::{default_map_to_chars, CharMap};
use crate::model::trace::Trace;
use crate::model::value::{iso_datetime, Fields, Value};
use crate::utils::config::{ACTION_CHARS_KEY, DATASET_KEY, DATE_KEY, FORMAT_VERSION, UNKNOWN};
use crate::utils::error::ClusterError;
use log::{debug, info};
use std::cell::{Ref, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Index;
use std::rc::Rc;

/// Metadata scope shared between a set and its member traces
#[derive(Debug, Default)]
pub struct SetScope {
    meta_data: RefCell<Fields>,
}

impl SetScope {
    fn new(meta_data: Fields) -> Self {
        Self {
            meta_data: RefCell::new(meta_data),
        }
    }

    pub(crate) fn get(&self, key: &str) -> Value {
        self.meta_data
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::from(UNKNOWN))
    }
}

/// A set of traces, for example all traces recorded on one system
#[derive(Debug)]
pub struct TraceSet {
    scope: Rc<SetScope>,
    traces: Vec<Rc<Trace>>,
    version: String,
    version_mismatch: bool,
    clusters: Option<Vec<usize>>,
    event_chars: RefCell<Option<CharMap>>,
}

impl TraceSet {
    /// Create an empty set with the given metadata
    pub fn new(meta_data: Fields) -> Self {
        Self {
            scope: Rc::new(SetScope::new(meta_data)),
            traces: Vec::new(),
            version: FORMAT_VERSION.to_string(),
            version_mismatch: false,
            clusters: None,
            event_chars: RefCell::new(None),
        }
    }

    /// Create a set from existing traces, inheriting metadata
    ///
    /// **Public** - used to regroup traces taken from other sets
    ///
    /// If every trace that already belongs to a set came from the same
    /// set, that set's metadata is copied (with a fresh `date`).
    /// Otherwise the default metadata is used.
    pub fn from_traces<I, T>(traces: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Rc<Trace>>,
    {
        let traces: Vec<Rc<Trace>> = traces.into_iter().map(Into::into).collect();

        let mut parents: Vec<Rc<SetScope>> = Vec::new();
        for parent in traces.iter().filter_map(|trace| trace.latest_owner()) {
            if !parents.iter().any(|known| Rc::ptr_eq(known, &parent)) {
                parents.push(parent);
            }
        }

        let meta_data = match parents.as_slice() {
            [parent] => {
                let mut meta = parent.meta_data.borrow().clone();
                meta.insert(DATE_KEY.to_string(), Value::from(now_iso()));
                meta
            }
            _ => {
                debug!("{} parent sets found, using default metadata", parents.len());
                Self::default_meta_data()
            }
        };

        let mut set = Self::new(meta_data);
        for trace in traces {
            set.append(trace);
        }
        set
    }

    /// Default metadata for a freshly created set
    ///
    /// **Public** - also useful as a starting point for custom metadata
    ///
    /// # Returns
    /// `date` (now), `author` (current user), `dataset` ("unknown"),
    /// `action_chars` (null), `source` and `cmdline` (this process)
    pub fn default_meta_data() -> Fields {
        let mut meta = Fields::new();
        meta.insert(DATE_KEY.to_string(), Value::from(now_iso()));
        let author = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .and_then(|home| {
                std::path::Path::new(&home)
                    .file_name()
                    .map(|leaf| leaf.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| UNKNOWN.to_string());
        meta.insert("author".to_string(), Value::from(author));
        meta.insert(DATASET_KEY.to_string(), Value::from(UNKNOWN));
        meta.insert(ACTION_CHARS_KEY.to_string(), Value::Null);
        let args: Vec<String> = std::env::args().collect();
        if let Some(program) = args.first() {
            meta.insert("source".to_string(), Value::from(program.as_str()));
        }
        meta.insert("cmdline".to_string(), Value::from(args));
        meta
    }

    /// Format version this set was loaded with (or will be saved with)
    pub fn version(&self) -> &str {
        &self.version
    }

    /// True when the set was loaded from a newer format version
    pub fn version_mismatch(&self) -> bool {
        self.version_mismatch
    }

    pub(crate) fn restore_version(&mut self, version: String, mismatch: bool) {
        self.version = version;
        self.version_mismatch = mismatch;
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rc<Trace>> {
        self.traces.get(index)
    }

    pub fn traces(&self) -> &[Rc<Trace>] {
        &self.traces
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rc<Trace>> {
        self.traces.iter()
    }

    /// Mutable access to a member trace, to edit its events or metadata
    ///
    /// **Public** - appended traces are shared, so this is the way to
    /// change them afterwards
    ///
    /// A trace also held elsewhere (another set or a caller's `Rc`) is
    /// first replaced by a private copy owned by this set, so other holders
    /// never see the edit. Invalidates cached action chars.
    ///
    /// # Returns
    /// `None` when `index` is out of range
    pub fn trace_mut(&mut self, index: usize) -> Option<&mut Trace> {
        let shared = Rc::get_mut(self.traces.get_mut(index)?).is_none();
        if shared {
            debug!("Trace {} is shared, editing a private copy", index);
            let copy = Rc::new(Trace::clone(&self.traces[index]));
            copy.adopt(&self.scope);
            let previous = std::mem::replace(&mut self.traces[index], copy);
            if !self.traces.iter().any(|trace| Rc::ptr_eq(trace, &previous)) {
                previous.disown(&self.scope);
            }
        }
        *self.event_chars.get_mut() = None;
        Rc::get_mut(&mut self.traces[index])
    }

    /// Add a trace and make this set one of its owners
    ///
    /// **Public** - the only way traces enter a set
    ///
    /// Invalidates any cluster assignment and cached action chars.
    pub fn append(&mut self, trace: impl Into<Rc<Trace>>) {
        let trace = trace.into();
        trace.adopt(&self.scope);
        self.traces.push(trace);
        *self.event_chars.get_mut() = None;
        if self.clusters.take().is_some() {
            debug!("Cluster assignment discarded after append");
        }
    }

    /// Set-level metadata value, or the `"unknown"` sentinel
    pub fn get_meta(&self, key: &str) -> Value {
        self.scope.get(key)
    }

    /// Set a metadata value, returning the previous one
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        if key == ACTION_CHARS_KEY {
            *self.event_chars.get_mut() = None;
        }
        self.scope.meta_data.borrow_mut().insert(key, value.into())
    }

    pub fn meta_data(&self) -> Ref<'_, Fields> {
        self.scope.meta_data.borrow()
    }

    /// Sorted set of every action name used in any trace
    pub fn all_action_names(&self) -> BTreeSet<String> {
        self.traces
            .iter()
            .flat_map(|trace| trace.iter())
            .map(|event| event.action().to_string())
            .collect()
    }

    /// Fix the action-to-char mapping
    ///
    /// **Public** - lets callers choose characters for some actions
    ///
    /// # Arguments
    /// * `given` - preferred characters; stored in the `action_chars`
    ///   metadata so they survive a save. `None` reuses the stored ones.
    pub fn set_event_chars(&mut self, given: Option<&CharMap>) {
        if let Some(given) = given {
            let stored: Fields = given
                .iter()
                .map(|(action, ch)| (action.clone(), Value::from(*ch)))
                .collect();
            self.scope
                .meta_data
                .borrow_mut()
                .insert(ACTION_CHARS_KEY.to_string(), Value::Map(stored));
        }
        let chars = self.compute_event_chars();
        *self.event_chars.get_mut() = Some(chars);
    }

    /// Current action-to-char mapping, computed on first use
    pub fn get_event_chars(&self) -> CharMap {
        if let Some(chars) = self.event_chars.borrow().as_ref() {
            return chars.clone();
        }
        let chars = self.compute_event_chars();
        *self.event_chars.borrow_mut() = Some(chars.clone());
        chars
    }

    fn compute_event_chars(&self) -> CharMap {
        let given = self.stored_event_chars();
        default_map_to_chars(self.all_action_names(), &given)
    }

    fn stored_event_chars(&self) -> CharMap {
        let meta = self.scope.meta_data.borrow();
        let Some(Value::Map(stored)) = meta.get(ACTION_CHARS_KEY) else {
            return CharMap::new();
        };
        stored
            .iter()
            .filter_map(|(action, ch)| {
                let ch = ch.as_str()?.chars().next()?;
                Some((action.clone(), ch))
            })
            .collect()
    }

    /// One trace as a string of action chars
    ///
    /// # Returns
    /// `None` when `index` is out of range
    pub fn trace_to_string(&self, index: usize, compress: &[&str], color_status: bool) -> Option<String> {
        let trace = self.traces.get(index)?;
        Some(trace.to_chars(&self.get_event_chars(), compress, color_status))
    }

    /// Cluster the traces with an external algorithm
    ///
    /// **Public** - attaches transient cluster labels to this set
    ///
    /// # Arguments
    /// * `data` - one feature row per trace, see `get_trace_data`
    /// * `algorithm` - clustering implementation
    ///
    /// # Returns
    /// Number of clusters found
    ///
    /// # Errors
    /// * `ClusterError::LengthMismatch` - rows or labels do not match the traces
    pub fn create_clusters(
        &mut self,
        data: &TraceData,
        algorithm: &mut dyn Clusterer,
    ) -> Result<usize, ClusterError> {
        if data.rows.len() != self.traces.len() {
            return Err(ClusterError::LengthMismatch {
                expected: self.traces.len(),
                found: data.rows.len(),
            });
        }
        let labels = algorithm.fit(data);
        let count = self.set_clusters(labels)?;
        info!("{} found {} clusters in {} traces", algorithm.name(), count, self.traces.len());
        Ok(count)
    }

    /// Attach precomputed cluster labels, one per trace
    ///
    /// # Returns
    /// Number of clusters (highest label plus one)
    pub fn set_clusters(&mut self, labels: Vec<usize>) -> Result<usize, ClusterError> {
        if labels.len() != self.traces.len() {
            return Err(ClusterError::LengthMismatch {
                expected: self.traces.len(),
                found: labels.len(),
            });
        }
        let count = labels.iter().max().map_or(0, |highest| highest + 1);
        self.clusters = Some(labels);
        Ok(count)
    }

    pub fn is_clustered(&self) -> bool {
        self.clusters.is_some()
    }

    /// Cluster label of each trace, if clustered
    pub fn get_clusters(&self) -> Option<&[usize]> {
        self.clusters.as_deref()
    }

    /// All traces assigned to cluster `num`
    ///
    /// # Errors
    /// * `ClusterError::NotClustered` - no current cluster assignment
    pub fn get_cluster(&self, num: usize) -> Result<Vec<Rc<Trace>>, ClusterError> {
        let labels = self.clusters.as_ref().ok_or(ClusterError::NotClustered)?;
        Ok(self
            .traces
            .iter()
            .zip(labels)
            .filter(|(_, label)| **label == num)
            .map(|(trace, _)| Rc::clone(trace))
            .collect())
    }
}

impl Default for TraceSet {
    fn default() -> Self {
        Self::new(Self::default_meta_data())
    }
}

impl Index<usize> for TraceSet {
    type Output = Trace;

    fn index(&self, index: usize) -> &Trace {
        &self.traces[index]
    }
}

impl<'a> IntoIterator for &'a TraceSet {
    type Item = &'a Rc<Trace>;
    type IntoIter = std::slice::Iter<'a, Rc<Trace>>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}

impl fmt::Display for TraceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dataset = self.get_meta(DATASET_KEY);
        let name = dataset.as_str().map_or_else(|| dataset.to_string(), str::to_string);
        write!(f, "TraceSet '{}' with {} traces.", name, self.traces.len())
    }
}

fn now_iso() -> String {
    iso_datetime(&chrono::Local::now().naive_local())
}
