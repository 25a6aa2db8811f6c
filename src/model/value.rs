//! Dynamic values carried by event inputs, outputs and metadata.
//!
//! A [`Value`] is one of:
//! - a primitive (null, bool, integer, float, string)
//! - a rich scalar (decimal, date/time, time-of-day)
//! - a container (list, set, ordered string-keyed map)
//! - a custom object with reference identity ([`ObjectRef`])
//!
//! Custom objects are shared handles, so the same object can appear in
//! several places (or inside itself). The encoder relies on that identity
//! to reject cycles.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// Ordered string-keyed mapping used for inputs, outputs and metadata
pub type Fields = IndexMap<String, Value>;

/// Build a [`Fields`] map from key/value pairs
///
/// **Public** - convenience constructor used throughout tests and callers
pub fn fields<I, K, V>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// A dynamically-typed value
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    List(Vec<Value>),
    /// Unordered collection; element order is not meaningful
    Set(Vec<Value>),
    Map(Fields),
    Object(ObjectRef),
}

impl Value {
    /// Build a set, dropping duplicate elements
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let mut unique: Vec<Value> = Vec::new();
        for item in items {
            let item = item.into();
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Value::Set(unique)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            Value::Decimal(d) => d.to_string().parse().ok(),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Elements of a list or set
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, for log messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Decimal(_) => "decimal",
            Value::DateTime(_) => "datetime",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }
}

/// Equality is structural, except that integers and floats compare
/// numerically. A number never equals its string rendering.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_eq(self, other, &mut Vec::new())
    }
}

/// Object pairs currently being compared. A pair reached again while it is
/// still on the stack is taken as equal, so cyclic objects terminate.
type Visited = Vec<(usize, usize)>;

fn values_eq(left: &Value, right: &Value, visited: &mut Visited) -> bool {
    use Value::*;
    match (left, right) {
        (Null, Null) => true,
        (Bool(a), Bool(b)) => a == b,
        (Int(a), Int(b)) => a == b,
        (Float(a), Float(b)) => a == b,
        (Int(a), Float(b)) | (Float(b), Int(a)) => (*a as f64) == *b,
        (Str(a), Str(b)) => a == b,
        (Decimal(a), Decimal(b)) => a == b,
        (DateTime(a), DateTime(b)) => a == b,
        (Date(a), Date(b)) => a == b,
        (Time(a), Time(b)) => a == b,
        (List(a), List(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_eq(x, y, visited)),
        (Set(a), Set(b)) => {
            a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| values_eq(x, y, visited)))
        }
        (Map(a), Map(b)) => fields_eq(a, b, visited),
        (Object(a), Object(b)) => objects_eq(a, b, visited),
        _ => false,
    }
}

// Key order is not significant, as for `IndexMap` equality.
fn fields_eq(left: &Fields, right: &Fields, visited: &mut Visited) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).is_some_and(|other| values_eq(value, other, visited)))
}

fn objects_eq(left: &ObjectRef, right: &ObjectRef, visited: &mut Visited) -> bool {
    if left.ptr_eq(right) {
        return true;
    }
    let pair = (left.identity(), right.identity());
    if visited.contains(&pair) {
        return true;
    }
    visited.push(pair);
    let equal = {
        let (a, b) = (left.borrow(), right.borrow());
        a.class == b.class && a.module == b.module && fields_eq(&a.fields, &b.fields, visited)
    };
    visited.pop();
    equal
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", iso_datetime(dt)),
            Value::Date(d) => write!(f, "{}", iso_date(d)),
            Value::Time(t) => write!(f, "{}", iso_time(t)),
            Value::List(items) => write_items(f, "[", items, "]"),
            Value::Set(items) => write_items(f, "{", items, "}"),
            Value::Map(map) => write_fields(f, map),
            Value::Object(object) => write!(f, "{:?}", object),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

/// Render a field map as `{"key": value, ...}`
pub(crate) fn write_fields(f: &mut fmt::Formatter<'_>, map: &Fields) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{:?}: {}", key, value)?;
    }
    write!(f, "}}")
}

/// ISO-8601 rendering of a date-time (microseconds only when non-zero)
pub fn iso_datetime(value: &NaiveDateTime) -> String {
    if value.nanosecond() == 0 {
        value.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

pub fn iso_date(value: &NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn iso_time(value: &NaiveTime) -> String {
    if value.nanosecond() == 0 {
        value.format("%H:%M:%S").to_string()
    } else {
        value.format("%H:%M:%S%.6f").to_string()
    }
}

/// Attributes of a custom object
#[derive(Debug, Clone)]
pub struct Object {
    pub class: String,
    pub module: String,
    pub fields: Fields,
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.module == other.module
            && fields_eq(&self.fields, &other.fields, &mut Vec::new())
    }
}

/// Shared handle to a custom object.
///
/// Cloning the handle shares the object. Two handles are equal when they
/// point at the same object or at objects with equal type and attributes.
/// Comparing objects that contain themselves terminates.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    pub fn new(class: impl Into<String>, module: impl Into<String>, fields: Fields) -> Self {
        Self(Rc::new(RefCell::new(Object {
            class: class.into(),
            module: module.into(),
            fields,
        })))
    }

    pub fn class(&self) -> String {
        self.0.borrow().class.clone()
    }

    pub fn module(&self) -> String {
        self.0.borrow().module.clone()
    }

    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    /// Read one attribute
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().fields.get(name).cloned()
    }

    /// Set one attribute, returning the previous value
    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.borrow_mut().fields.insert(name.into(), value.into())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address-based identity, stable while the object is alive
    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        objects_eq(self, other, &mut Vec::new())
    }
}

// Attribute values are left out so that cyclic objects can be printed.
impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let object = self.0.borrow();
        let names: Vec<&str> = object.fields.keys().map(String::as_str).collect();
        write!(f, "{}.{}{:?}", object.module, object.class, names)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Fields> for Value {
    fn from(map: Fields) -> Self {
        Value::Map(map)
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
