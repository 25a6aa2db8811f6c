//! Flattening of markup elements into nested values.
//!
//! Service responses often arrive as XML-like trees. Storing them as
//! plain maps keeps traces independent of any markup parser:
//! - attributes become map entries
//! - children are grouped by tag (a list when a tag repeats)
//! - non-blank text is kept under `"text"`
//! - a bare leaf collapses to its stripped text

use crate::model::value::{Fields, Value};
use indexmap::IndexMap;

/// A markup element with attributes, optional text and child elements
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: Fields,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Convert this element into a plain value
    ///
    /// **Public** - used to store structured responses in event outputs
    ///
    /// # Returns
    /// A string for leaves without attributes, otherwise a map
    pub fn flatten(&self) -> Value {
        if self.children.is_empty() && self.attributes.is_empty() {
            return Value::from(self.text.as_deref().map_or("", str::trim));
        }

        let mut result = self.attributes.clone();

        let mut groups: IndexMap<&str, Vec<Value>> = IndexMap::new();
        for child in &self.children {
            groups.entry(child.tag.as_str()).or_default().push(child.flatten());
        }
        for (tag, mut values) in groups {
            let value = if values.len() == 1 {
                values.swap_remove(0)
            } else {
                Value::List(values)
            };
            result.insert(tag.to_string(), value);
        }

        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            result.insert("text".to_string(), Value::from(text));
        }
        Value::Map(result)
    }
}
