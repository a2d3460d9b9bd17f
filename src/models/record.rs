//! Loosely-typed catalog records.
//!
//! The catalog reports the same attribute in different shapes depending on the
//! item: a plain string, a repeated element, or an element carrying XML
//! attributes alongside its text. [`AttributeValue`] captures all three.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key under which an element's own text is stored when it also has attributes
pub const CONTENT_KEY: &str = "__content__";

/// One attribute value as returned by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(String),
    List(Vec<AttributeValue>),
    Object(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        AttributeValue::Scalar(value.into())
    }

    /// Build an object from key/value pairs
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AttributeValue)>,
    {
        AttributeValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Textual payload: a scalar's text, or the `__content__` of an object.
    /// Lists have no payload of their own.
    pub fn text(&self) -> Option<&str> {
        match self {
            AttributeValue::Scalar(text) => Some(text.as_str()),
            AttributeValue::Object(map) => match map.get(CONTENT_KEY) {
                Some(AttributeValue::Scalar(text)) => Some(text.as_str()),
                _ => None,
            },
            AttributeValue::List(_) => None,
        }
    }

    /// Payload of the value, or of its first element when it is a list
    pub fn first_text(&self) -> Option<&str> {
        match self {
            AttributeValue::List(values) => values.first().and_then(AttributeValue::text),
            other => other.text(),
        }
    }
}

/// Attributes of one candidate item, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord(BTreeMap<String, AttributeValue>);

impl CatalogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder style)
    pub fn with(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, AttributeValue>> for CatalogRecord {
    fn from(map: BTreeMap<String, AttributeValue>) -> Self {
        Self(map)
    }
}

/// A candidate returned by an item search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Catalog identifier used for the image lookup
    pub asin: String,

    /// The item's `ItemAttributes`
    pub attributes: CatalogRecord,
}
