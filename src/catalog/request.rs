//! Per-call request parameters.

use std::collections::BTreeMap;
use std::fmt;

/// Catalog operations used by the search session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ItemSearch,
    ItemLookup,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ItemSearch => "ItemSearch",
            Operation::ItemLookup => "ItemLookup",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for a single catalog request.
///
/// A parameter set is assembled fresh for every call and never mutated once
/// handed to a transport, so nothing from a search leaks into the following
/// lookup or into the next search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    params: BTreeMap<String, String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Music search by artist and album title
    pub fn item_search(artist: &str, album: &str) -> Self {
        Self::new()
            .with("Operation", Operation::ItemSearch.as_str())
            .with("SearchIndex", "Music")
            .with("Title", album)
            .with("Artist", artist)
    }

    /// Image lookup for one catalog identifier
    pub fn item_lookup(asin: &str) -> Self {
        Self::new()
            .with("Operation", Operation::ItemLookup.as_str())
            .with("IdType", "ASIN")
            .with("ResponseGroup", "Images")
            .with("ItemId", asin)
    }

    /// Return a copy with one more parameter set
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// The requested operation, if it is one the session issues
    pub fn operation(&self) -> Option<Operation> {
        match self.get("Operation")? {
            "ItemSearch" => Some(Operation::ItemSearch),
            "ItemLookup" => Some(Operation::ItemLookup),
            _ => None,
        }
    }

    /// Parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
