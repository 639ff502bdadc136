//! HAL link types.
//!
//! A `LinkCollection` serializes to the `_links` object of a HAL record:
//!
//! ```text
//! {
//!   "curies": [{"name": "lux", "href": ".../api/rels/{rel}", "templated": true}],
//!   "self":   {"href": "<document id>"},
//!   "lux:itemArchive": {"href": ".../api/search/set?q=...", "_estimate": 1}
//! }
//! ```

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A single hypermedia reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalLink {
    pub href: String,
    /// Present (always `1`) on relation links that passed the estimate.
    #[serde(rename = "_estimate", skip_serializing_if = "Option::is_none", default)]
    pub estimate: Option<u8>,
}

impl HalLink {
    /// Plain link, no estimate marker (used for `self`).
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into(), estimate: None }
    }

    /// Relation link backed by a positive estimate.
    pub fn estimated(href: impl Into<String>) -> Self {
        Self { href: href.into(), estimate: Some(1) }
    }
}

/// Compact URI prefix descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curie {
    pub name: String,
    pub href: String,
    pub templated: bool,
}

/// Finished link set for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCollection {
    pub curies: Vec<Curie>,
    pub self_link: HalLink,
    /// Relation name → link. Only relations with a truthy estimate appear.
    pub relations: BTreeMap<String, HalLink>,
}

impl LinkCollection {
    pub fn new(curies: Vec<Curie>, self_link: HalLink) -> Self {
        Self { curies, self_link, relations: BTreeMap::new() }
    }

    pub fn get(&self, relation: &str) -> Option<&HalLink> {
        self.relations.get(relation)
    }

    pub fn contains(&self, relation: &str) -> bool {
        self.relations.contains_key(relation)
    }

    /// Number of relation links (excludes `curies` and `self`).
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// All link names in output order: `curies`, `self`, then relations.
    pub fn names(&self) -> Vec<&str> {
        let mut names = vec!["curies", "self"];
        names.extend(self.relations.keys().map(String::as_str));
        names
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for LinkCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.relations.len() + 2))?;
        map.serialize_entry("curies", &self.curies)?;
        map.serialize_entry("self", &self.self_link)?;
        for (name, link) in &self.relations {
            map.serialize_entry(name, link)?;
        }
        map.end()
    }
}
