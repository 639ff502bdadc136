//! Entity scopes and the Linked Art type → scope classification table.

use serde::{Deserialize, Serialize};

/// Search scope an entity record belongs to.
///
/// Every related-resource relation is registered under exactly one scope,
/// and every query object targets exactly one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityScope {
    Agent,
    Concept,
    Event,
    Item,
    Place,
    Set,
    Work,
}

/// Declared record type → scope. Types missing here get no relation links.
const TYPE_SCOPES: &[(&str, EntityScope)] = &[
    ("Person", EntityScope::Agent),
    ("Group", EntityScope::Agent),
    ("Type", EntityScope::Concept),
    ("Language", EntityScope::Concept),
    ("Material", EntityScope::Concept),
    ("Currency", EntityScope::Concept),
    ("MeasurementUnit", EntityScope::Concept),
    ("Activity", EntityScope::Event),
    ("Event", EntityScope::Event),
    ("Period", EntityScope::Event),
    ("HumanMadeObject", EntityScope::Item),
    ("DigitalObject", EntityScope::Item),
    ("Place", EntityScope::Place),
    ("Set", EntityScope::Set),
    ("LinguisticObject", EntityScope::Work),
    ("VisualItem", EntityScope::Work),
];

impl EntityScope {
    pub const ALL: [EntityScope; 7] = [
        EntityScope::Agent,
        EntityScope::Concept,
        EntityScope::Event,
        EntityScope::Item,
        EntityScope::Place,
        EntityScope::Set,
        EntityScope::Work,
    ];

    /// Classify a declared record type. `None` means "no related links".
    pub fn classify(record_type: &str) -> Option<Self> {
        TYPE_SCOPES
            .iter()
            .find(|(ty, _)| *ty == record_type)
            .map(|(_, scope)| *scope)
    }

    /// Lowercase name used in query objects and search URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityScope::Agent => "agent",
            EntityScope::Concept => "concept",
            EntityScope::Event => "event",
            EntityScope::Item => "item",
            EntityScope::Place => "place",
            EntityScope::Set => "set",
            EntityScope::Work => "work",
        }
    }
}

impl std::fmt::Display for EntityScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
