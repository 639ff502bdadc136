//! Backend-agnostic search criteria.
//!
//! A `QueryObject` is what a query template produces for a subject id. It is
//! criteria, not backend syntax: the backend receives its JSON form and
//! decides how to evaluate it.
//!
//! ```text
//! QueryObject { scope: work, criteria: Field("aboutAgent", Id("X")) }
//!   → {"_scope":"work","aboutAgent":{"id":"X"}}
//! ```

use serde::{Serialize, Serializer};
use serde_json::{Map, Value as Json};

use super::EntityScope;
use crate::Result;

/// Criteria tree. Leaves reference the subject id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// All branches must match.
    And(Vec<Query>),
    /// Any branch may match.
    Or(Vec<Query>),
    /// Relational hop: the named field must match the nested criteria.
    Field { name: &'static str, value: Box<Query> },
    /// Leaf predicate on an entity identifier.
    Id(String),
}

impl Query {
    pub fn id(id: impl Into<String>) -> Self {
        Query::Id(id.into())
    }

    pub fn field(name: &'static str, value: Query) -> Self {
        Query::Field { name, value: Box::new(value) }
    }

    pub fn and(branches: impl IntoIterator<Item = Query>) -> Self {
        Query::And(branches.into_iter().collect())
    }

    pub fn or(branches: impl IntoIterator<Item = Query>) -> Self {
        Query::Or(branches.into_iter().collect())
    }

    /// JSON form of this criteria node.
    pub fn to_json(&self) -> Json {
        let mut obj = Map::new();
        self.write_into(&mut obj);
        Json::Object(obj)
    }

    fn write_into(&self, obj: &mut Map<String, Json>) {
        match self {
            Query::And(branches) => {
                obj.insert("AND".into(), Json::Array(branches.iter().map(Query::to_json).collect()));
            }
            Query::Or(branches) => {
                obj.insert("OR".into(), Json::Array(branches.iter().map(Query::to_json).collect()));
            }
            Query::Field { name, value } => {
                obj.insert((*name).into(), value.to_json());
            }
            Query::Id(id) => {
                obj.insert("id".into(), Json::String(id.clone()));
            }
        }
    }
}

/// A complete query: target scope plus criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryObject {
    pub scope: EntityScope,
    pub criteria: Query,
}

impl QueryObject {
    pub fn new(scope: EntityScope, criteria: Query) -> Self {
        Self { scope, criteria }
    }

    /// `{"_scope": "<scope>", ...criteria}`
    pub fn to_json(&self) -> Json {
        let mut obj = Map::new();
        obj.insert("_scope".into(), Json::String(self.scope.as_str().into()));
        self.criteria.write_into(&mut obj);
        Json::Object(obj)
    }

    /// Serialized form handed to the estimation backend and embedded in hrefs.
    pub fn serialize_compact(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json())?)
    }
}

impl Serialize for QueryObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl std::fmt::Display for QueryObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
