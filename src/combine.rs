//! Combined query builder.
//!
//! Collapses a document's relations into one estimate query per distinct
//! `TemplateId`. The number of backend calls equals the number of distinct
//! templates in the scope, not the number of relations.
//!
//! Templates are compared by handle only. Two different templates that
//! happen to produce equal `QueryObject`s stay separate.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::model::{Document, QueryObject};
use crate::registry::{Registry, RelationName, TemplateId};

/// Comma-joined relation names sharing one template, in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinedKey(String);

impl CombinedKey {
    pub fn from_relations<'a>(relations: impl IntoIterator<Item = &'a str>) -> Self {
        let joined: Vec<&str> = relations.into_iter().collect();
        CombinedKey(joined.join(","))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into relation names.
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.0.split(',').filter(|r| !r.is_empty())
    }
}

impl std::fmt::Display for CombinedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CombinedKey {
    fn from(s: &str) -> Self {
        CombinedKey(s.to_string())
    }
}

/// One estimate request standing in for every relation in `key`.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedQuery {
    pub key: CombinedKey,
    pub template: TemplateId,
    pub query: QueryObject,
}

/// Build the combined query set for a document.
///
/// Empty when the document's type has no scope or the scope has no
/// relations. Each distinct template is evaluated exactly once.
pub fn build_combined_queries(registry: &Registry, doc: &Document) -> Vec<CombinedQuery> {
    let Some(scope) = doc.scope() else {
        tracing::trace!(record_type = %doc.record_type, "type has no scope, no relations");
        return Vec::new();
    };

    // template → relations, in first-appearance order
    let mut buckets: Vec<(TemplateId, SmallVec<[RelationName; 4]>)> = Vec::new();
    let mut index: HashMap<TemplateId, usize> = HashMap::new();
    for (relation, template) in registry.relations_for(scope) {
        match index.get(template) {
            Some(&i) => buckets[i].1.push(*relation),
            None => {
                index.insert(*template, buckets.len());
                buckets.push((*template, SmallVec::from_elem(*relation, 1)));
            }
        }
    }

    let mut combined = Vec::with_capacity(buckets.len());
    for (template, relations) in buckets {
        let Some(query) = registry.instantiate(template, &doc.id) else {
            // Unreachable for a registry that passed its self-check.
            tracing::warn!(%template, "template missing from registry");
            continue;
        };
        combined.push(CombinedQuery {
            key: CombinedKey::from_relations(relations.iter().copied()),
            template,
            query,
        });
    }

    tracing::debug!(
        id = %doc.id,
        %scope,
        relations = registry.relations_for(scope).len(),
        queries = combined.len(),
        "built combined queries"
    );
    combined
}
