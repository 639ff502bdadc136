//! # Query Template Registry
//!
//! Process-wide, read-only table of related-resource relations.
//!
//! Two parallel maps:
//!
//! | Map | Key | Value | Used by |
//! |-----|-----|-------|---------|
//! | estimates | `(EntityScope, RelationName)` | `TemplateId` | combined query builder |
//! | hrefs | `RelationName` | `HrefBuilder` | link assembler |
//!
//! A relation's estimator and its href may use different templates. The
//! estimator can be stricter or cheaper than the user-facing search the
//! href points at.
//!
//! Templates are identified by `TemplateId`, not by closure identity or by
//! the structure of the query they produce. Two relations are deduplicated
//! only when they name the same `TemplateId`.
//!
//! Construction goes through `RegistryBuilder::build()`, which runs a
//! self-check and refuses inconsistent tables. A registry that exists is
//! consistent.

pub mod lux;

use std::collections::{HashMap, HashSet};

use url::form_urlencoded;

use crate::model::{EntityScope, QueryObject};
use crate::{Error, Result};

/// External vocabulary key of a relation, e.g. `lux:agentRelatedAgents`.
pub type RelationName = &'static str;

/// A query template: subject id → criteria.
pub type TemplateFn = fn(&str) -> QueryObject;

/// Typed handle for a query template. Equality of handles is the
/// deduplication rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub &'static str);

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// How a relation's link href is built from the subject id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrefBuilder {
    /// Search URL carrying the serialized query of `template`.
    Search { template: TemplateId },
    /// Related-list URL: `name` list in `scope`, keyed by the subject URI.
    RelatedList { scope: EntityScope, name: &'static str },
}

impl HrefBuilder {
    pub const fn search(template: TemplateId) -> Self {
        HrefBuilder::Search { template }
    }

    pub const fn related_list(scope: EntityScope, name: &'static str) -> Self {
        HrefBuilder::RelatedList { scope, name }
    }

    /// Build the href for `subject_id` under `search_base`.
    pub fn build(&self, registry: &Registry, subject_id: &str, search_base: &str) -> Result<String> {
        let base = search_base.trim_end_matches('/');
        match self {
            HrefBuilder::Search { template } => {
                let query = registry
                    .instantiate(*template, subject_id)
                    .ok_or_else(|| Error::UnknownHrefTemplate(template.to_string()))?;
                let q = encode(&query.serialize_compact()?);
                Ok(format!("{base}/api/search/{}?q={q}", query.scope))
            }
            HrefBuilder::RelatedList { scope, name } => {
                let uri = encode(subject_id);
                Ok(format!("{base}/api/related-list/{scope}?name={name}&uri={uri}"))
            }
        }
    }
}

/// Relation names travel joined by `,` inside a combined key.
fn valid_relation_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(',')
}

fn encode(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

// ============================================================================
// Registry
// ============================================================================

/// Immutable relation registry. Build with `Registry::builder()` or use
/// `Registry::builtin()`.
#[derive(Debug, Clone)]
pub struct Registry {
    templates: HashMap<TemplateId, TemplateFn>,
    estimates: HashMap<EntityScope, Vec<(RelationName, TemplateId)>>,
    hrefs: HashMap<RelationName, HrefBuilder>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The Linked Art relation table. Fails only if the table itself is
    /// inconsistent, which is a build defect: call this at startup.
    pub fn builtin() -> Result<Self> {
        lux::builder().build()
    }

    /// `(RelationName, TemplateId)` pairs for a scope, in declaration order.
    /// Unknown or empty scopes yield an empty slice.
    pub fn relations_for(&self, scope: EntityScope) -> &[(RelationName, TemplateId)] {
        self.estimates.get(&scope).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn href_builder(&self, relation: &str) -> Option<&HrefBuilder> {
        self.hrefs.get(relation)
    }

    pub fn template(&self, id: TemplateId) -> Option<TemplateFn> {
        self.templates.get(&id).copied()
    }

    /// Evaluate a template for a subject id.
    pub fn instantiate(&self, id: TemplateId, subject_id: &str) -> Option<QueryObject> {
        self.template(id).map(|f| f(subject_id))
    }

    /// Scopes that have at least one relation.
    pub fn scopes(&self) -> Vec<EntityScope> {
        let mut scopes: Vec<_> = self
            .estimates
            .iter()
            .filter(|(_, rels)| !rels.is_empty())
            .map(|(scope, _)| *scope)
            .collect();
        scopes.sort();
        scopes
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn relation_count(&self) -> usize {
        self.estimates.values().map(Vec::len).sum()
    }

    /// Number of distinct estimation templates a scope uses.
    pub fn distinct_templates_for(&self, scope: EntityScope) -> usize {
        self.relations_for(scope)
            .iter()
            .map(|(_, t)| *t)
            .collect::<HashSet<_>>()
            .len()
    }
}

// ============================================================================
// Builder + self-check
// ============================================================================

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    templates: Vec<(TemplateId, TemplateFn)>,
    estimates: Vec<(EntityScope, RelationName, TemplateId)>,
    hrefs: Vec<(RelationName, HrefBuilder)>,
}

impl RegistryBuilder {
    pub fn template(mut self, id: TemplateId, f: TemplateFn) -> Self {
        self.templates.push((id, f));
        self
    }

    pub fn relation(mut self, scope: EntityScope, name: RelationName, template: TemplateId) -> Self {
        self.estimates.push((scope, name, template));
        self
    }

    pub fn href(mut self, name: RelationName, builder: HrefBuilder) -> Self {
        self.hrefs.push((name, builder));
        self
    }

    /// Run the self-check and freeze the registry.
    pub fn build(self) -> Result<Registry> {
        let mut templates = HashMap::with_capacity(self.templates.len());
        for (id, f) in self.templates {
            if templates.insert(id, f).is_some() {
                return Err(Error::DuplicateTemplate(id.to_string()));
            }
        }

        let mut hrefs = HashMap::with_capacity(self.hrefs.len());
        for (name, builder) in self.hrefs {
            if hrefs.insert(name, builder).is_some() {
                return Err(Error::DuplicateHrefBuilder(name.to_string()));
            }
            if let HrefBuilder::Search { template } = builder {
                if !templates.contains_key(&template) {
                    return Err(Error::UnknownTemplate {
                        relation: name.to_string(),
                        template: template.to_string(),
                    });
                }
            }
        }

        let mut estimates: HashMap<EntityScope, Vec<(RelationName, TemplateId)>> = HashMap::new();
        let mut estimated_names = HashSet::new();
        for (scope, name, template) in self.estimates {
            if !valid_relation_name(name) {
                return Err(Error::InvalidRelationName(name.to_string()));
            }
            if !templates.contains_key(&template) {
                return Err(Error::UnknownTemplate {
                    relation: name.to_string(),
                    template: template.to_string(),
                });
            }
            if !hrefs.contains_key(name) {
                return Err(Error::MissingHrefBuilder { scope, relation: name.to_string() });
            }
            let rels = estimates.entry(scope).or_default();
            if rels.iter().any(|(existing, _)| *existing == name) {
                return Err(Error::DuplicateRelation { scope, relation: name.to_string() });
            }
            rels.push((name, template));
            estimated_names.insert(name);
        }

        if let Some(orphan) = hrefs.keys().find(|name| !estimated_names.contains(*name)) {
            return Err(Error::OrphanHrefBuilder(orphan.to_string()));
        }

        tracing::debug!(
            templates = templates.len(),
            relations = estimated_names.len(),
            "relation registry passed self-check"
        );

        Ok(Registry { templates, estimates, hrefs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Query;

    const ABOUT: TemplateId = TemplateId("about");
    const MADE: TemplateId = TemplateId("made");

    fn about(id: &str) -> QueryObject {
        QueryObject::new(EntityScope::Work, Query::field("aboutItem", Query::id(id)))
    }

    fn made(id: &str) -> QueryObject {
        QueryObject::new(EntityScope::Agent, Query::field("producedItem", Query::id(id)))
    }

    #[test]
    fn test_build_and_lookup() {
        let registry = Registry::builder()
            .template(ABOUT, about)
            .template(MADE, made)
            .relation(EntityScope::Item, "t:about", ABOUT)
            .relation(EntityScope::Item, "t:makers", MADE)
            .href("t:about", HrefBuilder::search(ABOUT))
            .href("t:makers", HrefBuilder::related_list(EntityScope::Agent, "relatedToItem"))
            .build()
            .unwrap();

        assert_eq!(
            registry.relations_for(EntityScope::Item),
            &[("t:about", ABOUT), ("t:makers", MADE)]
        );
        assert!(registry.relations_for(EntityScope::Place).is_empty());
        assert_eq!(registry.scopes(), vec![EntityScope::Item]);
        assert_eq!(registry.instantiate(ABOUT, "X"), Some(about("X")));
    }

    #[test]
    fn test_missing_href_fails() {
        let err = Registry::builder()
            .template(ABOUT, about)
            .relation(EntityScope::Item, "t:about", ABOUT)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingHrefBuilder { .. }));
    }

    #[test]
    fn test_orphan_href_fails() {
        let err = Registry::builder()
            .template(ABOUT, about)
            .relation(EntityScope::Item, "t:about", ABOUT)
            .href("t:about", HrefBuilder::search(ABOUT))
            .href("t:ghost", HrefBuilder::search(ABOUT))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::OrphanHrefBuilder(name) if name == "t:ghost"));
    }

    #[test]
    fn test_unknown_template_fails() {
        let err = Registry::builder()
            .template(ABOUT, about)
            .relation(EntityScope::Item, "t:makers", MADE)
            .href("t:makers", HrefBuilder::search(ABOUT))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTemplate { .. }));
    }

    #[test]
    fn test_duplicate_template_fails() {
        let err = Registry::builder()
            .template(ABOUT, about)
            .template(ABOUT, made)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateTemplate(_)));
    }

    #[test]
    fn test_duplicate_relation_in_scope_fails() {
        let err = Registry::builder()
            .template(ABOUT, about)
            .relation(EntityScope::Item, "t:about", ABOUT)
            .relation(EntityScope::Item, "t:about", ABOUT)
            .href("t:about", HrefBuilder::search(ABOUT))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRelation { .. }));
    }

    #[test]
    fn test_relation_name_with_separator_fails() {
        let err = Registry::builder()
            .template(ABOUT, about)
            .relation(EntityScope::Item, "t:x,about", ABOUT)
            .href("t:x,about", HrefBuilder::search(ABOUT))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRelationName(name) if name == "t:x,about"));
    }

    #[test]
    fn test_empty_relation_name_fails() {
        let err = Registry::builder()
            .template(ABOUT, about)
            .relation(EntityScope::Item, "", ABOUT)
            .href("", HrefBuilder::search(ABOUT))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRelationName(name) if name.is_empty()));
    }

    #[test]
    fn test_search_href_with_unregistered_template() {
        let registry = Registry::builder().build().unwrap();
        let err = HrefBuilder::search(MADE)
            .build(&registry, "X", "https://lux.example")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownHrefTemplate(ref t) if t == "made"));
        assert_eq!(err.to_string(), "Href template 'made' is not registered");
    }

    #[test]
    fn test_search_href_encodes_query() {
        let registry = Registry::builder()
            .template(ABOUT, about)
            .relation(EntityScope::Item, "t:about", ABOUT)
            .href("t:about", HrefBuilder::search(ABOUT))
            .build()
            .unwrap();
        let href = HrefBuilder::search(ABOUT)
            .build(&registry, "https://x.org/item/1", "https://lux.example/")
            .unwrap();
        assert!(href.starts_with("https://lux.example/api/search/work?q="));
        assert!(!href.contains('{'));
        assert!(href.contains("aboutItem"));
    }

    #[test]
    fn test_related_list_href() {
        let registry = Registry::builder().build().unwrap();
        let href = HrefBuilder::related_list(EntityScope::Agent, "relatedToItem")
            .build(&registry, "https://x.org/item/1", "https://lux.example")
            .unwrap();
        assert_eq!(
            href,
            "https://lux.example/api/related-list/agent?name=relatedToItem&uri=https%3A%2F%2Fx.org%2Fitem%2F1"
        );
    }
}
