//! Built-in Linked Art relation table.
//!
//! Declarative data only: template functions, then the per-scope estimate
//! table, then the href table. `Registry::builtin()` feeds all three through
//! the self-check.
//!
//! Related-list relations of a scope (`*RelatedAgents`, `*RelatedPlaces`,
//! `*RelatedConcepts`) share one estimate template per scope, so each scope
//! pays for a single related-list estimate no matter how many lists it
//! offers.

use crate::model::{EntityScope, Query, QueryObject};
use super::{HrefBuilder, RegistryBuilder, RelationName, TemplateFn, TemplateId};

use EntityScope::{Agent, Concept, Event, Item, Place, Set, Work};

/// Prefix of every built-in relation name.
pub const CURIE_NAME: &str = "lux";

fn hop(scope: EntityScope, field: &'static str, id: &str) -> QueryObject {
    QueryObject::new(scope, Query::field(field, Query::id(id)))
}

fn any_of(scope: EntityScope, fields: &[&'static str], id: &str) -> QueryObject {
    QueryObject::new(
        scope,
        Query::or(fields.iter().map(|f| Query::field(*f, Query::id(id)))),
    )
}

// ============================================================================
// Template handles
// ============================================================================

pub mod templates {
    use super::TemplateId;

    pub const AGENT_WORK_ABOUT: TemplateId = TemplateId("agentWorkAbout");
    pub const AGENT_WORK_CREATED: TemplateId = TemplateId("agentWorkCreated");
    pub const AGENT_WORK_PUBLISHED: TemplateId = TemplateId("agentWorkPublished");
    pub const AGENT_ITEM_MADE: TemplateId = TemplateId("agentItemMade");
    pub const AGENT_ITEM_ENCOUNTERED: TemplateId = TemplateId("agentItemEncountered");
    pub const AGENT_EVENTS_CARRIED_OUT: TemplateId = TemplateId("agentEventsCarriedOut");
    pub const AGENT_EVENTS_USING_PRODUCED: TemplateId = TemplateId("agentEventsUsingProduced");
    pub const AGENT_MEMBERS: TemplateId = TemplateId("agentMembers");
    pub const AGENT_RELATED: TemplateId = TemplateId("agentRelated");

    pub const CONCEPT_ITEM_TYPES: TemplateId = TemplateId("conceptItemTypes");
    pub const CONCEPT_ITEM_MATERIALS: TemplateId = TemplateId("conceptItemMaterials");
    pub const CONCEPT_WORK_TYPES: TemplateId = TemplateId("conceptWorkTypes");
    pub const CONCEPT_WORK_ABOUT: TemplateId = TemplateId("conceptWorkAbout");
    pub const CONCEPT_CHILDREN: TemplateId = TemplateId("conceptChildren");
    pub const CONCEPT_RELATED: TemplateId = TemplateId("conceptRelated");

    pub const EVENT_INCLUDED_ITEMS: TemplateId = TemplateId("eventIncludedItems");
    pub const EVENT_WORKS_ABOUT: TemplateId = TemplateId("eventWorksAbout");
    pub const EVENT_WORKS_CREATED: TemplateId = TemplateId("eventWorksCreated");
    pub const EVENT_SUB_EVENTS: TemplateId = TemplateId("eventSubEvents");
    pub const EVENT_RELATED: TemplateId = TemplateId("eventRelated");

    pub const ITEM_ARCHIVE: TemplateId = TemplateId("itemArchive");
    pub const ITEM_EVENTS: TemplateId = TemplateId("itemEvents");
    pub const ITEM_WORKS_ABOUT: TemplateId = TemplateId("itemWorksAbout");
    pub const ITEM_RELATED: TemplateId = TemplateId("itemRelated");

    pub const PLACE_PARTS: TemplateId = TemplateId("placeParts");
    pub const PLACE_ITEMS_PRODUCED: TemplateId = TemplateId("placeItemsProduced");
    pub const PLACE_ITEMS_ENCOUNTERED: TemplateId = TemplateId("placeItemsEncountered");
    pub const PLACE_WORKS_ABOUT: TemplateId = TemplateId("placeWorksAbout");
    pub const PLACE_WORKS_CREATED: TemplateId = TemplateId("placeWorksCreated");
    pub const PLACE_WORKS_PUBLISHED: TemplateId = TemplateId("placeWorksPublished");
    pub const PLACE_AGENTS_BORN: TemplateId = TemplateId("placeAgentsBorn");
    pub const PLACE_AGENTS_ACTIVE: TemplateId = TemplateId("placeAgentsActive");
    pub const PLACE_EVENTS: TemplateId = TemplateId("placeEvents");
    pub const PLACE_RELATED: TemplateId = TemplateId("placeRelated");

    pub const SET_ITEMS_DIRECT: TemplateId = TemplateId("setItemsDirect");
    pub const SET_ITEMS_NESTED: TemplateId = TemplateId("setItemsNested");
    pub const SET_WORKS: TemplateId = TemplateId("setWorks");
    pub const SET_SUBSETS: TemplateId = TemplateId("setSubsets");

    pub const WORK_CARRIED_BY: TemplateId = TemplateId("workCarriedBy");
    pub const WORK_SHOWN_BY: TemplateId = TemplateId("workShownBy");
    pub const WORK_WORKS_ABOUT: TemplateId = TemplateId("workWorksAbout");
    pub const WORK_PARTS: TemplateId = TemplateId("workParts");
    pub const WORK_RELATED: TemplateId = TemplateId("workRelated");
}

use templates::*;

// ============================================================================
// Template functions
// ============================================================================

fn agent_work_about(id: &str) -> QueryObject { hop(Work, "aboutAgent", id) }
fn agent_work_created(id: &str) -> QueryObject { hop(Work, "createdBy", id) }
fn agent_work_published(id: &str) -> QueryObject { hop(Work, "publishedBy", id) }
fn agent_item_made(id: &str) -> QueryObject { hop(Item, "producedBy", id) }
fn agent_item_encountered(id: &str) -> QueryObject { hop(Item, "encounteredBy", id) }
fn agent_events_carried_out(id: &str) -> QueryObject { hop(Event, "carriedOutBy", id) }
fn agent_events_using_produced(id: &str) -> QueryObject {
    QueryObject::new(Event, Query::field("used", Query::field("producedBy", Query::id(id))))
}
fn agent_members(id: &str) -> QueryObject { hop(Agent, "memberOf", id) }
fn agent_related(id: &str) -> QueryObject {
    any_of(Work, &["createdBy", "publishedBy", "aboutAgent"], id)
}

fn concept_item_types(id: &str) -> QueryObject { hop(Item, "classification", id) }
fn concept_item_materials(id: &str) -> QueryObject { hop(Item, "material", id) }
fn concept_work_types(id: &str) -> QueryObject { hop(Work, "classification", id) }
fn concept_work_about(id: &str) -> QueryObject { hop(Work, "aboutConcept", id) }
fn concept_children(id: &str) -> QueryObject { hop(Concept, "broader", id) }
fn concept_related(id: &str) -> QueryObject {
    any_of(Work, &["aboutConcept", "classification", "language"], id)
}

fn event_included_items(id: &str) -> QueryObject { hop(Item, "usedForEvent", id) }
fn event_works_about(id: &str) -> QueryObject { hop(Work, "aboutEvent", id) }
fn event_works_created(id: &str) -> QueryObject { hop(Work, "createdDuring", id) }
fn event_sub_events(id: &str) -> QueryObject { hop(Event, "partOf", id) }
fn event_related(id: &str) -> QueryObject {
    any_of(Item, &["usedForEvent", "encounteredDuring"], id)
}

fn item_archive(id: &str) -> QueryObject { hop(Set, "containingItem", id) }
fn item_events(id: &str) -> QueryObject { hop(Event, "used", id) }
fn item_works_about(id: &str) -> QueryObject { hop(Work, "aboutItem", id) }
fn item_related(id: &str) -> QueryObject {
    any_of(Agent, &["producedItem", "encounteredItem"], id)
}

fn place_parts(id: &str) -> QueryObject { hop(Place, "partOf", id) }
fn place_items_produced(id: &str) -> QueryObject { hop(Item, "producedAt", id) }
fn place_items_encountered(id: &str) -> QueryObject { hop(Item, "encounteredAt", id) }
fn place_works_about(id: &str) -> QueryObject { hop(Work, "aboutPlace", id) }
fn place_works_created(id: &str) -> QueryObject { hop(Work, "createdAt", id) }
fn place_works_published(id: &str) -> QueryObject { hop(Work, "publishedAt", id) }
fn place_agents_born(id: &str) -> QueryObject { hop(Agent, "startAt", id) }
fn place_agents_active(id: &str) -> QueryObject { hop(Agent, "activeAt", id) }
fn place_events(id: &str) -> QueryObject { hop(Event, "tookPlaceAt", id) }
fn place_related(id: &str) -> QueryObject {
    any_of(Item, &["producedAt", "encounteredAt"], id)
}

fn set_items_direct(id: &str) -> QueryObject { hop(Item, "memberOf", id) }
fn set_items_nested(id: &str) -> QueryObject {
    QueryObject::new(
        Item,
        Query::or([
            Query::field("memberOf", Query::id(id)),
            Query::field("memberOf", Query::field("memberOf", Query::id(id))),
        ]),
    )
}
fn set_works(id: &str) -> QueryObject { hop(Work, "memberOf", id) }
fn set_subsets(id: &str) -> QueryObject { hop(Set, "memberOf", id) }

fn work_carried_by(id: &str) -> QueryObject { hop(Item, "carries", id) }
fn work_shown_by(id: &str) -> QueryObject { hop(Item, "shows", id) }
fn work_works_about(id: &str) -> QueryObject { hop(Work, "aboutWork", id) }
fn work_parts(id: &str) -> QueryObject { hop(Work, "partOf", id) }
fn work_related(id: &str) -> QueryObject {
    any_of(Item, &["carries", "shows"], id)
}

const TEMPLATES: &[(TemplateId, TemplateFn)] = &[
    (AGENT_WORK_ABOUT, agent_work_about),
    (AGENT_WORK_CREATED, agent_work_created),
    (AGENT_WORK_PUBLISHED, agent_work_published),
    (AGENT_ITEM_MADE, agent_item_made),
    (AGENT_ITEM_ENCOUNTERED, agent_item_encountered),
    (AGENT_EVENTS_CARRIED_OUT, agent_events_carried_out),
    (AGENT_EVENTS_USING_PRODUCED, agent_events_using_produced),
    (AGENT_MEMBERS, agent_members),
    (AGENT_RELATED, agent_related),
    (CONCEPT_ITEM_TYPES, concept_item_types),
    (CONCEPT_ITEM_MATERIALS, concept_item_materials),
    (CONCEPT_WORK_TYPES, concept_work_types),
    (CONCEPT_WORK_ABOUT, concept_work_about),
    (CONCEPT_CHILDREN, concept_children),
    (CONCEPT_RELATED, concept_related),
    (EVENT_INCLUDED_ITEMS, event_included_items),
    (EVENT_WORKS_ABOUT, event_works_about),
    (EVENT_WORKS_CREATED, event_works_created),
    (EVENT_SUB_EVENTS, event_sub_events),
    (EVENT_RELATED, event_related),
    (ITEM_ARCHIVE, item_archive),
    (ITEM_EVENTS, item_events),
    (ITEM_WORKS_ABOUT, item_works_about),
    (ITEM_RELATED, item_related),
    (PLACE_PARTS, place_parts),
    (PLACE_ITEMS_PRODUCED, place_items_produced),
    (PLACE_ITEMS_ENCOUNTERED, place_items_encountered),
    (PLACE_WORKS_ABOUT, place_works_about),
    (PLACE_WORKS_CREATED, place_works_created),
    (PLACE_WORKS_PUBLISHED, place_works_published),
    (PLACE_AGENTS_BORN, place_agents_born),
    (PLACE_AGENTS_ACTIVE, place_agents_active),
    (PLACE_EVENTS, place_events),
    (PLACE_RELATED, place_related),
    (SET_ITEMS_DIRECT, set_items_direct),
    (SET_ITEMS_NESTED, set_items_nested),
    (SET_WORKS, set_works),
    (SET_SUBSETS, set_subsets),
    (WORK_CARRIED_BY, work_carried_by),
    (WORK_SHOWN_BY, work_shown_by),
    (WORK_WORKS_ABOUT, work_works_about),
    (WORK_PARTS, work_parts),
    (WORK_RELATED, work_related),
];

// ============================================================================
// Estimate table: scope → relation → template
// ============================================================================

const ESTIMATES: &[(EntityScope, &[(RelationName, TemplateId)])] = &[
    (Agent, &[
        ("lux:agentWorkAbout", AGENT_WORK_ABOUT),
        ("lux:agentWorkCreated", AGENT_WORK_CREATED),
        ("lux:agentWorkPublished", AGENT_WORK_PUBLISHED),
        ("lux:agentItemMadeBy", AGENT_ITEM_MADE),
        ("lux:agentItemEncounteredBy", AGENT_ITEM_ENCOUNTERED),
        ("lux:agentEventsCarriedOut", AGENT_EVENTS_CARRIED_OUT),
        ("lux:agentEventsUsingProducedObjects", AGENT_EVENTS_USING_PRODUCED),
        ("lux:agentAgentMemberOf", AGENT_MEMBERS),
        ("lux:agentRelatedAgents", AGENT_RELATED),
        ("lux:agentRelatedPlaces", AGENT_RELATED),
        ("lux:agentRelatedConcepts", AGENT_RELATED),
    ]),
    (Concept, &[
        ("lux:conceptItemTypes", CONCEPT_ITEM_TYPES),
        ("lux:conceptItemMaterials", CONCEPT_ITEM_MATERIALS),
        ("lux:conceptWorkTypes", CONCEPT_WORK_TYPES),
        ("lux:conceptWorkAbout", CONCEPT_WORK_ABOUT),
        ("lux:conceptChildren", CONCEPT_CHILDREN),
        ("lux:conceptRelatedConcepts", CONCEPT_RELATED),
        ("lux:conceptRelatedAgents", CONCEPT_RELATED),
        ("lux:conceptRelatedPlaces", CONCEPT_RELATED),
    ]),
    (Event, &[
        ("lux:eventIncludedItems", EVENT_INCLUDED_ITEMS),
        ("lux:eventWorksAbout", EVENT_WORKS_ABOUT),
        ("lux:eventCausedWorks", EVENT_WORKS_CREATED),
        ("lux:eventSubEvents", EVENT_SUB_EVENTS),
        ("lux:eventRelatedAgents", EVENT_RELATED),
        ("lux:eventRelatedPlaces", EVENT_RELATED),
        ("lux:eventRelatedConcepts", EVENT_RELATED),
    ]),
    (Item, &[
        ("lux:itemArchive", ITEM_ARCHIVE),
        ("lux:itemEvents", ITEM_EVENTS),
        ("lux:itemWorksAbout", ITEM_WORKS_ABOUT),
        ("lux:itemRelatedAgents", ITEM_RELATED),
        ("lux:itemRelatedPlaces", ITEM_RELATED),
    ]),
    (Place, &[
        ("lux:placeParts", PLACE_PARTS),
        ("lux:placeItemsProduced", PLACE_ITEMS_PRODUCED),
        ("lux:placeItemsEncountered", PLACE_ITEMS_ENCOUNTERED),
        ("lux:placeWorksAbout", PLACE_WORKS_ABOUT),
        ("lux:placeWorksCreated", PLACE_WORKS_CREATED),
        ("lux:placeWorksPublished", PLACE_WORKS_PUBLISHED),
        ("lux:placeAgentsBorn", PLACE_AGENTS_BORN),
        ("lux:placeAgentsActive", PLACE_AGENTS_ACTIVE),
        ("lux:placeEvents", PLACE_EVENTS),
        ("lux:placeRelatedAgents", PLACE_RELATED),
        ("lux:placeRelatedConcepts", PLACE_RELATED),
        ("lux:placeRelatedPlaces", PLACE_RELATED),
    ]),
    (Set, &[
        // Direct membership is cheaper to estimate; the link searches nested sets too.
        ("lux:setIncludedItems", SET_ITEMS_DIRECT),
        ("lux:setIncludedWorks", SET_WORKS),
        ("lux:setIncludedSets", SET_SUBSETS),
    ]),
    (Work, &[
        ("lux:workCarriedBy", WORK_CARRIED_BY),
        ("lux:workShownBy", WORK_SHOWN_BY),
        ("lux:workWorksAbout", WORK_WORKS_ABOUT),
        ("lux:workParts", WORK_PARTS),
        ("lux:workRelatedAgents", WORK_RELATED),
        ("lux:workRelatedConcepts", WORK_RELATED),
        ("lux:workRelatedPlaces", WORK_RELATED),
    ]),
];

// ============================================================================
// Href table: relation → href builder
// ============================================================================

const HREFS: &[(RelationName, HrefBuilder)] = &[
    ("lux:agentWorkAbout", HrefBuilder::search(AGENT_WORK_ABOUT)),
    ("lux:agentWorkCreated", HrefBuilder::search(AGENT_WORK_CREATED)),
    ("lux:agentWorkPublished", HrefBuilder::search(AGENT_WORK_PUBLISHED)),
    ("lux:agentItemMadeBy", HrefBuilder::search(AGENT_ITEM_MADE)),
    ("lux:agentItemEncounteredBy", HrefBuilder::search(AGENT_ITEM_ENCOUNTERED)),
    ("lux:agentEventsCarriedOut", HrefBuilder::search(AGENT_EVENTS_CARRIED_OUT)),
    ("lux:agentEventsUsingProducedObjects", HrefBuilder::search(AGENT_EVENTS_USING_PRODUCED)),
    ("lux:agentAgentMemberOf", HrefBuilder::search(AGENT_MEMBERS)),
    ("lux:agentRelatedAgents", HrefBuilder::related_list(Agent, "relatedToAgent")),
    ("lux:agentRelatedPlaces", HrefBuilder::related_list(Place, "relatedToAgent")),
    ("lux:agentRelatedConcepts", HrefBuilder::related_list(Concept, "relatedToAgent")),
    ("lux:conceptItemTypes", HrefBuilder::search(CONCEPT_ITEM_TYPES)),
    ("lux:conceptItemMaterials", HrefBuilder::search(CONCEPT_ITEM_MATERIALS)),
    ("lux:conceptWorkTypes", HrefBuilder::search(CONCEPT_WORK_TYPES)),
    ("lux:conceptWorkAbout", HrefBuilder::search(CONCEPT_WORK_ABOUT)),
    ("lux:conceptChildren", HrefBuilder::search(CONCEPT_CHILDREN)),
    ("lux:conceptRelatedConcepts", HrefBuilder::related_list(Concept, "relatedToConcept")),
    ("lux:conceptRelatedAgents", HrefBuilder::related_list(Agent, "relatedToConcept")),
    ("lux:conceptRelatedPlaces", HrefBuilder::related_list(Place, "relatedToConcept")),
    ("lux:eventIncludedItems", HrefBuilder::search(EVENT_INCLUDED_ITEMS)),
    ("lux:eventWorksAbout", HrefBuilder::search(EVENT_WORKS_ABOUT)),
    ("lux:eventCausedWorks", HrefBuilder::search(EVENT_WORKS_CREATED)),
    ("lux:eventSubEvents", HrefBuilder::search(EVENT_SUB_EVENTS)),
    ("lux:eventRelatedAgents", HrefBuilder::related_list(Agent, "relatedToEvent")),
    ("lux:eventRelatedPlaces", HrefBuilder::related_list(Place, "relatedToEvent")),
    ("lux:eventRelatedConcepts", HrefBuilder::related_list(Concept, "relatedToEvent")),
    ("lux:itemArchive", HrefBuilder::search(ITEM_ARCHIVE)),
    ("lux:itemEvents", HrefBuilder::search(ITEM_EVENTS)),
    ("lux:itemWorksAbout", HrefBuilder::search(ITEM_WORKS_ABOUT)),
    ("lux:itemRelatedAgents", HrefBuilder::related_list(Agent, "relatedToItem")),
    ("lux:itemRelatedPlaces", HrefBuilder::related_list(Place, "relatedToItem")),
    ("lux:placeParts", HrefBuilder::search(PLACE_PARTS)),
    ("lux:placeItemsProduced", HrefBuilder::search(PLACE_ITEMS_PRODUCED)),
    ("lux:placeItemsEncountered", HrefBuilder::search(PLACE_ITEMS_ENCOUNTERED)),
    ("lux:placeWorksAbout", HrefBuilder::search(PLACE_WORKS_ABOUT)),
    ("lux:placeWorksCreated", HrefBuilder::search(PLACE_WORKS_CREATED)),
    ("lux:placeWorksPublished", HrefBuilder::search(PLACE_WORKS_PUBLISHED)),
    ("lux:placeAgentsBorn", HrefBuilder::search(PLACE_AGENTS_BORN)),
    ("lux:placeAgentsActive", HrefBuilder::search(PLACE_AGENTS_ACTIVE)),
    ("lux:placeEvents", HrefBuilder::search(PLACE_EVENTS)),
    ("lux:placeRelatedAgents", HrefBuilder::related_list(Agent, "relatedToPlace")),
    ("lux:placeRelatedConcepts", HrefBuilder::related_list(Concept, "relatedToPlace")),
    ("lux:placeRelatedPlaces", HrefBuilder::related_list(Place, "relatedToPlace")),
    ("lux:setIncludedItems", HrefBuilder::search(SET_ITEMS_NESTED)),
    ("lux:setIncludedWorks", HrefBuilder::search(SET_WORKS)),
    ("lux:setIncludedSets", HrefBuilder::search(SET_SUBSETS)),
    ("lux:workCarriedBy", HrefBuilder::search(WORK_CARRIED_BY)),
    ("lux:workShownBy", HrefBuilder::search(WORK_SHOWN_BY)),
    ("lux:workWorksAbout", HrefBuilder::search(WORK_WORKS_ABOUT)),
    ("lux:workParts", HrefBuilder::search(WORK_PARTS)),
    ("lux:workRelatedAgents", HrefBuilder::related_list(Agent, "relatedToWork")),
    ("lux:workRelatedConcepts", HrefBuilder::related_list(Concept, "relatedToWork")),
    ("lux:workRelatedPlaces", HrefBuilder::related_list(Place, "relatedToWork")),
];

/// Builder preloaded with the full table. `build()` runs the self-check.
pub fn builder() -> RegistryBuilder {
    let mut builder = RegistryBuilder::default();
    for (id, f) in TEMPLATES {
        builder = builder.template(*id, *f);
    }
    for (scope, relations) in ESTIMATES {
        for (name, template) in *relations {
            builder = builder.relation(*scope, *name, *template);
        }
    }
    for (name, href) in HREFS {
        builder = builder.href(*name, *href);
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[test]
    fn test_builtin_passes_self_check() {
        let registry = Registry::builtin().unwrap();
        assert_eq!(registry.template_count(), TEMPLATES.len());
        assert_eq!(registry.relation_count(), HREFS.len());
        assert_eq!(registry.scopes(), EntityScope::ALL.to_vec());
    }

    #[test]
    fn test_every_relation_is_prefixed() {
        for (name, _) in HREFS {
            assert!(name.starts_with("lux:"), "{name}");
        }
    }

    #[test]
    fn test_item_scope_shares_related_template() {
        let registry = Registry::builtin().unwrap();
        assert_eq!(registry.relations_for(Item).len(), 5);
        assert_eq!(registry.distinct_templates_for(Item), 4);
    }

    #[test]
    fn test_set_items_estimator_differs_from_href() {
        let registry = Registry::builtin().unwrap();
        let estimator = registry
            .relations_for(Set)
            .iter()
            .find(|(name, _)| *name == "lux:setIncludedItems")
            .map(|(_, t)| *t)
            .unwrap();
        assert_eq!(estimator, SET_ITEMS_DIRECT);
        assert_eq!(
            registry.href_builder("lux:setIncludedItems"),
            Some(&HrefBuilder::search(SET_ITEMS_NESTED))
        );
    }
}
