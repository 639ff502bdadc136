//! End-to-end tests for the full link pipeline.
//!
//! Each test exercises: combine -> execute -> demultiplex -> assemble
//! against the built-in registry and a MemoryEstimator.

use pretty_assertions::assert_eq;
use serde_json::json;

use hal_links::{Document, HalConfig, HalLinksBuilder, MemoryEstimator};

const BASE: &str = "https://lux.test";

fn builder(estimator: MemoryEstimator) -> HalLinksBuilder<MemoryEstimator> {
    HalLinksBuilder::with_builtin(estimator, HalConfig::default().with_search_base(BASE)).unwrap()
}

// ============================================================================
// 1. Item with a failing shared template: 4 queries, 3 links
// ============================================================================

#[tokio::test]
async fn test_item_shared_template_failure_drops_both_relations() {
    let estimator = MemoryEstimator::new()
        .fail_when(|q| q.contains("producedItem"), "backend 503")
        .respond_when(|_| true, true);
    let hal = builder(estimator);

    let links = hal.get_links(&Document::new("X", "HumanMadeObject")).await;

    assert_eq!(hal.estimator().call_count(), 4);
    assert_eq!(
        links.names(),
        vec!["curies", "self", "lux:itemArchive", "lux:itemEvents", "lux:itemWorksAbout"]
    );
    assert!(!links.contains("lux:itemRelatedAgents"));
    assert!(!links.contains("lux:itemRelatedPlaces"));
}

// ============================================================================
// 2. Shared template succeeding links every relation that shares it
// ============================================================================

#[tokio::test]
async fn test_shared_template_success_links_all_sharers() {
    let estimator = MemoryEstimator::new().respond_when(|q| q.contains("producedItem"), true);
    let hal = builder(estimator);

    let links = hal.get_links(&Document::new("X", "HumanMadeObject")).await;

    assert_eq!(links.relation_count(), 2);
    assert_eq!(
        links.get("lux:itemRelatedAgents").unwrap().href,
        "https://lux.test/api/related-list/agent?name=relatedToItem&uri=X"
    );
    assert_eq!(
        links.get("lux:itemRelatedPlaces").unwrap().href,
        "https://lux.test/api/related-list/place?name=relatedToItem&uri=X"
    );
}

// ============================================================================
// 3. Unclassified type: no backend calls, still curies + self
// ============================================================================

#[tokio::test]
async fn test_unmapped_type_gets_only_fixed_links() {
    let hal = builder(MemoryEstimator::matching_all());

    let links = hal.get_links(&Document::new("urn:thing", "Unicorn")).await;

    assert_eq!(hal.estimator().call_count(), 0);
    assert_eq!(
        links.to_json(),
        json!({
            "curies": [{"name": "lux", "href": "https://lux.test/api/rels/{rel}", "templated": true}],
            "self": {"href": "urn:thing"}
        })
    );
}

// ============================================================================
// 4. Nothing matches: curies + self only, one call per distinct template
// ============================================================================

#[tokio::test]
async fn test_no_matches_for_place() {
    let hal = builder(MemoryEstimator::new());

    let links = hal.get_links(&Document::new("P", "Place")).await;

    assert_eq!(links.names(), vec!["curies", "self"]);
    assert_eq!(
        hal.estimator().call_count(),
        hal.registry().distinct_templates_for(hal_links::EntityScope::Place)
    );
}

// ============================================================================
// 5. Every backend call failing never fails the document
// ============================================================================

#[tokio::test]
async fn test_total_backend_outage_degrades_to_fixed_links() {
    let hal = builder(MemoryEstimator::new().fail_when(|_| true, "connection refused"));

    for ty in ["Person", "Type", "Activity", "HumanMadeObject", "Place", "Set", "LinguisticObject"] {
        let links = hal.get_links(&Document::new("urn:x", ty)).await;
        assert_eq!(links.names(), vec!["curies", "self"], "type {ty}");
    }
}

// ============================================================================
// 6. Estimator and href may use different templates
// ============================================================================

#[tokio::test]
async fn test_set_items_estimate_direct_link_nested() {
    let hal = builder(MemoryEstimator::new().respond_when(|q| q.contains("\"_scope\":\"item\""), true));

    let links = hal.get_links(&Document::new("S", "Set")).await;

    let estimated: Vec<String> = hal
        .estimator()
        .calls()
        .into_iter()
        .map(|c| c.query)
        .filter(|q| q.contains("\"_scope\":\"item\""))
        .collect();
    assert_eq!(estimated.len(), 1);
    assert!(!estimated[0].contains("\"OR\""));

    let href = &links.get("lux:setIncludedItems").unwrap().href;
    assert!(href.starts_with("https://lux.test/api/search/item?q="));
    assert!(href.contains("%22OR%22"));
    assert_eq!(links.relation_count(), 1);
}

// ============================================================================
// 7. Raw record in, HAL _links out
// ============================================================================

#[tokio::test]
async fn test_get_links_json() {
    let hal = builder(MemoryEstimator::new().respond_when(|q| q.contains("aboutAgent"), true));
    let record = json!({
        "id": "https://lux.test/data/person/ada",
        "type": "Person",
        "_label": "Ada"
    });

    let links = hal.get_links_json(&record).await.unwrap();
    let rendered = links.to_json();

    assert_eq!(rendered["self"], json!({"href": "https://lux.test/data/person/ada"}));
    assert_eq!(rendered["lux:agentWorkAbout"]["_estimate"], json!(1));
    // related lists share a template that also checks aboutAgent
    assert!(links.contains("lux:agentRelatedAgents"));
    assert!(links.contains("lux:agentRelatedPlaces"));
    assert!(links.contains("lux:agentRelatedConcepts"));
    assert!(!links.contains("lux:agentWorkCreated"));

    assert!(hal.get_links_json(&json!({"type": "Person"})).await.is_none());
}

// ============================================================================
// 8. Tenant unit reaches the backend
// ============================================================================

#[tokio::test]
async fn test_unit_reaches_backend() {
    let config = HalConfig::default().with_unit("ypm");
    let hal = HalLinksBuilder::with_builtin(MemoryEstimator::new(), config).unwrap();

    hal.get_links(&Document::new("W", "VisualItem")).await;

    let calls = hal.estimator().calls();
    assert!(!calls.is_empty());
    assert!(calls.iter().all(|c| c.unit == "ypm"));
}

// ============================================================================
// 9. Degenerate batching is advisory only
// ============================================================================

#[tokio::test]
async fn test_degenerate_config_still_builds_links() {
    let config = HalConfig::default().with_batching(1, 16);
    let hal = HalLinksBuilder::with_builtin(MemoryEstimator::matching_all(), config).unwrap();

    assert_eq!(hal.advisories().len(), 1);
    let links = hal.get_links(&Document::new("X", "HumanMadeObject")).await;
    assert_eq!(links.relation_count(), 5);
}
