//! Link assembler.
//!
//! Turns per-relation outcomes into the finished `LinkCollection`. The
//! `curies` and `self` entries are always present; a relation gets a link
//! only when its estimate matched. A failed estimate (`None`) is treated
//! exactly like "no match".

use crate::config::HalConfig;
use crate::demux::RelationOutcomes;
use crate::model::{Curie, Document, HalLink, LinkCollection};
use crate::registry::Registry;

/// The fixed `curies` + `self` skeleton for a document.
pub fn base_links(doc: &Document, config: &HalConfig) -> LinkCollection {
    let curie = Curie {
        name: config.curie_name.clone(),
        href: config.curie_href(),
        templated: true,
    };
    LinkCollection::new(vec![curie], HalLink::new(doc.id.clone()))
}

/// Build the link collection for `doc` from settled relation outcomes.
pub fn assemble_links(
    registry: &Registry,
    config: &HalConfig,
    doc: &Document,
    outcomes: &RelationOutcomes,
) -> LinkCollection {
    let mut links = base_links(doc, config);

    for (relation, outcome) in outcomes {
        let Some(estimate) = outcome else { continue };
        if !estimate.matched() {
            continue;
        }
        let Some(builder) = registry.href_builder(relation) else {
            tracing::warn!(%relation, "relation has no href builder, link dropped");
            continue;
        };
        match builder.build(registry, &doc.id, &config.search_base) {
            Ok(href) => {
                links.relations.insert(relation.clone(), HalLink::estimated(href));
            }
            Err(err) => {
                tracing::warn!(%relation, id = %doc.id, error = %err, "could not build href, link dropped");
            }
        }
    }

    links
}
