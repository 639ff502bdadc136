//! Result demultiplexer: combined key → each relation in it.

use std::collections::HashMap;

use crate::combine::CombinedKey;
use crate::estimate::EstimateOutcome;

/// Outcome per relation name.
pub type RelationOutcomes = HashMap<String, EstimateOutcome>;

/// Give every relation of a combined key that key's outcome.
///
/// Relations sharing a key receive clones of the same `Arc`, so their
/// outcomes are the same allocation, not just equal values. Must only run
/// on fully settled executor output.
pub fn demultiplex(outcomes: &HashMap<CombinedKey, EstimateOutcome>) -> RelationOutcomes {
    let mut by_relation = HashMap::with_capacity(outcomes.len());
    for (key, outcome) in outcomes {
        for relation in key.relations() {
            by_relation.insert(relation.to_string(), outcome.clone());
        }
    }
    by_relation
}
