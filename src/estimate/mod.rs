//! # Estimation Backend Trait
//!
//! The contract between link building and the search backend. An estimate
//! answers "would this query match at least one record?" and nothing more.
//!
//! ## Implementations
//!
//! | Estimator | Module | Description |
//! |-----------|--------|-------------|
//! | `MemoryEstimator` | `memory` | Rule-based, in-process; for tests and embedding |
//!
//! Production backends implement `Estimator` over their own transport and
//! own their timeouts. The executor bounds concurrency regardless of how
//! slow a backend is.

pub mod memory;
pub mod executor;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use memory::{MemoryEstimator, EstimateCall};
pub use executor::{
    BatchedExecutor, BatchPlan, ConfigAdvisory, EstimateFailure, EstimateResults, ExecutionStats,
};

// ============================================================================
// Estimate payload
// ============================================================================

/// Backend match flag: some backends answer with a boolean, some with a
/// count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchFlag {
    Bool(bool),
    Count(f64),
}

impl MatchFlag {
    /// `true`, or any non-zero count.
    pub fn is_truthy(&self) -> bool {
        match self {
            MatchFlag::Bool(b) => *b,
            MatchFlag::Count(n) => *n != 0.0 && !n.is_nan(),
        }
    }
}

impl From<bool> for MatchFlag {
    fn from(b: bool) -> Self {
        MatchFlag::Bool(b)
    }
}

/// Backend answer to one estimate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    #[serde(rename = "hasOneOrMoreResult")]
    pub has_one_or_more_result: MatchFlag,
}

impl Estimate {
    pub fn new(flag: impl Into<MatchFlag>) -> Self {
        Self { has_one_or_more_result: flag.into() }
    }

    pub fn matched(&self) -> bool {
        self.has_one_or_more_result.is_truthy()
    }
}

/// Per-key result of estimation. `None` marks a failed call.
///
/// Relations that share a combined key share the same `Arc`.
pub type EstimateOutcome = Option<Arc<Estimate>>;

// ============================================================================
// Estimator Trait
// ============================================================================

/// The estimation capability consumed by the executor.
///
/// Any error is a soft failure: the executor logs it and records `None`
/// for that key. Implementations should not retry internally on behalf of
/// the executor.
#[async_trait]
pub trait Estimator: Send + Sync + 'static {
    /// Estimate `query` (serialized `QueryObject` JSON) within tenant `unit`.
    async fn estimate(&self, unit: &str, query: &str) -> Result<Estimate>;
}

#[async_trait]
impl<E: Estimator + ?Sized> Estimator for Arc<E> {
    async fn estimate(&self, unit: &str, query: &str) -> Result<Estimate> {
        (**self).estimate(unit, query).await
    }
}
