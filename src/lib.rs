//! # hal-links: Estimate-driven HAL related-resource links
//!
//! Decorates search/document records with HAL `_links` to related
//! resources ("works about this agent", "items produced at this place"),
//! emitting only the links whose underlying query would match something.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `Estimator` is the contract between link building and
//!    the search backend
//! 2. **Registry is data**: relations, query templates, and href builders are
//!    declarative tables, checked once at startup
//! 3. **Dedup by template identity**: relations sharing a `TemplateId` cost
//!    one backend estimate, never one per relation
//! 4. **Bounded load**: estimates run in batches, batches run in waves,
//!    at most `batch_size × max_concurrent_batches` calls in flight
//! 5. **Degrade, don't fail**: a failed estimate drops one link, never the
//!    response
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hal_links::{Document, HalConfig, HalLinksBuilder, MemoryEstimator, Registry};
//!
//! # async fn example() -> hal_links::Result<()> {
//! let registry = Arc::new(Registry::builtin()?);
//! let estimator = MemoryEstimator::new().respond_when(|q| q.contains("aboutItem"), true);
//! let builder = HalLinksBuilder::new(registry, estimator, HalConfig::default());
//!
//! let doc = Document::new("https://example.org/data/object/1", "HumanMadeObject");
//! let links = builder.get_links(&doc).await;
//! assert!(links.contains("lux:itemWorksAbout"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | Combine | `combine` | One query per distinct template for the document's scope |
//! | Execute | `estimate::executor` | Batched, wave-bounded estimate calls |
//! | Demultiplex | `demux` | Fan combined results back out to relations |
//! | Assemble | `assemble` | Build `curies`, `self`, and estimated relation links |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod registry;
pub mod combine;
pub mod estimate;
pub mod demux;
pub mod assemble;
pub mod hal;
pub mod config;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    EntityScope, Query, QueryObject, Document,
    HalLink, Curie, LinkCollection,
};

// ============================================================================
// Re-exports: Registry
// ============================================================================

pub use registry::{
    Registry, RegistryBuilder, RelationName, TemplateId, TemplateFn, HrefBuilder,
};

// ============================================================================
// Re-exports: Pipeline
// ============================================================================

pub use combine::{CombinedKey, CombinedQuery, build_combined_queries};
pub use estimate::{
    Estimator, Estimate, MatchFlag, EstimateOutcome, MemoryEstimator, EstimateCall,
    BatchedExecutor, BatchPlan, ConfigAdvisory, EstimateFailure, EstimateResults, ExecutionStats,
};
pub use demux::{demultiplex, RelationOutcomes};
pub use assemble::assemble_links;
pub use hal::HalLinksBuilder;
pub use config::{HalConfig, AdvisoryThresholds, ExecutorConfig};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Relation '{relation}' in scope {scope} has no href builder")]
    MissingHrefBuilder { scope: EntityScope, relation: String },

    #[error("Href builder for '{0}' has no estimate relation")]
    OrphanHrefBuilder(String),

    #[error("Href builder for '{0}' registered more than once")]
    DuplicateHrefBuilder(String),

    #[error("Template '{template}' used by '{relation}' is not registered")]
    UnknownTemplate { relation: String, template: String },

    #[error("Href template '{0}' is not registered")]
    UnknownHrefTemplate(String),

    #[error("Relation name '{0}' is empty or contains ','")]
    InvalidRelationName(String),

    #[error("Template '{0}' registered more than once")]
    DuplicateTemplate(String),

    #[error("Relation '{relation}' registered more than once in scope {scope}")]
    DuplicateRelation { scope: EntityScope, relation: String },

    #[error("Estimate error: {0}")]
    EstimateError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
