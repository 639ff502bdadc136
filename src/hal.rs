//! HAL links builder: the per-document pipeline.
//!
//! ```text
//! Document ─► combine ─► (no queries) ─────────────────────────► curies + self
//!                 │
//!                 └──► execute (batched waves) ─► demultiplex ─► assemble
//! ```
//!
//! There is no retry: a failed estimate ends that relation's path at "no
//! link" and the rest of the pipeline carries on.

use std::sync::Arc;

use crate::assemble::{assemble_links, base_links};
use crate::combine::build_combined_queries;
use crate::config::HalConfig;
use crate::demux::demultiplex;
use crate::estimate::{BatchedExecutor, ConfigAdvisory, Estimator};
use crate::model::{Document, LinkCollection};
use crate::registry::Registry;

/// Builds HAL link collections for documents.
pub struct HalLinksBuilder<E: Estimator> {
    registry: Arc<Registry>,
    executor: BatchedExecutor<E>,
    config: HalConfig,
}

impl<E: Estimator> HalLinksBuilder<E> {
    /// Batching options are floored to 1; degenerate combinations are
    /// logged as advisories.
    pub fn new(registry: Arc<Registry>, estimator: E, config: HalConfig) -> Self {
        let executor = BatchedExecutor::new(estimator, config.executor_config());
        Self { registry, executor, config }
    }

    /// Builder over the built-in relation table.
    pub fn with_builtin(estimator: E, config: HalConfig) -> crate::Result<Self> {
        Ok(Self::new(Arc::new(Registry::builtin()?), estimator, config))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &HalConfig {
        &self.config
    }

    pub fn estimator(&self) -> &E {
        self.executor.estimator()
    }

    pub fn advisories(&self) -> &[ConfigAdvisory] {
        self.executor.advisories()
    }

    /// Link collection for one document. Never fails; backend trouble only
    /// removes relation links.
    pub async fn get_links(&self, doc: &Document) -> LinkCollection {
        let queries = build_combined_queries(&self.registry, doc);
        if queries.is_empty() {
            return base_links(doc, &self.config);
        }

        let results = self.executor.execute(&queries).await;
        let by_relation = demultiplex(&results.outcomes);
        let links = assemble_links(&self.registry, &self.config, doc, &by_relation);

        tracing::debug!(
            id = %doc.id,
            queries = queries.len(),
            failures = results.stats.failures,
            links = links.relation_count(),
            "links assembled"
        );
        links
    }

    /// `get_links` over a raw record. `None` when the record has no
    /// string `id` and `type`.
    pub async fn get_links_json(&self, record: &serde_json::Value) -> Option<LinkCollection> {
        let doc = Document::from_json(record)?;
        Some(self.get_links(&doc).await)
    }
}
