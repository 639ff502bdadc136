//! Link builder configuration.
//!
//! `HalConfig` is the user-facing shape (JSON or `HAL_*` environment
//! variables). `ExecutorConfig` is the normalized form the executor runs
//! with: every count is at least 1.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_BATCH_SIZE: i64 = 6;
pub const DEFAULT_MAX_CONCURRENT_BATCHES: i64 = 2;
pub const DEFAULT_UNIT: &str = "lux";
pub const DEFAULT_SEARCH_BASE: &str = "https://lux.collections.yale.edu";

/// Thresholds for the degenerate-configuration advisories.
///
/// Advisories are logged, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvisoryThresholds {
    /// With `batch_size == 1`, concurrency at or above this is flagged.
    pub high_concurrency: usize,
    /// A `batch_size` above this effectively disables batching.
    pub typical_distinct_templates: usize,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self { high_concurrency: 4, typical_distinct_templates: 12 }
    }
}

/// Options accepted by `HalLinksBuilder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HalConfig {
    /// Estimate calls per batch. Non-positive values are floored to 1.
    pub batch_size: i64,
    /// Batches per wave. Non-positive values are floored to 1.
    pub max_concurrent_batches: i64,
    /// Tenant passed to every estimate call.
    pub unit: String,
    /// Base URI of search and related-list hrefs.
    pub search_base: String,
    pub curie_name: String,
    /// Defaults to `{search_base}/api/rels/{rel}`.
    pub curie_href: Option<String>,
    pub advisory: AdvisoryThresholds,
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrent_batches: DEFAULT_MAX_CONCURRENT_BATCHES,
            unit: DEFAULT_UNIT.into(),
            search_base: DEFAULT_SEARCH_BASE.into(),
            curie_name: crate::registry::lux::CURIE_NAME.into(),
            curie_href: None,
            advisory: AdvisoryThresholds::default(),
        }
    }
}

impl HalConfig {
    pub fn with_batching(mut self, batch_size: i64, max_concurrent_batches: i64) -> Self {
        self.batch_size = batch_size;
        self.max_concurrent_batches = max_concurrent_batches;
        self
    }

    pub fn with_search_base(mut self, base: impl Into<String>) -> Self {
        self.search_base = base.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Defaults overridden by `HAL_BATCH_SIZE`, `HAL_MAX_CONCURRENT_BATCHES`,
    /// `HAL_UNIT`, `HAL_SEARCH_BASE`, `HAL_CURIE_NAME`, `HAL_CURIE_HREF`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = lookup("HAL_BATCH_SIZE") {
            config.batch_size = parse_int("HAL_BATCH_SIZE", &v)?;
        }
        if let Some(v) = lookup("HAL_MAX_CONCURRENT_BATCHES") {
            config.max_concurrent_batches = parse_int("HAL_MAX_CONCURRENT_BATCHES", &v)?;
        }
        if let Some(v) = lookup("HAL_UNIT") {
            config.unit = v;
        }
        if let Some(v) = lookup("HAL_SEARCH_BASE") {
            config.search_base = v;
        }
        if let Some(v) = lookup("HAL_CURIE_NAME") {
            config.curie_name = v;
        }
        if let Some(v) = lookup("HAL_CURIE_HREF") {
            config.curie_href = Some(v);
        }
        Ok(config)
    }

    pub fn curie_href(&self) -> String {
        self.curie_href.clone().unwrap_or_else(|| {
            format!("{}/api/rels/{{rel}}", self.search_base.trim_end_matches('/'))
        })
    }

    /// Normalized executor settings.
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            batch_size: floor_to_one("batch_size", self.batch_size),
            max_concurrent_batches: floor_to_one("max_concurrent_batches", self.max_concurrent_batches),
            unit: self.unit.clone(),
            advisory: self.advisory,
        }
    }
}

fn parse_int(key: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::ConfigError(format!("{key} must be an integer, got '{raw}'")))
}

fn floor_to_one(name: &str, value: i64) -> usize {
    if value < 1 {
        tracing::debug!(option = name, value, "non-positive option floored to 1");
        1
    } else {
        value as usize
    }
}

/// Executor settings after flooring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub batch_size: usize,
    pub max_concurrent_batches: usize,
    pub unit: String,
    pub advisory: AdvisoryThresholds,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        HalConfig::default().executor_config()
    }
}

impl ExecutorConfig {
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            max_concurrent_batches: max_concurrent_batches.max(1),
            ..Self::default()
        }
    }

    /// Upper bound on estimate calls in flight at any instant.
    pub fn max_in_flight(&self) -> usize {
        self.batch_size * self.max_concurrent_batches
    }
}
