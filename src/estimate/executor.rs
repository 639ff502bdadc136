//! Batched estimation executor.
//!
//! ```text
//! combined queries ─► batches of `batch_size` ─► waves of `max_concurrent_batches`
//!
//! wave 1: [batch 1][batch 2]   all calls concurrent, wave fully settles
//! wave 2: [batch 3]            starts only after wave 1 settled
//! ```
//!
//! At most `batch_size × max_concurrent_batches` estimate calls are in
//! flight at any instant. A failed call records `None` for its key and
//! never affects any other call.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use crate::combine::{CombinedKey, CombinedQuery};
use crate::config::ExecutorConfig;
use super::{Estimate, EstimateOutcome, Estimator};

type Settled = std::result::Result<Arc<Estimate>, EstimateFailure>;

// ============================================================================
// Batch plan
// ============================================================================

/// Partition of `len` queries into batches, grouped into waves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    batches: Vec<Range<usize>>,
    wave_width: usize,
}

impl BatchPlan {
    pub fn new(len: usize, batch_size: usize, max_concurrent_batches: usize) -> Self {
        let batch_size = batch_size.max(1);
        let batches = (0..len)
            .step_by(batch_size)
            .map(|start| start..(start + batch_size).min(len))
            .collect();
        Self { batches, wave_width: max_concurrent_batches.max(1) }
    }

    /// Query index ranges, in order.
    pub fn batches(&self) -> &[Range<usize>] {
        &self.batches
    }

    /// Batches grouped into waves, in order.
    pub fn waves(&self) -> impl Iterator<Item = &[Range<usize>]> {
        self.batches.chunks(self.wave_width)
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn wave_count(&self) -> usize {
        self.batches.len().div_ceil(self.wave_width)
    }
}

// ============================================================================
// Advisories
// ============================================================================

/// Batching settings that work but are probably not what was intended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAdvisory {
    /// One call per batch with many concurrent batches: waves add latency
    /// without reducing load.
    SingleCallBatches { max_concurrent_batches: usize },
    /// Batch size larger than a typical entity's distinct template count:
    /// every entity runs in a single batch.
    BatchingDisabled { batch_size: usize, typical_distinct_templates: usize },
}

impl std::fmt::Display for ConfigAdvisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigAdvisory::SingleCallBatches { max_concurrent_batches } => write!(
                f,
                "batch_size 1 with max_concurrent_batches {max_concurrent_batches}: \
                 consider larger batches and fewer concurrent batches"
            ),
            ConfigAdvisory::BatchingDisabled { batch_size, typical_distinct_templates } => write!(
                f,
                "batch_size {batch_size} exceeds the typical {typical_distinct_templates} \
                 distinct templates per entity: batching is effectively disabled"
            ),
        }
    }
}

fn advisories_for(config: &ExecutorConfig) -> Vec<ConfigAdvisory> {
    let mut advisories = Vec::new();
    if config.batch_size == 1 && config.max_concurrent_batches >= config.advisory.high_concurrency {
        advisories.push(ConfigAdvisory::SingleCallBatches {
            max_concurrent_batches: config.max_concurrent_batches,
        });
    }
    if config.batch_size > config.advisory.typical_distinct_templates {
        advisories.push(ConfigAdvisory::BatchingDisabled {
            batch_size: config.batch_size,
            typical_distinct_templates: config.advisory.typical_distinct_templates,
        });
    }
    advisories
}

// ============================================================================
// Results
// ============================================================================

/// Execution statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    pub batches: usize,
    pub waves: usize,
    pub calls: usize,
    pub failures: usize,
    pub execution_time_ms: u64,
}

/// A rejected estimate call, as logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateFailure {
    pub key: CombinedKey,
    /// Serialized query, empty when serialization itself failed.
    pub query: String,
    pub error: String,
}

/// Outcome per combined key, plus how the run went.
#[derive(Debug, Clone, Default)]
pub struct EstimateResults {
    pub outcomes: HashMap<CombinedKey, EstimateOutcome>,
    /// In query order.
    pub failures: Vec<EstimateFailure>,
    pub stats: ExecutionStats,
}

impl EstimateResults {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&EstimateOutcome> {
        self.outcomes.get(&CombinedKey::from(key))
    }

    pub fn failed_keys(&self) -> Vec<&CombinedKey> {
        let mut keys: Vec<_> = self
            .outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_none())
            .map(|(key, _)| key)
            .collect();
        keys.sort();
        keys
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Runs combined queries against an `Estimator` in bounded waves.
pub struct BatchedExecutor<E: Estimator> {
    estimator: E,
    config: ExecutorConfig,
    advisories: Vec<ConfigAdvisory>,
}

impl<E: Estimator> BatchedExecutor<E> {
    /// Degenerate settings are logged here, once, and kept in `advisories()`.
    pub fn new(estimator: E, config: ExecutorConfig) -> Self {
        let advisories = advisories_for(&config);
        for advisory in &advisories {
            tracing::warn!(
                batch_size = config.batch_size,
                max_concurrent_batches = config.max_concurrent_batches,
                "{advisory}"
            );
        }
        Self { estimator, config, advisories }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn advisories(&self) -> &[ConfigAdvisory] {
        &self.advisories
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Estimate every combined query. Never fails: a rejected call yields
    /// `None` for its key. Returns after the last wave has settled.
    pub async fn execute(&self, queries: &[CombinedQuery]) -> EstimateResults {
        let started = Instant::now();
        let plan = BatchPlan::new(
            queries.len(),
            self.config.batch_size,
            self.config.max_concurrent_batches,
        );

        let mut results = EstimateResults {
            outcomes: HashMap::with_capacity(queries.len()),
            failures: Vec::new(),
            stats: ExecutionStats {
                batches: plan.batch_count(),
                waves: plan.wave_count(),
                ..Default::default()
            },
        };

        for (wave_no, wave) in plan.waves().enumerate() {
            tracing::trace!(wave = wave_no + 1, batches = wave.len(), "starting wave");
            let settled = join_all(
                wave.iter().map(|range| self.run_batch(&queries[range.clone()])),
            )
            .await;

            for (key, settled) in settled.into_iter().flatten() {
                results.stats.calls += 1;
                let outcome = match settled {
                    Ok(estimate) => Some(estimate),
                    Err(failure) => {
                        results.stats.failures += 1;
                        results.failures.push(failure);
                        None
                    }
                };
                // Keys are disjoint; an earlier entry is never replaced.
                results.outcomes.entry(key).or_insert(outcome);
            }
        }

        results.stats.execution_time_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            queries = queries.len(),
            batches = results.stats.batches,
            waves = results.stats.waves,
            failures = results.stats.failures,
            elapsed_ms = results.stats.execution_time_ms,
            "estimates settled"
        );
        results
    }

    async fn run_batch(&self, batch: &[CombinedQuery]) -> Vec<(CombinedKey, Settled)> {
        join_all(batch.iter().map(|query| self.estimate_one(query))).await
    }

    async fn estimate_one(&self, combined: &CombinedQuery) -> (CombinedKey, Settled) {
        let key = combined.key.clone();
        let serialized = match combined.query.serialize_compact() {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(relations = %key, error = %err, "could not serialize estimate query");
                let failure = EstimateFailure { key: key.clone(), query: String::new(), error: err.to_string() };
                return (key, Err(failure));
            }
        };

        match self.estimator.estimate(&self.config.unit, &serialized).await {
            Ok(estimate) => (key, Ok(Arc::new(estimate))),
            Err(err) => {
                tracing::warn!(
                    relations = %key,
                    query = %serialized,
                    unit = %self.config.unit,
                    timestamp = %chrono::Utc::now().to_rfc3339(),
                    batch_size = self.config.batch_size,
                    max_concurrent_batches = self.config.max_concurrent_batches,
                    error = %err,
                    "estimate failed, relations get no link"
                );
                let failure = EstimateFailure { key: key.clone(), query: serialized, error: err.to_string() };
                (key, Err(failure))
            }
        }
    }
}
