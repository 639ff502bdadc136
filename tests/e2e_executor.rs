//! End-to-end tests for batched estimation: wave ordering, concurrency
//! bound, and failure isolation, measured with a sleeping estimator.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use hal_links::{
    BatchedExecutor, CombinedKey, CombinedQuery, EntityScope, Error, Estimate, Estimator,
    ExecutorConfig, Query, QueryObject, Result, TemplateId,
};

// ============================================================================
// Helper: estimator that sleeps and records each call's window
// ============================================================================

#[derive(Default)]
struct SlowEstimator {
    delay: Duration,
    fail_marker: Option<&'static str>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    windows: Mutex<Vec<(String, Instant, Instant)>>,
}

impl SlowEstimator {
    fn new(delay_ms: u64) -> Self {
        Self { delay: Duration::from_millis(delay_ms), ..Default::default() }
    }

    fn failing_on(mut self, marker: &'static str) -> Self {
        self.fail_marker = Some(marker);
        self
    }

    /// (start, end) per query string.
    fn windows(&self) -> HashMap<String, (Instant, Instant)> {
        self.windows
            .lock()
            .iter()
            .map(|(q, s, e)| (q.clone(), (*s, *e)))
            .collect()
    }
}

#[async_trait]
impl Estimator for SlowEstimator {
    async fn estimate(&self, _unit: &str, query: &str) -> Result<Estimate> {
        let start = Instant::now();
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.windows.lock().push((query.to_string(), start, Instant::now()));

        match self.fail_marker {
            Some(marker) if query.contains(marker) => Err(Error::EstimateError("boom".into())),
            _ => Ok(Estimate::new(true)),
        }
    }
}

fn queries(n: usize) -> Vec<CombinedQuery> {
    (0..n)
        .map(|i| CombinedQuery {
            key: CombinedKey::from(format!("lux:r{i}").as_str()),
            template: TemplateId("test"),
            query: QueryObject::new(EntityScope::Work, Query::field("aboutItem", Query::id(format!("q{i}")))),
        })
        .collect()
}

/// Call windows grouped by batch index (query i belongs to batch i / size).
fn batch_windows(
    estimator: &SlowEstimator,
    qs: &[CombinedQuery],
    batch_size: usize,
) -> Vec<Vec<(Instant, Instant)>> {
    let windows = estimator.windows();
    let mut batches: Vec<Vec<(Instant, Instant)>> = Vec::new();
    for (i, q) in qs.iter().enumerate() {
        let serialized = q.query.serialize_compact().unwrap();
        if i % batch_size == 0 {
            batches.push(Vec::new());
        }
        batches.last_mut().unwrap().push(windows[&serialized]);
    }
    batches
}

fn latest_end(calls: &[(Instant, Instant)]) -> Instant {
    calls.iter().map(|(_, e)| *e).max().unwrap()
}

fn earliest_start(calls: &[(Instant, Instant)]) -> Instant {
    calls.iter().map(|(s, _)| *s).min().unwrap()
}

// ============================================================================
// 1. max_concurrent_batches = 1: batches never overlap
// ============================================================================

#[tokio::test]
async fn test_single_lane_batches_are_sequential() {
    let qs = queries(6);
    let executor = BatchedExecutor::new(SlowEstimator::new(20), ExecutorConfig::new(2, 1));

    let results = executor.execute(&qs).await;
    assert_eq!(results.len(), 6);
    assert_eq!(results.stats.batches, 3);
    assert_eq!(results.stats.waves, 3);

    let batches = batch_windows(executor.estimator(), &qs, 2);
    for pair in batches.windows(2) {
        assert!(latest_end(&pair[0]) <= earliest_start(&pair[1]));
    }
    assert_eq!(executor.estimator().peak.load(Ordering::SeqCst), 2);
}

// ============================================================================
// 2. batch 2 x wave 2 over 5 queries: batches 1-2 together, then batch 3
// ============================================================================

#[tokio::test]
async fn test_two_waves_over_five_queries() {
    let qs = queries(5);
    let executor = BatchedExecutor::new(SlowEstimator::new(30), ExecutorConfig::new(2, 2));

    let results = executor.execute(&qs).await;
    assert_eq!(results.stats.batches, 3);
    assert_eq!(results.stats.waves, 2);
    assert_eq!(results.len(), 5);

    let batches = batch_windows(executor.estimator(), &qs, 2);
    assert_eq!(batches.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 2, 1]);

    // batches 1 and 2 ran side by side
    assert!(earliest_start(&batches[1]) < latest_end(&batches[0]));
    // batch 3 waited for both
    let wave_one_end = latest_end(&batches[0]).max(latest_end(&batches[1]));
    assert!(wave_one_end <= earliest_start(&batches[2]));
    assert_eq!(executor.estimator().peak.load(Ordering::SeqCst), 4);
}

// ============================================================================
// 3. In-flight calls never exceed batch_size x max_concurrent_batches
// ============================================================================

#[tokio::test]
async fn test_in_flight_bound() {
    let qs = queries(20);
    let config = ExecutorConfig::new(3, 2);
    let bound = config.max_in_flight();
    let executor = BatchedExecutor::new(SlowEstimator::new(10), config);

    let results = executor.execute(&qs).await;

    assert_eq!(results.len(), 20);
    assert_eq!(executor.estimator().peak.load(Ordering::SeqCst), bound);
    assert_eq!(executor.estimator().in_flight.load(Ordering::SeqCst), 0);
}

// ============================================================================
// 4. One rejected call: N entries, exactly one None
// ============================================================================

#[tokio::test]
async fn test_one_failure_isolated_across_waves() {
    let qs = queries(7);
    let estimator = SlowEstimator::new(5).failing_on("\"q1\"");
    let executor = BatchedExecutor::new(estimator, ExecutorConfig::new(2, 2));

    let results = executor.execute(&qs).await;

    assert_eq!(results.len(), 7);
    assert_eq!(results.outcomes.values().filter(|o| o.is_none()).count(), 1);
    assert_eq!(results.failed_keys(), vec![&CombinedKey::from("lux:r1")]);
    assert_eq!(results.stats.failures, 1);
    assert_eq!(results.failures.len(), 1);
    assert_eq!(results.failures[0].key, CombinedKey::from("lux:r1"));
    assert_eq!(results.failures[0].query, qs[1].query.serialize_compact().unwrap());
    assert_eq!(results.failures[0].error, "Estimate error: boom");
    // the failing call's batch-mate and later waves still completed
    assert!(results.get("lux:r0").unwrap().as_ref().unwrap().matched());
    assert!(results.get("lux:r6").unwrap().as_ref().unwrap().matched());
}
