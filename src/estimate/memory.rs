//! In-memory estimator.
//!
//! The reference implementation of `Estimator`. Answers come from an
//! ordered list of rules over the serialized query; the first rule whose
//! predicate matches decides. Queries no rule matches estimate to "no
//! results".
//!
//! Every call is recorded, so tests can assert on call counts, units, and
//! the exact queries the executor issued.

use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{Error, Result};
use super::{Estimate, Estimator, MatchFlag};

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

enum Answer {
    Flag(MatchFlag),
    Fail(String),
}

struct Rule {
    predicate: Predicate,
    answer: Answer,
}

/// One recorded estimate call.
#[derive(Debug, Clone)]
pub struct EstimateCall {
    pub unit: String,
    pub query: String,
    pub at: Instant,
}

/// Rule-based in-process estimator.
#[derive(Default)]
pub struct MemoryEstimator {
    rules: Vec<Rule>,
    calls: Mutex<Vec<EstimateCall>>,
}

impl MemoryEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `matched` for queries satisfying `predicate`.
    pub fn respond_when<F>(mut self, predicate: F, matched: bool) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.rules.push(Rule { predicate: Box::new(predicate), answer: Answer::Flag(matched.into()) });
        self
    }

    /// Answer with a raw count for queries satisfying `predicate`.
    pub fn count_when<F>(mut self, predicate: F, count: f64) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.rules.push(Rule { predicate: Box::new(predicate), answer: Answer::Flag(MatchFlag::Count(count)) });
        self
    }

    /// Reject queries satisfying `predicate`.
    pub fn fail_when<F>(mut self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.rules.push(Rule { predicate: Box::new(predicate), answer: Answer::Fail(message.into()) });
        self
    }

    /// Everything matches.
    pub fn matching_all() -> Self {
        Self::new().respond_when(|_| true, true)
    }

    pub fn calls(&self) -> Vec<EstimateCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }
}

impl std::fmt::Debug for MemoryEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEstimator")
            .field("rules", &self.rules.len())
            .field("calls", &self.call_count())
            .finish()
    }
}

#[async_trait]
impl Estimator for MemoryEstimator {
    async fn estimate(&self, unit: &str, query: &str) -> Result<Estimate> {
        self.calls.lock().push(EstimateCall {
            unit: unit.to_string(),
            query: query.to_string(),
            at: Instant::now(),
        });

        match self.rules.iter().find(|rule| (rule.predicate)(query)) {
            Some(Rule { answer: Answer::Flag(flag), .. }) => Ok(Estimate::new(*flag)),
            Some(Rule { answer: Answer::Fail(message), .. }) => {
                Err(Error::EstimateError(message.clone()))
            }
            None => Ok(Estimate::new(false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_rule_wins() {
        let est = MemoryEstimator::new()
            .fail_when(|q| q.contains("broken"), "backend down")
            .respond_when(|q| q.contains("aboutItem"), true);

        assert!(est.estimate("lux", "{\"aboutItem\":1}").await.unwrap().matched());
        assert!(!est.estimate("lux", "{\"other\":1}").await.unwrap().matched());
        let err = est.estimate("lux", "{\"broken\":1}").await.unwrap_err();
        assert!(matches!(err, Error::EstimateError(m) if m == "backend down"));
    }

    #[tokio::test]
    async fn test_calls_recorded() {
        let est = MemoryEstimator::matching_all();
        est.estimate("ypm", "q1").await.unwrap();
        est.estimate("ypm", "q2").await.unwrap();

        let calls = est.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].unit, "ypm");
        assert_eq!(calls[1].query, "q2");

        est.reset_calls();
        assert_eq!(est.call_count(), 0);
    }

    #[tokio::test]
    async fn test_count_answer() {
        let est = MemoryEstimator::new().count_when(|_| true, 0.0);
        assert!(!est.estimate("lux", "q").await.unwrap().matched());
    }
}
