//! Single-consumer accumulator for unit outcomes.

use std::collections::BTreeMap;

use super::{PipelineSummary, Status, ValidationOutcome};

/// Folds outcomes as they arrive, in any order. Owned by one task that drains
/// the results channel, so no locking is needed. A second outcome for a key
/// that already reported is dropped.
#[derive(Debug, Default)]
pub struct Aggregator {
    outcomes: BTreeMap<String, ValidationOutcome>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and keeps the first outcome) when `key` already reported.
    pub fn record(&mut self, outcome: ValidationOutcome) -> bool {
        if self.outcomes.contains_key(&outcome.key) {
            tracing::warn!(key = %outcome.key, "duplicate outcome ignored");
            return false;
        }
        match outcome.status {
            Status::Ok => tracing::debug!(key = %outcome.key, "ok"),
            status => tracing::warn!(
                key = %outcome.key,
                %status,
                detail = outcome.detail.as_deref().unwrap_or(""),
                "unit failed"
            ),
        }
        self.outcomes.insert(outcome.key.clone(), outcome);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.outcomes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Gives every key in `expected` that never reported an Error outcome with `detail`.
    /// Returns how many were filled.
    pub fn fill_missing<'a, I>(&mut self, expected: I, detail: &str) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut filled = 0;
        for key in expected {
            if !self.contains(key) {
                self.record(ValidationOutcome::error(key, detail));
                filled += 1;
            }
        }
        filled
    }

    pub fn finish(self) -> PipelineSummary {
        let total = self.outcomes.len();
        let mut ok_count = 0;
        let mut failed = Vec::new();
        for (_, outcome) in self.outcomes {
            if outcome.is_ok() {
                ok_count += 1;
            } else {
                failed.push(outcome);
            }
        }
        PipelineSummary {
            total,
            ok_count,
            failed,
        }
    }
}
