use serde::{Deserialize, Serialize};

use super::EpisodeKind;

/// Tally for one collection in one sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub kind: EpisodeKind,
    pub attempted: usize,
    pub succeeded: usize,
}

impl SyncOutcome {
    pub fn empty(kind: EpisodeKind) -> Self {
        Self {
            kind,
            attempted: 0,
            succeeded: 0,
        }
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// Per-collection outcomes of a full sync pass, in sync order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    /// Records successfully submitted across all collections.
    pub fn total(&self) -> usize {
        self.outcomes.iter().map(|o| o.succeeded).sum()
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.iter().map(|o| o.attempted).sum()
    }
}

/// Items partitioned by whether their step completed.
///
/// Built as a fold over a batch so that one item's failure is recorded
/// against that item and never short-circuits the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<(T, String)>,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BatchResult<T> {
    pub fn push_ok(mut self, item: T) -> Self {
        self.succeeded.push(item);
        self
    }

    pub fn push_err(mut self, item: T, reason: impl Into<String>) -> Self {
        self.failed.push((item, reason.into()));
        self
    }

    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

impl<T, E: std::fmt::Display> FromIterator<(T, Result<(), E>)> for BatchResult<T> {
    fn from_iter<I: IntoIterator<Item = (T, Result<(), E>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::default(), |batch, (item, result)| match result {
                Ok(()) => batch.push_ok(item),
                Err(e) => batch.push_err(item, e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_counts_both_sides() {
        let batch: BatchResult<u32> = vec![(1, Ok(())), (2, Err("boom")), (3, Ok(()))]
            .into_iter()
            .collect();

        assert_eq!(batch.succeeded, vec![1, 3]);
        assert_eq!(batch.failed, vec![(2, "boom".to_string())]);
        assert_eq!(batch.attempted(), 3);
    }

    #[test]
    fn report_total_sums_successes() {
        let report = SyncReport {
            outcomes: vec![
                SyncOutcome {
                    kind: EpisodeKind::Task,
                    attempted: 3,
                    succeeded: 2,
                },
                SyncOutcome {
                    kind: EpisodeKind::Project,
                    attempted: 1,
                    succeeded: 1,
                },
                SyncOutcome::empty(EpisodeKind::Content),
            ],
        };
        assert_eq!(report.total(), 3);
        assert_eq!(report.attempted(), 4);
        assert_eq!(report.outcomes[0].failed(), 1);
    }
}
