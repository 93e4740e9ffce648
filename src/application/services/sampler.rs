use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::entities::snapshot::Snapshot;
use crate::domain::ports::collector::{CollectionError, MetricsSource};

/// Consecutive failed samples after which the agent stops.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Result of one sampling attempt.
#[derive(Debug)]
pub enum SampleOutcome {
    Sampled(Snapshot),
    /// Transient failure, the tick is skipped.
    Skipped(CollectionError),
    /// Failure limit reached, monitoring must stop.
    Exhausted(CollectionError),
}

/// Pulls one snapshot per tick from a `MetricsSource` within a time budget
/// and counts consecutive failures.
///
/// The budget is longer than the tick period: a slow sample still completes
/// and the controller reports the overrun. Only a sample that outlives the
/// budget is abandoned. A blocking task cannot be cancelled, so an abandoned
/// sample keeps running; the next call waits on it again instead of starting
/// a second one behind it.
pub struct Sampler {
    source: Arc<dyn MetricsSource>,
    budget: Duration,
    in_flight: Option<JoinHandle<Result<Snapshot, CollectionError>>>,
    consecutive_failures: u32,
}

impl Sampler {
    #[must_use]
    pub fn new(source: Arc<dyn MetricsSource>, budget: Duration) -> Self {
        Self {
            source,
            budget,
            in_flight: None,
            consecutive_failures: 0,
        }
    }

    /// Take one sample. The source runs on the blocking pool; exceeding the
    /// budget counts as `CollectionError::Timeout`. There is no retry, the
    /// next tick is the retry.
    pub async fn sample(&mut self) -> SampleOutcome {
        let source = Arc::clone(&self.source);
        let mut task = match self.in_flight.take() {
            Some(task) => {
                tracing::debug!("Previous sample still running, waiting on it");
                task
            }
            None => tokio::task::spawn_blocking(move || source.sample()),
        };

        let waited = tokio::time::timeout(self.budget, &mut task).await;
        let result = match waited {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(CollectionError::MetricsUnavailable(format!(
                "sampling task failed: {join_err}"
            ))),
            Err(_) => {
                self.in_flight = Some(task);
                Err(CollectionError::Timeout)
            }
        };

        match result {
            Ok(snapshot) => {
                self.consecutive_failures = 0;
                SampleOutcome::Sampled(snapshot)
            }
            Err(e) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    tracing::error!(
                        "Sampling failed {} times in a row: {e}",
                        self.consecutive_failures
                    );
                    SampleOutcome::Exhausted(e)
                } else {
                    tracing::warn!(
                        "Sampling failed ({}/{MAX_CONSECUTIVE_FAILURES}), skipping tick: {e}",
                        self.consecutive_failures
                    );
                    SampleOutcome::Skipped(e)
                }
            }
        }
    }

    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
