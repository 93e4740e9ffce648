use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use super::alert_manager::AlertManager;
use super::exporter::Exporter;
use super::sampler::{SampleOutcome, Sampler};
use crate::domain::entities::alert::Alert;
use crate::domain::entities::network::format_rate;
use crate::domain::entities::snapshot::Snapshot;
use crate::domain::ports::collector::CollectionError;
use crate::domain::ports::sink::Sink;
use crate::domain::rules::ThresholdEvaluator;
use crate::domain::value_objects::thresholds::ThresholdSet;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("sampler failed {failures} consecutive times, last error: {source}")]
    SamplerExhausted {
        failures: u32,
        #[source]
        source: CollectionError,
    },
}

/// Result of a single monitoring cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorCycleResult {
    pub sampled: bool,
    pub breaches: usize,
    pub alerts_fired: usize,
}

/// Running min, max and mean of one sampled metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: u64,
}

impl MetricSummary {
    pub fn record(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += value;
        self.count += 1;
    }

    /// `None` until the first value is recorded.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Running totals over the agent's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitorStats {
    pub ticks_completed: u64,
    pub ticks_skipped: u64,
    pub overruns: u64,
    pub breaches: u64,
    pub alerts_fired: u64,
    pub snapshots_exported: u64,
    pub export_failures: u64,
    pub cpu_percent: MetricSummary,
    pub memory_percent: MetricSummary,
    /// Fullest mount per sample.
    pub disk_percent: MetricSummary,
    /// Inbound plus outbound over all interfaces.
    pub network_bytes_per_sec: MetricSummary,
}

impl MonitorStats {
    fn record_snapshot(&mut self, snapshot: &Snapshot) {
        let (rx, tx) = snapshot.total_network_rates();
        self.cpu_percent.record(snapshot.cpu.global_usage_percent);
        self.memory_percent.record(snapshot.memory.usage_percent);
        self.disk_percent.record(snapshot.max_disk_percent());
        self.network_bytes_per_sec.record(rx + tx);
    }
}

/// Runs one tick: sample → evaluate → alert → sinks, and buffers the
/// snapshot for export.
pub struct MonitorService {
    sampler: Sampler,
    evaluator: ThresholdEvaluator,
    thresholds: ThresholdSet,
    alert_manager: AlertManager,
    sink: Arc<dyn Sink>,
    alerts: broadcast::Sender<Alert>,
    exporter: Option<Arc<Exporter>>,
    stats: MonitorStats,
}

impl MonitorService {
    #[must_use]
    pub fn new(
        sampler: Sampler,
        evaluator: ThresholdEvaluator,
        thresholds: ThresholdSet,
        alert_manager: AlertManager,
        sink: Arc<dyn Sink>,
        alerts: broadcast::Sender<Alert>,
        exporter: Option<Arc<Exporter>>,
    ) -> Self {
        Self {
            sampler,
            evaluator,
            thresholds,
            alert_manager,
            sink,
            alerts,
            exporter,
            stats: MonitorStats::default(),
        }
    }

    /// Run a single monitoring cycle.
    ///
    /// A failed sample skips the rest of the cycle and is not an error.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::SamplerExhausted` once sampling has failed
    /// too many times in a row.
    pub async fn run_once(&mut self) -> Result<MonitorCycleResult, MonitorError> {
        let snapshot = match self.sampler.sample().await {
            SampleOutcome::Sampled(snapshot) => snapshot,
            SampleOutcome::Skipped(_) => {
                self.stats.ticks_skipped += 1;
                return Ok(MonitorCycleResult::default());
            }
            SampleOutcome::Exhausted(source) => {
                self.stats.ticks_skipped += 1;
                return Err(MonitorError::SamplerExhausted {
                    failures: self.sampler.consecutive_failures(),
                    source,
                });
            }
        };

        log_snapshot(&snapshot);
        self.stats.record_snapshot(&snapshot);

        let breaches = self.evaluator.evaluate(&snapshot, &self.thresholds);
        if breaches.is_empty() {
            tracing::debug!("System OK, no threshold breached");
        }

        let alerts = self.alert_manager.handle_all(&breaches);
        for alert in &alerts {
            self.deliver(alert);
        }

        if let Some(exporter) = &self.exporter {
            exporter.add(snapshot);
        }

        self.stats.ticks_completed += 1;
        self.stats.breaches += breaches.len() as u64;
        self.stats.alerts_fired += alerts.len() as u64;

        Ok(MonitorCycleResult {
            sampled: true,
            breaches: breaches.len(),
            alerts_fired: alerts.len(),
        })
    }

    fn deliver(&self, alert: &Alert) {
        if let Err(e) = self.sink.write(alert.level(), &alert.message) {
            tracing::warn!("Alert could not be written to sink: {e}");
        }
        // No subscriber is not an error: email/sound senders are optional.
        let _ = self.alerts.send(alert.clone());
    }

    pub fn record_overrun(&mut self) {
        self.stats.overruns += 1;
    }

    #[must_use]
    pub const fn stats(&self) -> &MonitorStats {
        &self.stats
    }
}

fn log_snapshot(snapshot: &Snapshot) {
    let (rx, tx) = snapshot.total_network_rates();
    tracing::info!(
        "CPU {:.1}% | memory {:.1}% | disk max {:.1}% | net ↓{} ↑{} | {} processes",
        snapshot.cpu.global_usage_percent,
        snapshot.memory.usage_percent,
        snapshot.max_disk_percent(),
        format_rate(rx),
        format_rate(tx),
        snapshot.processes.len(),
    );
}
