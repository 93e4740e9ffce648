use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::alert_manager::{AlertManager, AlertPolicy};
use super::exporter::Exporter;
use super::monitor::{MetricSummary, MonitorService, MonitorStats};
use crate::domain::entities::network::format_rate;
use super::sampler::Sampler;
use crate::application::config::AppConfig;
use crate::domain::entities::alert::Alert;
use crate::domain::ports::collector::MetricsSource;
use crate::domain::ports::sink::Sink;
use crate::domain::rules::ThresholdEvaluator;
use crate::domain::value_objects::thresholds::ThresholdSet;

const ALERT_CHANNEL_CAPACITY: usize = 64;

/// Why the controller returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitReason {
    /// Stop signal received.
    Stopped,
    /// Sampling failed too many times in a row.
    SamplerFailed,
}

/// Summary returned by `Controller::run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub reason: ExitReason,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub stats: MonitorStats,
}

#[derive(Debug, Default)]
struct ExportTally {
    rows: u64,
    failures: u64,
}

/// Owns the tick loop and the export loop and tears both down in order.
pub struct Controller {
    tick_period: Duration,
    flush_period: Duration,
    monitor: MonitorService,
    exporter: Option<Arc<Exporter>>,
    sink: Arc<dyn Sink>,
    alerts: broadcast::Sender<Alert>,
}

impl Controller {
    /// Wire the engine from a validated configuration. `exporter` is ignored
    /// when CSV export is disabled.
    #[must_use]
    pub fn new(
        config: &AppConfig,
        source: Arc<dyn MetricsSource>,
        sink: Arc<dyn Sink>,
        exporter: Option<Arc<Exporter>>,
    ) -> Self {
        let exporter = exporter.filter(|_| config.data_export.enable_csv_export);
        let (alerts, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);

        let monitor = MonitorService::new(
            Sampler::new(source, config.sample_budget()),
            ThresholdEvaluator::default(),
            ThresholdSet::from(config),
            AlertManager::new(AlertPolicy::from(&config.alert_settings)),
            Arc::clone(&sink),
            alerts.clone(),
            exporter.clone(),
        );

        Self {
            tick_period: config.tick_period(),
            flush_period: config.data_export.flush_period(),
            monitor,
            exporter,
            sink,
            alerts,
        }
    }

    /// Fired alerts, for external delivery channels (email, sound).
    #[must_use]
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
        self.alerts.subscribe()
    }

    /// Run until `shutdown` turns true (or its sender goes away) or the
    /// sampler gives up. The stop signal is observed between ticks only.
    /// On exit the export loop is stopped, remaining snapshots are flushed
    /// and the sink is closed.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> RunReport {
        let started_at = Utc::now();
        tracing::info!(
            "Monitoring started (tick every {}s, export {})",
            self.tick_period.as_secs(),
            if self.exporter.is_some() {
                format!("every {}s", self.flush_period.as_secs())
            } else {
                "disabled".to_string()
            }
        );

        let (stop_export, export_stopped) = watch::channel(false);
        let export_task: Option<JoinHandle<ExportTally>> = self.exporter.as_ref().map(|exporter| {
            tokio::spawn(export_loop(
                Arc::clone(exporter),
                self.flush_period,
                export_stopped,
            ))
        });

        let mut ticker = tokio::time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let reason = loop {
            if *shutdown.borrow_and_update() {
                break ExitReason::Stopped;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        tracing::debug!("Shutdown sender dropped");
                        break ExitReason::Stopped;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let tick_started = Instant::now();
            if let Err(e) = self.monitor.run_once().await {
                tracing::error!("Stopping: {e}");
                break ExitReason::SamplerFailed;
            }

            let elapsed = tick_started.elapsed();
            if elapsed > self.tick_period {
                self.monitor.record_overrun();
                tracing::warn!(
                    "Tick overran its {}s interval ({} ms), next tick starts immediately",
                    self.tick_period.as_secs(),
                    elapsed.as_millis()
                );
            }
        };

        let mut stats = self.monitor.stats().clone();
        let _ = stop_export.send(true);
        if let Some(task) = export_task {
            match task.await {
                Ok(tally) => {
                    stats.snapshots_exported += tally.rows;
                    stats.export_failures += tally.failures;
                }
                Err(e) => tracing::warn!("Export loop ended abnormally: {e}"),
            }
        }

        if let Some(exporter) = &self.exporter {
            let mut tally = ExportTally::default();
            flush_once(exporter, &mut tally).await;
            stats.snapshots_exported += tally.rows;
            stats.export_failures += tally.failures;
            if !exporter.is_empty() {
                tracing::error!(
                    "{} snapshot(s) could not be exported before exit",
                    exporter.len()
                );
            }
        }

        let stopped_at = Utc::now();
        log_summary(reason, &stats, started_at, stopped_at);

        if let Err(e) = self.sink.close() {
            tracing::warn!("Failed to close log sink: {e}");
        }

        RunReport {
            reason,
            started_at,
            stopped_at,
            stats,
        }
    }
}

async fn export_loop(
    exporter: Arc<Exporter>,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) -> ExportTally {
    let mut tally = ExportTally::default();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = ticker.tick() => flush_once(&exporter, &mut tally).await,
        }
    }
    tally
}

async fn flush_once(exporter: &Arc<Exporter>, tally: &mut ExportTally) {
    let exporter = Arc::clone(exporter);
    match tokio::task::spawn_blocking(move || exporter.flush()).await {
        Ok(Ok(report)) => {
            tally.rows += report.rows as u64;
            if let Some(path) = report.path {
                tracing::info!(
                    "Exported {} snapshot(s) to {}",
                    report.rows,
                    path.display()
                );
            }
        }
        Ok(Err(e)) => {
            tally.failures += 1;
            tracing::warn!("CSV export failed, rows kept for next cycle: {e}");
        }
        Err(e) => {
            tally.failures += 1;
            tracing::warn!("CSV export task failed: {e}");
        }
    }
}

fn log_summary(
    reason: ExitReason,
    stats: &MonitorStats,
    started_at: DateTime<Utc>,
    stopped_at: DateTime<Utc>,
) {
    let uptime = stopped_at.signed_duration_since(started_at);
    tracing::info!(
        "Monitoring stopped ({reason:?}) after {}s: {} ticks, {} skipped, {} overruns, \
         {} breaches, {} alerts, {} rows exported, {} export failures",
        uptime.num_seconds(),
        stats.ticks_completed,
        stats.ticks_skipped,
        stats.overruns,
        stats.breaches,
        stats.alerts_fired,
        stats.snapshots_exported,
        stats.export_failures,
    );
    tracing::info!(
        "CPU {} | memory {} | disk {} | network {}",
        describe(&stats.cpu_percent, |v| format!("{v:.1}%")),
        describe(&stats.memory_percent, |v| format!("{v:.1}%")),
        describe(&stats.disk_percent, |v| format!("{v:.1}%")),
        describe(&stats.network_bytes_per_sec, format_rate),
    );
}

fn describe(summary: &MetricSummary, fmt: impl Fn(f64) -> String) -> String {
    match summary.average() {
        Some(avg) => format!(
            "min {} / avg {} / max {}",
            fmt(summary.min),
            fmt(avg),
            fmt(summary.max)
        ),
        None => "no samples".to_string(),
    }
}
