#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use hostwatch::application::config::AppConfig;
use hostwatch::application::services::controller::{Controller, ExitReason};
use hostwatch::application::services::exporter::Exporter;
use hostwatch::domain::entities::snapshot::{CpuInfo, MemoryInfo, Snapshot};
use hostwatch::domain::ports::collector::{CollectionError, MetricsSource};
use hostwatch::domain::ports::sink::{Sink, SinkError};
use hostwatch::domain::value_objects::log_level::LogLevel;
use hostwatch::infrastructure::export::CsvSnapshotWriter;
use hostwatch::presentation::cli::commands::daemon::run_until;
use tokio::sync::watch;

struct HotCpuSource {
    calls: AtomicUsize,
}

impl MetricsSource for HotCpuSource {
    fn sample(&self) -> Result<Snapshot, CollectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Snapshot {
            timestamp: Utc::now(),
            cpu: CpuInfo {
                global_usage_percent: 97.0,
                per_core_usage: vec![97.0, 97.0],
            },
            memory: MemoryInfo {
                usage_percent: 20.0,
                used_bytes: 2,
                total_bytes: 10,
            },
            disks: vec![],
            networks: vec![],
            processes: vec![],
        })
    }
}

struct DeadSource;

impl MetricsSource for DeadSource {
    fn sample(&self) -> Result<Snapshot, CollectionError> {
        Err(CollectionError::MetricsUnavailable("no /proc".into()))
    }
}

#[derive(Default)]
struct RecordingSink {
    lines: Mutex<Vec<(LogLevel, String)>>,
    closed: AtomicBool,
}

impl Sink for RecordingSink {
    fn write(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SinkError::Closed);
        }
        self.lines
            .lock()
            .expect("sink lock")
            .push((level, message.to_string()));
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn config_with_export(dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.monitor_interval = 1;
    config.data_export.enable_csv_export = true;
    config.data_export.export_interval = 60;
    config.data_export.csv_directory = dir.display().to_string();
    config
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_signal_flushes_exports_and_closes_sink() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = config_with_export(dir.path());
    let source = Arc::new(HotCpuSource {
        calls: AtomicUsize::new(0),
    });
    let sink = Arc::new(RecordingSink::default());
    let exporter = Arc::new(Exporter::new(Box::new(CsvSnapshotWriter::new(
        config.data_export.directory(),
    ))));

    let controller = Controller::new(
        &config,
        Arc::clone(&source) as Arc<dyn MetricsSource>,
        Arc::clone(&sink) as Arc<dyn Sink>,
        Some(Arc::clone(&exporter)),
    );
    let mut alerts = controller.subscribe_alerts();

    let report = tokio::time::timeout(
        Duration::from_secs(10),
        run_until(controller, tokio::time::sleep(Duration::from_millis(1500))),
    )
    .await
    .expect("controller stops in time");

    assert_eq!(report.reason, ExitReason::Stopped);
    assert!(report.stats.ticks_completed >= 2);
    assert_eq!(
        report.stats.ticks_completed,
        source.calls.load(Ordering::SeqCst) as u64
    );

    // cpu stays hot, the 300 s cooldown lets exactly one alert through
    assert_eq!(report.stats.alerts_fired, 1);
    let alert = alerts.recv().await.expect("published alert");
    assert!(alert.message.contains("cpu on global"));
    {
        let lines = sink.lines.lock().expect("sink lock");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, LogLevel::Error);
    }
    assert!(sink.closed.load(Ordering::SeqCst));

    // the export interval never elapsed: everything came from the final flush
    assert!(exporter.is_empty());
    assert_eq!(report.stats.snapshots_exported, report.stats.ticks_completed);
    let files: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read export dir")
        .collect::<Result<_, _>>()
        .expect("dir entries");
    assert_eq!(files.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn three_failed_samples_end_the_run() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = config_with_export(dir.path());
    let sink = Arc::new(RecordingSink::default());
    let controller = Controller::new(
        &config,
        Arc::new(DeadSource),
        Arc::clone(&sink) as Arc<dyn Sink>,
        None,
    );

    let (_stop_tx, stop_rx) = watch::channel(false);
    let report = tokio::time::timeout(Duration::from_secs(10), controller.run(stop_rx))
        .await
        .expect("controller gives up in time");

    assert_eq!(report.reason, ExitReason::SamplerFailed);
    assert_eq!(report.stats.ticks_completed, 0);
    assert_eq!(report.stats.ticks_skipped, 3);
    assert!(sink.closed.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_before_first_tick_still_closes_cleanly() {
    let sink = Arc::new(RecordingSink::default());
    let mut config = AppConfig::default();
    config.data_export.enable_csv_export = false;
    let controller = Controller::new(
        &config,
        Arc::new(DeadSource),
        Arc::clone(&sink) as Arc<dyn Sink>,
        None,
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    stop_tx.send(true).expect("receiver alive");
    let report = controller.run(stop_rx).await;

    assert_eq!(report.reason, ExitReason::Stopped);
    assert_eq!(report.stats.ticks_skipped, 0);
    assert!(sink.closed.load(Ordering::SeqCst));
}
