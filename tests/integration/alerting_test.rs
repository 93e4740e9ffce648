#![allow(clippy::expect_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use hostwatch::application::config::AppConfig;
use hostwatch::application::services::alert_manager::{AlertManager, AlertPolicy};
use hostwatch::domain::entities::alert::Alert;
use hostwatch::domain::entities::breach::{MetricKind, Scope};
use hostwatch::domain::entities::disk::DiskInfo;
use hostwatch::domain::entities::snapshot::{CpuInfo, MemoryInfo, Snapshot};
use hostwatch::domain::rules::ThresholdEvaluator;
use hostwatch::domain::value_objects::thresholds::ThresholdSet;

const CONFIG: &str = r#"{
    // only the keys the scenario cares about
    "cpu_warning_threshold": 80,
    "memory_warning_threshold": 80,
    "alert_settings": {
        "enable_email_alerts": true,
        "enable_sound_alerts": false,
        "alert_cooldown_seconds": 300 /* five minutes */
    }
}"#;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn snapshot_at(offset_secs: i64, cpu: f64, disks: Vec<DiskInfo>) -> Snapshot {
    Snapshot {
        timestamp: t0() + Duration::seconds(offset_secs),
        cpu: CpuInfo {
            global_usage_percent: cpu,
            per_core_usage: vec![cpu],
        },
        memory: MemoryInfo {
            usage_percent: 30.0,
            used_bytes: 3,
            total_bytes: 10,
        },
        disks,
        networks: vec![],
        processes: vec![],
    }
}

struct Pipeline {
    evaluator: ThresholdEvaluator,
    thresholds: ThresholdSet,
    manager: AlertManager,
}

impl Pipeline {
    fn from_config(text: &str) -> Self {
        let config = AppConfig::parse(text).expect("valid config");
        Self {
            evaluator: ThresholdEvaluator::default(),
            thresholds: ThresholdSet::from(&config),
            manager: AlertManager::new(AlertPolicy::from(&config.alert_settings)),
        }
    }

    fn tick(&mut self, snapshot: &Snapshot) -> Vec<Alert> {
        let breaches = self.evaluator.evaluate(snapshot, &self.thresholds);
        self.manager.handle_all(&breaches)
    }
}

#[test]
fn cooldown_scenario_fires_at_zero_and_after_window() {
    let mut pipeline = Pipeline::from_config(CONFIG);

    let first = pipeline.tick(&snapshot_at(0, 85.0, vec![]));
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].breach.metric_kind, MetricKind::Cpu);

    let second = pipeline.tick(&snapshot_at(10, 90.0, vec![]));
    assert!(second.is_empty(), "fired inside the cooldown window");

    let third = pipeline.tick(&snapshot_at(305, 81.0, vec![]));
    assert_eq!(third.len(), 1);
    assert_eq!(third[0].fired_at, t0() + Duration::seconds(305));
}

#[test]
fn at_most_one_alert_per_window_for_many_breaches() {
    let mut pipeline = Pipeline::from_config(CONFIG);
    let fired: usize = (0..300)
        .map(|s| pipeline.tick(&snapshot_at(s, 99.0, vec![])).len())
        .sum();
    assert_eq!(fired, 1);
    assert_eq!(pipeline.tick(&snapshot_at(300, 99.0, vec![])).len(), 1);
}

#[test]
fn disk_scopes_have_independent_cooldowns() {
    let mut pipeline = Pipeline::from_config(CONFIG);
    let data = DiskInfo::from_space("/data", 100, 5);
    let var = DiskInfo::from_space("/var", 100, 5);

    let first = pipeline.tick(&snapshot_at(0, 10.0, vec![data.clone()]));
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].breach.scope, Scope::Disk("/data".into()));

    // /data is cooling down, /var has never fired
    let second = pipeline.tick(&snapshot_at(20, 10.0, vec![data.clone(), var.clone()]));
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].breach.scope, Scope::Disk("/var".into()));

    // /var firing did not reset /data: its window still ends at t=300
    let third = pipeline.tick(&snapshot_at(300, 10.0, vec![data, var]));
    assert_eq!(third.len(), 1);
    assert_eq!(third[0].breach.scope, Scope::Disk("/data".into()));
}

#[test]
fn cpu_and_disk_in_same_tick_both_fire() {
    let mut pipeline = Pipeline::from_config(CONFIG);
    let alerts = pipeline.tick(&snapshot_at(
        0,
        95.0,
        vec![DiskInfo::from_space("/", 100, 1)],
    ));
    let kinds: Vec<MetricKind> = alerts.iter().map(|a| a.breach.metric_kind).collect();
    assert_eq!(kinds, vec![MetricKind::Cpu, MetricKind::Disk]);
}

#[test]
fn recovery_does_not_alert_and_does_not_reset_cooldown() {
    let mut pipeline = Pipeline::from_config(CONFIG);
    assert_eq!(pipeline.tick(&snapshot_at(0, 85.0, vec![])).len(), 1);
    assert!(pipeline.tick(&snapshot_at(5, 20.0, vec![])).is_empty());
    assert!(pipeline.tick(&snapshot_at(10, 85.0, vec![])).is_empty());
}

#[test]
fn channels_follow_config_not_cooldown() {
    let mut pipeline = Pipeline::from_config(CONFIG);
    let alerts = pipeline.tick(&snapshot_at(0, 85.0, vec![]));
    assert!(alerts[0].channels.email);
    assert!(!alerts[0].channels.sound);
}
