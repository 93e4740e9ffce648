#![allow(clippy::expect_used)]

use hostwatch::domain::entities::breach::{Breach, MetricKind, Scope};
use hostwatch::domain::entities::snapshot::Snapshot;
use hostwatch::domain::rules::ThresholdEvaluator;
use hostwatch::domain::value_objects::severity::Severity;
use hostwatch::domain::value_objects::thresholds::ThresholdSet;

fn load_fixture(name: &str) -> Snapshot {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let json = std::fs::read_to_string(&path).expect("Failed to read fixture");
    serde_json::from_str(&json).expect("Failed to parse fixture")
}

fn keys(breaches: &[Breach]) -> Vec<(MetricKind, Scope)> {
    breaches.iter().map(Breach::key).collect()
}

#[test]
fn normal_snapshot_has_no_breach() {
    let snapshot = load_fixture("snapshot_normal.json");
    let breaches = ThresholdEvaluator::default().evaluate(&snapshot, &ThresholdSet::default());
    assert!(breaches.is_empty(), "unexpected breaches: {breaches:?}");
}

#[test]
fn busy_snapshot_breaches_in_evaluation_order() {
    let snapshot = load_fixture("snapshot_busy.json");
    let breaches = ThresholdEvaluator::default().evaluate(&snapshot, &ThresholdSet::default());

    assert_eq!(
        keys(&breaches),
        vec![
            (MetricKind::Cpu, Scope::Global),
            (MetricKind::Memory, Scope::Global),
            (MetricKind::Disk, Scope::Disk("/data".into())),
            (MetricKind::Disk, Scope::Disk("/var".into())),
            (MetricKind::Network, Scope::Interface("eth0".into())),
            (MetricKind::ProcessCpu, Scope::Process(300)),
            (MetricKind::ProcessCpu, Scope::Process(120)),
            (MetricKind::ProcessMemory, Scope::Process(50)),
            (MetricKind::ProcessMemory, Scope::Process(120)),
        ]
    );
}

#[test]
fn busy_snapshot_severities() {
    let snapshot = load_fixture("snapshot_busy.json");
    let breaches = ThresholdEvaluator::default().evaluate(&snapshot, &ThresholdSet::default());
    let severities: Vec<Severity> = breaches.iter().map(|b| b.severity).collect();

    assert_eq!(
        &severities[..5],
        &[
            Severity::Critical, // cpu 92 vs critical from 90
            Severity::Warning,  // memory 85
            Severity::Critical, // /data 95 vs critical from 95
            Severity::Warning,  // /var 91
            Severity::Critical, // eth0 at twice the limit
        ]
    );
}

#[test]
fn breaches_carry_snapshot_timestamp_and_labels() {
    let snapshot = load_fixture("snapshot_busy.json");
    let breaches = ThresholdEvaluator::default().evaluate(&snapshot, &ThresholdSet::default());
    assert!(breaches.iter().all(|b| b.timestamp == snapshot.timestamp));

    let build = breaches
        .iter()
        .find(|b| b.scope == Scope::Process(300))
        .expect("build process breach");
    assert_eq!(build.label.as_deref(), Some("build"));
    assert!(build.describe().contains("build (pid 300)"));
}

#[test]
fn value_equal_to_threshold_is_a_breach() {
    let mut snapshot = load_fixture("snapshot_normal.json");
    snapshot.cpu.global_usage_percent = 80.0;
    let breaches = ThresholdEvaluator::default().evaluate(&snapshot, &ThresholdSet::default());
    assert_eq!(keys(&breaches), vec![(MetricKind::Cpu, Scope::Global)]);

    snapshot.cpu.global_usage_percent = 79.99;
    let breaches = ThresholdEvaluator::default().evaluate(&snapshot, &ThresholdSet::default());
    assert!(breaches.is_empty());
}

#[test]
fn custom_thresholds_apply() {
    let snapshot = load_fixture("snapshot_normal.json");
    let thresholds = ThresholdSet {
        disk: 30.0,
        ..ThresholdSet::default()
    };
    let breaches = ThresholdEvaluator::default().evaluate(&snapshot, &thresholds);
    assert_eq!(
        keys(&breaches),
        vec![
            (MetricKind::Disk, Scope::Disk("/".into())),
            (MetricKind::Disk, Scope::Disk("/home".into())),
        ]
    );
}
