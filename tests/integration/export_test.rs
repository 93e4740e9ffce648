#![allow(clippy::expect_used)]

use std::path::Path;

use chrono::{Duration, Utc};
use hostwatch::application::services::exporter::Exporter;
use hostwatch::domain::entities::snapshot::{CpuInfo, MemoryInfo, Snapshot};
use hostwatch::domain::ports::export::ExportError;
use hostwatch::infrastructure::export::CsvSnapshotWriter;

fn make_snapshot(i: i64) -> Snapshot {
    #[allow(clippy::cast_precision_loss)]
    let cpu = i as f64;
    Snapshot {
        timestamp: Utc::now() + Duration::seconds(i),
        cpu: CpuInfo {
            global_usage_percent: cpu,
            per_core_usage: vec![cpu; 2],
        },
        memory: MemoryInfo {
            usage_percent: 50.0,
            used_bytes: 512,
            total_bytes: 1024,
        },
        disks: vec![],
        networks: vec![],
        processes: vec![],
    }
}

fn csv_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    reader
        .records()
        .collect::<Result<_, _>>()
        .expect("read records")
}

#[test]
fn flush_writes_exactly_the_buffered_rows() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let exporter = Exporter::new(Box::new(CsvSnapshotWriter::new(dir.path().join("exports"))));

    for i in 0..25 {
        exporter.add(make_snapshot(i));
    }
    let report = exporter.flush().expect("flush");

    assert_eq!(report.rows, 25);
    assert!(exporter.is_empty());
    let path = report.path.expect("csv path");
    let rows = csv_rows(&path);
    assert_eq!(rows.len(), 25);
    assert_eq!(&rows[3][1], "3.0");

    let header = csv::Reader::from_path(&path)
        .expect("open csv")
        .headers()
        .expect("header")
        .clone();
    assert_eq!(&header[0], "timestamp");
    assert!(header.iter().any(|h| h == "memory_percent"));
}

#[test]
fn empty_flush_writes_no_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let target = dir.path().join("exports");
    let exporter = Exporter::new(Box::new(CsvSnapshotWriter::new(&target)));

    let report = exporter.flush().expect("flush");
    assert_eq!(report.rows, 0);
    assert!(report.path.is_none());
    assert!(!target.exists());
}

#[test]
fn failed_flush_keeps_rows_for_the_next_attempt() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let target = dir.path().join("exports");
    // a plain file where the export directory should be
    std::fs::write(&target, b"in the way").expect("create blocker");
    let exporter = Exporter::new(Box::new(CsvSnapshotWriter::new(&target)));

    for i in 0..10 {
        exporter.add(make_snapshot(i));
    }
    let err = exporter.flush().expect_err("directory is a file");
    assert!(matches!(err, ExportError::DirectoryUnavailable(_)));
    assert_eq!(exporter.len(), 10);

    // still failing, more rows arrive in between
    for i in 10..15 {
        exporter.add(make_snapshot(i));
    }
    assert!(exporter.flush().is_err());
    assert_eq!(exporter.len(), 15);

    std::fs::remove_file(&target).expect("remove blocker");
    let report = exporter.flush().expect("flush after recovery");
    assert_eq!(report.rows, 15);
    assert!(exporter.is_empty());

    let rows = csv_rows(&report.path.expect("csv path"));
    let cpus: Vec<&str> = rows.iter().map(|r| &r[1]).collect();
    let expected: Vec<String> = (0..15).map(|i| format!("{i}.0")).collect();
    assert_eq!(cpus, expected);
}

#[test]
fn consecutive_flushes_write_separate_files() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let exporter = Exporter::new(Box::new(CsvSnapshotWriter::new(dir.path())));

    exporter.add(make_snapshot(1));
    let first = exporter.flush().expect("first flush").path.expect("path");
    exporter.add(make_snapshot(2));
    let second = exporter.flush().expect("second flush").path.expect("path");

    assert_ne!(first, second);
    assert_eq!(csv_rows(&first).len(), 1);
    assert_eq!(csv_rows(&second).len(), 1);
}
