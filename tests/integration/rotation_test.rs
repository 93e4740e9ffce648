#![allow(clippy::expect_used)]

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use hostwatch::domain::ports::sink::Sink;
use hostwatch::domain::value_objects::log_level::LogLevel;
use hostwatch::domain::value_objects::rotation::{BYTES_PER_MB, RotationPolicy};
use hostwatch::infrastructure::sinks::LogRotator;

const ENTRY_LEN: usize = 1024;
/// 1.5 MiB of 1 KiB entries
const ENTRIES_PER_ROUND: usize = 1536;

/// A 1 KiB line whose first 8 bytes identify it.
fn entry(id: usize) -> Vec<u8> {
    let mut line = format!("{id:08}").into_bytes();
    line.resize(ENTRY_LEN - 1, b'.');
    line.push(b'\n');
    line
}

fn ids_in(path: &Path) -> Vec<usize> {
    if !path.exists() {
        return Vec::new();
    }
    std::fs::read_to_string(path)
        .expect("read log file")
        .lines()
        .map(|l| l[..8].parse().expect("line id"))
        .collect()
}

fn write_round(rotator: &LogRotator, first_id: usize) {
    for id in first_id..first_id + ENTRIES_PER_ROUND {
        rotator.write_entry(&entry(id)).expect("write entry");
    }
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).expect("metadata").len()
}

#[test]
fn one_and_a_half_megabytes_twice() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let log = dir.path().join("monitor.log");
    let rotator =
        LogRotator::open(&log, RotationPolicy::from_megabytes(1, 2)).expect("open rotator");

    write_round(&rotator, 0);
    assert!(file_len(&log) <= BYTES_PER_MB);
    assert!(rotator.backup_path(1).exists());
    assert!(!rotator.backup_path(2).exists());
    assert_eq!(rotator.rotations().expect("rotations"), 1);

    write_round(&rotator, ENTRIES_PER_ROUND);
    assert!(file_len(&log) <= BYTES_PER_MB);
    assert!(rotator.backup_path(1).exists());
    assert!(rotator.backup_path(2).exists());
    assert!(!rotator.backup_path(3).exists());

    // oldest content first: .2, .1, active
    let mut all = ids_in(&rotator.backup_path(2));
    all.extend(ids_in(&rotator.backup_path(1)));
    all.extend(ids_in(&log));
    let expected: Vec<usize> = (0..2 * ENTRIES_PER_ROUND).collect();
    assert_eq!(all, expected, "a line was lost or duplicated");
}

#[test]
fn saturated_backups_drop_the_oldest() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let log = dir.path().join("monitor.log");
    let rotator =
        LogRotator::open(&log, RotationPolicy::from_megabytes(1, 2)).expect("open rotator");

    write_round(&rotator, 0);
    write_round(&rotator, ENTRIES_PER_ROUND);
    let discarded = ids_in(&rotator.backup_path(2));
    assert!(!discarded.is_empty());

    let mut next = 2 * ENTRIES_PER_ROUND;
    while rotator.rotations().expect("rotations") < 3 {
        rotator.write_entry(&entry(next)).expect("write entry");
        next += 1;
    }

    assert!(!rotator.backup_path(3).exists());
    let mut kept = ids_in(&rotator.backup_path(2));
    kept.extend(ids_in(&rotator.backup_path(1)));
    kept.extend(ids_in(&log));
    assert!(discarded.iter().all(|id| !kept.contains(id)));
    let expected: Vec<usize> = (discarded.len()..next).collect();
    assert_eq!(kept, expected);
}

#[test]
fn zero_backups_truncates_in_place() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let log = dir.path().join("monitor.log");
    let rotator =
        LogRotator::open(&log, RotationPolicy::from_megabytes(1, 0)).expect("open rotator");

    write_round(&rotator, 0);
    assert!(file_len(&log) <= BYTES_PER_MB);
    assert!(!rotator.backup_path(1).exists());
    // 1025 entries overflow the limit, the rest start a fresh file
    assert_eq!(ids_in(&log), (1025..ENTRIES_PER_ROUND).collect::<Vec<_>>());
}

#[test]
fn concurrent_writers_lose_nothing_across_rotations() {
    const WRITERS: usize = 4;
    const PER_WRITER: usize = 768;

    let dir = tempfile::tempdir().expect("create temp dir");
    let log = dir.path().join("monitor.log");
    let rotator = Arc::new(
        LogRotator::open(&log, RotationPolicy::from_megabytes(1, 5)).expect("open rotator"),
    );

    let handles: Vec<_> = (0..WRITERS)
        .map(|w| {
            let rotator = Arc::clone(&rotator);
            std::thread::spawn(move || {
                for i in 0..PER_WRITER {
                    rotator
                        .write_entry(&entry(w * PER_WRITER + i))
                        .expect("write entry");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread");
    }

    assert!(rotator.rotations().expect("rotations") >= 2);
    let mut seen = BTreeSet::new();
    let mut total = 0;
    for path in (1..=5)
        .map(|i| rotator.backup_path(i))
        .chain(std::iter::once(log.clone()))
    {
        for id in ids_in(&path) {
            total += 1;
            seen.insert(id);
        }
    }
    assert_eq!(total, WRITERS * PER_WRITER, "duplicated lines");
    assert_eq!(seen.len(), WRITERS * PER_WRITER, "lost lines");
}

#[test]
fn sink_lines_use_log_format_and_close_rejects_writes() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let log = dir.path().join("logs").join("monitor.log");
    let rotator = LogRotator::open(&log, RotationPolicy::default()).expect("open rotator");

    rotator
        .write(LogLevel::Warning, "WARNING cpu on global: 85.0% >= 80.0%")
        .expect("sink write");
    rotator.close().expect("close");
    assert!(rotator.write(LogLevel::Info, "late").is_err());

    let content = std::fs::read_to_string(&log).expect("read log");
    let line = content.lines().next().expect("one line");
    // YYYY-MM-DD HH:MM:SS - LEVEL - message
    assert_eq!(&line[4..5], "-");
    assert_eq!(&line[19..], " - WARNING - WARNING cpu on global: 85.0% >= 80.0%");
}
