use std::io::{self, Write};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use salesgen_core::{staging_violations, validate_clean_event};
use salesgen_generate::{Clock, decode_jsonl};
use salesgen_publish::store::MemoryStore;
use salesgen_publish::{
    ConfigError, Driver, ObjectStore, PublishError, RunStamp, Settings, SettingsOverrides,
    UploadError, publish,
};

fn stamp() -> RunStamp {
    RunStamp::at(Utc.with_ymd_and_hms(2024, 11, 2, 18, 30, 0).unwrap())
}

fn settings(events_per_file: usize, files: u32, bad_rate: f64) -> Settings {
    Settings::resolve(SettingsOverrides {
        bucket: Some("sales-landing".to_string()),
        events_per_file: Some(events_per_file),
        files: Some(files),
        bad_rate: Some(bad_rate),
        seed: Some(2024),
        ..SettingsOverrides::default()
    })
    .expect("valid settings")
}

fn driver(settings: Settings, store: Arc<MemoryStore>) -> Driver {
    let ts = Utc.with_ymd_and_hms(2024, 11, 2, 18, 30, 0).unwrap();
    Driver::new(settings, store)
        .with_stamp(stamp())
        .with_clock(Clock::Fixed(ts))
}

#[tokio::test]
async fn clean_run_uploads_one_object_of_clean_events() {
    let store = Arc::new(MemoryStore::new());
    let mut console = Vec::new();

    let summary = driver(settings(50, 1, 0.0), store.clone())
        .run_with_console(&mut console)
        .await
        .expect("run");

    let key = "raw/sales/dt=20241102/sales_20241102T183000Z_1.jsonl";
    assert_eq!(store.keys(), vec![key.to_string()]);
    assert_eq!(summary.totals.events, 50);
    assert_eq!(summary.totals.corrupted, 0);

    let events = decode_jsonl(&store.get(key).expect("object")).expect("decode");
    assert_eq!(events.len(), 50);
    for event in &events {
        validate_clean_event(event).expect("clean event");
    }

    let console = String::from_utf8(console).expect("utf-8");
    assert!(console.contains(&format!("Uploaded: memory://{key} (50 events)")));
}

#[tokio::test]
async fn uploads_every_batch_under_shared_stamp() {
    let store = Arc::new(MemoryStore::new());
    let summary = driver(settings(20, 3, 0.5), store.clone())
        .run_with_console(&mut std::io::sink())
        .await
        .expect("run");

    let expected: Vec<String> = (1..=3)
        .map(|index| format!("raw/sales/dt=20241102/sales_20241102T183000Z_{index}.jsonl"))
        .collect();
    assert_eq!(store.keys(), expected);
    assert_eq!(summary.objects.len(), 3);
    assert_eq!(summary.timestamp, "20241102T183000Z");
    assert_eq!(summary.date, "20241102");
    assert_eq!(summary.totals.events, 60);
    assert_eq!(
        summary.bytes_written,
        summary.objects.iter().map(|o| o.bytes as u64).sum::<u64>()
    );
}

#[tokio::test]
async fn fully_corrupted_run_marks_every_event() {
    let store = Arc::new(MemoryStore::new());
    driver(settings(10, 1, 1.0), store.clone())
        .run_with_console(&mut std::io::sink())
        .await
        .expect("run");

    let key = "raw/sales/dt=20241102/sales_20241102T183000Z_1.jsonl";
    let events = decode_jsonl(&store.get(key).expect("object")).expect("decode");
    assert_eq!(events.len(), 10);
    for event in &events {
        assert_eq!(staging_violations(event).len(), 1);
    }
}

#[tokio::test]
async fn first_failed_upload_aborts_run() {
    let store = Arc::new(MemoryStore::new().failing_from(2));
    let err = driver(settings(5, 4, 0.0), store.clone())
        .run_with_console(&mut std::io::sink())
        .await
        .unwrap_err();

    match err {
        PublishError::Upload(UploadError::Rejected { key, .. }) => {
            assert_eq!(key, "raw/sales/dt=20241102/sales_20241102T183000Z_2.jsonl");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.attempts(), 2);
    assert_eq!(store.keys().len(), 1);
}

#[tokio::test]
async fn zero_sized_batches_upload_newline_only_objects() {
    let store = Arc::new(MemoryStore::new());
    driver(settings(0, 2, 0.05), store.clone())
        .run_with_console(&mut std::io::sink())
        .await
        .expect("run");

    for key in store.keys() {
        assert_eq!(store.get(&key), Some(b"\n".to_vec()));
    }
    assert_eq!(store.attempts(), 2);
}

fn open(
    store: &Arc<MemoryStore>,
) -> impl FnOnce(&Settings) -> std::future::Ready<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = store.clone();
    move |_| std::future::ready(store)
}

#[tokio::test]
async fn missing_bucket_fails_before_any_upload() {
    let store = Arc::new(MemoryStore::new());
    let layers = SettingsOverrides::from_lookup(|key| match key {
        "FILES" => Some("3".to_string()),
        _ => None,
    })
    .expect("parse env");

    let err = publish(layers, open(&store)).await.unwrap_err();

    assert!(matches!(
        err,
        PublishError::Config(ConfigError::Missing { key: "S3_BUCKET" })
    ));
    assert_eq!(store.attempts(), 0);
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn publish_uploads_through_the_opened_store() {
    let store = Arc::new(MemoryStore::new());
    let layers = SettingsOverrides {
        bucket: Some("sales-landing".to_string()),
        prefix: Some("landing".to_string()),
        events_per_file: Some(3),
        files: Some(2),
        seed: Some(4),
        ..SettingsOverrides::default()
    };

    let summary = publish(layers, open(&store)).await.expect("run");

    assert_eq!(store.attempts(), 2);
    assert_eq!(summary.objects.len(), 2);
    assert!(store.keys().iter().all(|key| key.starts_with("landing/dt=")));
}

struct ClosedConsole;

impl Write for ClosedConsole {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn closed_console_stops_the_run() {
    let store = Arc::new(MemoryStore::new());
    let err = driver(settings(5, 2, 0.0), store.clone())
        .run_with_console(&mut ClosedConsole)
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Console(_)));
    assert_eq!(store.attempts(), 0);
}

#[test]
fn banner_keeps_decimal_point_for_whole_rates() {
    let banner = driver(settings(10, 1, 0.0), Arc::new(MemoryStore::new())).banner();
    assert!(banner.contains("BAD_RATE         : 0.0 (e.g., 0.05 = 5%)\n"));

    let banner = driver(settings(10, 1, 1.0), Arc::new(MemoryStore::new())).banner();
    assert!(banner.contains("BAD_RATE         : 1.0 (e.g., 0.05 = 5%)\n"));
}

#[test]
fn banner_lists_settings() {
    let banner = driver(settings(200, 5, 0.05), Arc::new(MemoryStore::new())).banner();
    let expected = "\
=== Generator Settings ===
AWS_REGION       : us-east-2
S3_BUCKET        : sales-landing
S3_PREFIX        : raw/sales
FILES            : 5
EVENTS_PER_FILE  : 200
BAD_RATE         : 0.05 (e.g., 0.05 = 5%)
==========================
";
    assert_eq!(banner, expected);
}
