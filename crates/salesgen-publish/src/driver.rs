use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use salesgen_generate::{BatchGenerator, BatchReport, Clock};

use crate::error::PublishError;
use crate::keys::{RunStamp, object_key};
use crate::settings::{
    ENV_BAD_RATE, ENV_BUCKET, ENV_EVENTS_PER_FILE, ENV_FILES, ENV_PREFIX, ENV_REGION, Settings,
    SettingsOverrides,
};
use crate::store::ObjectStore;
use crate::uploader::{UploadReceipt, upload_batch};

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub timestamp: String,
    pub date: String,
    pub objects: Vec<UploadReceipt>,
    pub totals: BatchReport,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

/// Generates `files` batches and uploads each one in turn.
///
/// The first failed upload aborts the run; batches already written stay in
/// the store.
pub struct Driver {
    settings: Settings,
    store: Arc<dyn ObjectStore>,
    clock: Clock,
    stamp: Option<RunStamp>,
}

impl Driver {
    pub fn new(settings: Settings, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            settings,
            store,
            clock: Clock::System,
            stamp: None,
        }
    }

    /// Pin `event_ts` for every generated event.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Pin the run stamp instead of reading the clock when the run starts.
    pub fn with_stamp(mut self, stamp: RunStamp) -> Self {
        self.stamp = Some(stamp);
        self
    }

    /// Settings banner printed before generation starts.
    pub fn banner(&self) -> String {
        let settings = &self.settings;
        let rows = [
            (ENV_REGION, settings.region.clone()),
            (ENV_BUCKET, settings.bucket.clone()),
            (ENV_PREFIX, settings.prefix.clone()),
            (ENV_FILES, settings.files.to_string()),
            (ENV_EVENTS_PER_FILE, settings.events_per_file.to_string()),
            (
                ENV_BAD_RATE,
                format!("{} (e.g., 0.05 = 5%)", settings.bad_rate),
            ),
        ];

        let mut banner = String::from("=== Generator Settings ===\n");
        for (label, value) in rows {
            banner.push_str(&format!("{label:<17}: {value}\n"));
        }
        banner.push_str("==========================\n");
        banner
    }

    /// Run to completion, writing the banner and confirmations to stdout.
    pub async fn run(&self) -> Result<RunSummary, PublishError> {
        self.run_with_console(&mut std::io::stdout()).await
    }

    /// Run to completion, writing the banner and confirmations to `console`.
    pub async fn run_with_console(
        &self,
        console: &mut (dyn Write + Send),
    ) -> Result<RunSummary, PublishError> {
        let start = Instant::now();
        let settings = &self.settings;
        let stamp = self.stamp.clone().unwrap_or_else(RunStamp::now);
        let run_id = uuid::Uuid::new_v4().to_string();

        console
            .write_all(self.banner().as_bytes())
            .map_err(PublishError::Console)?;

        info!(
            event = "run_started",
            run_id = %run_id,
            bucket = %settings.bucket,
            prefix = %settings.prefix,
            files = settings.files,
            events_per_file = settings.events_per_file,
            bad_rate = settings.bad_rate.value(),
            seed = ?settings.seed
        );

        let mut generator =
            BatchGenerator::new(settings.generate_options()).with_clock(self.clock);
        let mut objects = Vec::with_capacity(settings.files as usize);
        let mut totals = BatchReport::default();
        let mut bytes_written = 0_u64;

        for index in 1..=settings.files {
            let batch = generator.generate(settings.events_per_file);
            let key = object_key(&settings.prefix, &stamp, index);

            let receipt = match upload_batch(
                self.store.as_ref(),
                &key,
                &batch.events,
                settings.upload_timeout,
            )
            .await
            {
                Ok(receipt) => receipt,
                Err(err) => {
                    error!(
                        event = "run_failed",
                        run_id = %run_id,
                        batch = index,
                        key = %key,
                        error = %err
                    );
                    return Err(err.into());
                }
            };

            writeln!(
                console,
                "Uploaded: {} ({} events)",
                receipt.location, receipt.events
            )
            .map_err(PublishError::Console)?;
            info!(
                event = "batch_uploaded",
                run_id = %run_id,
                batch = index,
                key = %receipt.key,
                events = receipt.events,
                corrupted = batch.report.corrupted,
                bytes = receipt.bytes
            );

            totals.merge(&batch.report);
            bytes_written += receipt.bytes as u64;
            objects.push(receipt);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            event = "run_finished",
            status = "success",
            run_id = %run_id,
            objects = objects.len(),
            events = totals.events,
            corrupted = totals.corrupted,
            duration_ms
        );

        Ok(RunSummary {
            run_id,
            timestamp: stamp.timestamp().to_string(),
            date: stamp.date().to_string(),
            objects,
            totals,
            bytes_written,
            duration_ms,
        })
    }
}

/// Resolve `layers`, open a store for the resolved settings, then run with
/// stdout as the console.
///
/// `open_store` is only called once the settings are valid, so a
/// configuration error never reaches a store.
pub async fn publish<F, Fut>(
    layers: SettingsOverrides,
    open_store: F,
) -> Result<RunSummary, PublishError>
where
    F: FnOnce(&Settings) -> Fut,
    Fut: Future<Output = Arc<dyn ObjectStore>>,
{
    let settings = Settings::resolve(layers)?;
    let store = open_store(&settings).await;
    Driver::new(settings, store).run().await
}
