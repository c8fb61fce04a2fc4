mod registry;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use registry::{RegistryError, init_logging, write_summary};
use salesgen_generate::{BadRate, BatchGenerator, GenerateOptions, GenerationError, encode_jsonl};
use salesgen_publish::store::{LocalDirStore, S3Store};
use salesgen_publish::{
    ConfigError, ObjectStore, PublishError, Settings, SettingsOverrides, publish,
};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Publish(#[from] PublishError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "salesgen",
    version,
    about = "Synthetic e-commerce sales events for ingestion testing"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate batches and upload them as JSON Lines objects.
    Run(RunArgs),
    /// Print one batch as JSON Lines to stdout without uploading.
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// TOML file with settings; environment variables and flags override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Destination bucket (S3_BUCKET).
    #[arg(long)]
    bucket: Option<String>,
    /// Region for the S3 client (AWS_REGION).
    #[arg(long)]
    region: Option<String>,
    /// Key prefix for uploaded objects (S3_PREFIX).
    #[arg(long)]
    prefix: Option<String>,
    /// Events per uploaded object (EVENTS_PER_FILE).
    #[arg(long)]
    events_per_file: Option<usize>,
    /// Number of objects to upload (FILES).
    #[arg(long)]
    files: Option<u32>,
    /// Probability that an event is corrupted (BAD_RATE).
    #[arg(long)]
    bad_rate: Option<f64>,
    /// Seed for reproducible batches (GENERATOR_SEED).
    #[arg(long)]
    seed: Option<u64>,
    /// Per-upload timeout in seconds (UPLOAD_TIMEOUT_SECS).
    #[arg(long)]
    upload_timeout_secs: Option<u64>,
    /// Write objects under this directory instead of S3.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Append JSON logs to this file.
    #[arg(long, value_name = "FILE")]
    log_json: Option<PathBuf>,
    /// Write the run summary as JSON to this file.
    #[arg(long, value_name = "FILE")]
    summary_out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Number of events to print.
    #[arg(long, default_value_t = 10)]
    count: usize,
    /// Probability that an event is corrupted.
    #[arg(long, default_value_t = 0.05)]
    bad_rate: f64,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run_upload(args).await,
        Command::Sample(args) => run_sample(args),
    }
}

async fn run_upload(args: RunArgs) -> Result<(), CliError> {
    let RunArgs {
        config,
        bucket,
        region,
        prefix,
        events_per_file,
        files,
        bad_rate,
        seed,
        upload_timeout_secs,
        out_dir,
        log_json,
        summary_out,
    } = args;

    init_logging(log_json.as_deref())?;

    let flags = SettingsOverrides {
        region,
        bucket,
        prefix,
        events_per_file,
        files,
        bad_rate,
        seed,
        upload_timeout_secs,
    };
    let layers = SettingsOverrides::layered(config.as_deref(), flags)?;

    let open_store = |settings: &Settings| {
        let region = settings.region.clone();
        let bucket = settings.bucket.clone();
        async move {
            let store: Arc<dyn ObjectStore> = match out_dir {
                Some(dir) => {
                    tracing::info!(event = "store_selected", store = "local", root = %dir.display());
                    Arc::new(LocalDirStore::new(dir))
                }
                None => {
                    tracing::info!(event = "store_selected", store = "s3", region = %region);
                    Arc::new(S3Store::connect(&region, &bucket).await)
                }
            };
            store
        }
    };

    let summary = publish(layers, open_store).await?;

    if let Some(path) = summary_out {
        write_summary(&path, &summary)?;
        tracing::info!(event = "summary_written", path = %path.display());
    }

    Ok(())
}

fn run_sample(args: SampleArgs) -> Result<(), CliError> {
    init_logging(None)?;

    let mut generator = BatchGenerator::new(GenerateOptions {
        bad_rate: BadRate::new(args.bad_rate)?,
        seed: args.seed,
    });
    let batch = generator.generate(args.count);

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&encode_jsonl(&batch.events)?)?;
    stdout.flush()?;

    tracing::info!(
        event = "sample_generated",
        events = batch.report.events,
        corrupted = batch.report.corrupted
    );
    Ok(())
}
