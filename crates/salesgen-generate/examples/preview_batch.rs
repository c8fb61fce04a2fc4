use std::env;
use std::io::Write;

use salesgen_generate::{BadRate, BatchGenerator, GenerateOptions, encode_jsonl};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let mut count = 5_usize;
    let mut bad_rate = 0.5_f64;
    let mut seed: Option<u64> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--count" => count = args.next().ok_or("missing --count value")?.parse()?,
            "--bad-rate" => bad_rate = args.next().ok_or("missing --bad-rate value")?.parse()?,
            "--seed" => seed = Some(args.next().ok_or("missing --seed value")?.parse()?),
            _ => return Err(format!("unexpected argument '{arg}'").into()),
        }
    }

    let mut generator = BatchGenerator::new(GenerateOptions {
        bad_rate: BadRate::new(bad_rate)?,
        seed,
    });
    let batch = generator.generate(count);

    std::io::stdout().write_all(&encode_jsonl(&batch.events)?)?;
    eprintln!("{}", serde_json::to_string(&batch.report)?);
    Ok(())
}
