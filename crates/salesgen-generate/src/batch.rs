use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use salesgen_core::SalesEvent;

use crate::corruption::CorruptionEngine;
use crate::factory::{Clock, EventFactory};
use crate::model::{BatchReport, GenerateOptions};

/// Events of one batch, in generation order.
#[derive(Debug, Clone)]
pub struct GeneratedBatch {
    pub events: Vec<SalesEvent>,
    pub report: BatchReport,
}

/// Produces batches of sales events, corrupting each with probability `bad_rate`.
///
/// The RNG lives for the whole generator, so consecutive batches of a seeded
/// run are reproducible.
#[derive(Debug, Clone)]
pub struct BatchGenerator {
    options: GenerateOptions,
    factory: EventFactory,
    engine: CorruptionEngine,
    rng: ChaCha8Rng,
}

impl BatchGenerator {
    pub fn new(options: GenerateOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Self {
            options,
            factory: EventFactory::default(),
            engine: CorruptionEngine,
            rng,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.factory = EventFactory::new(clock);
        self
    }

    pub fn generate(&mut self, count: usize) -> GeneratedBatch {
        let bad_rate = self.options.bad_rate.value();
        let mut events = Vec::with_capacity(count);
        let mut report = BatchReport::default();

        for _ in 0..count {
            let mut event = self.factory.build(&mut self.rng);
            if self.rng.random::<f64>() < bad_rate {
                let mode = self.engine.corrupt(&mut event, &mut self.rng);
                report.record_defect(mode);
            } else {
                report.record_clean();
            }
            events.push(event);
        }

        debug!(
            event = "batch_generated",
            events = report.events,
            corrupted = report.corrupted
        );

        GeneratedBatch { events, report }
    }
}
