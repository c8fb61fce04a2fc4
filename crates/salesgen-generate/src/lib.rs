//! Sales event generation for salesgen.
//!
//! Builds clean events, corrupts a fraction of them according to a fixed
//! defect taxonomy, and renders batches as JSON Lines.

pub mod batch;
pub mod corruption;
pub mod errors;
pub mod factory;
pub mod model;
pub mod output;

pub use batch::{BatchGenerator, GeneratedBatch};
pub use corruption::{CorruptionEngine, CorruptionMode};
pub use errors::GenerationError;
pub use factory::{Clock, EventFactory};
pub use model::{BadRate, BatchReport, GenerateOptions};
pub use output::jsonl::{decode_jsonl, encode_jsonl};
