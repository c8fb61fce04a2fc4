//! Publishing side of salesgen: settings, object keys, stores and the run driver.
//!
//! The driver generates batches with `salesgen-generate` and hands each
//! JSON Lines payload to an [`ObjectStore`]. S3 is the production store; the
//! local-directory and in-memory stores back dry runs and tests.

pub mod driver;
pub mod error;
pub mod keys;
pub mod settings;
pub mod store;
pub mod uploader;

pub use driver::{Driver, RunSummary, publish};
pub use error::{ConfigError, PublishError, UploadError};
pub use keys::{RunStamp, object_key};
pub use settings::{Settings, SettingsOverrides};
pub use store::{JSONL_CONTENT_TYPE, ObjectStore, StoreError};
pub use uploader::{UploadReceipt, upload_batch};
