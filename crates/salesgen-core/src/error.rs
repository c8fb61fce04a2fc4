use thiserror::Error;

/// Core error type shared across salesgen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The event breaks one of the clean-event invariants.
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}

/// Convenience alias for results returned by salesgen crates.
pub type Result<T> = std::result::Result<T, Error>;
