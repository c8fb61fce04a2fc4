//! Core contracts for salesgen.
//!
//! This crate defines the sales event payload, the fixed vocabularies it is
//! drawn from, and the staging rules malformed events are built to violate.

pub mod error;
pub mod event;
pub mod staging;
pub mod vocab;

pub use error::{Error, Result};
pub use event::{EventTimestamp, Money, Quantity, SalesEvent, TotalAmount};
pub use staging::{StagingRule, staging_violations, validate_clean_event};
