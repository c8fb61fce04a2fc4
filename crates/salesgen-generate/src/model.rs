use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::corruption::CorruptionMode;
use crate::errors::GenerationError;

/// Probability in `[0, 1]` that a generated event is corrupted.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct BadRate(f64);

impl BadRate {
    pub const ALL: BadRate = BadRate(1.0);

    pub fn new(value: f64) -> Result<Self, GenerationError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GenerationError::InvalidOptions(format!(
                "bad rate must be within [0, 1], got {value}"
            )))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for BadRate {
    fn default() -> Self {
        Self(0.05)
    }
}

impl TryFrom<f64> for BadRate {
    type Error = GenerationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        BadRate::new(value)
    }
}

impl From<BadRate> for f64 {
    fn from(value: BadRate) -> Self {
        value.0
    }
}

impl fmt::Display for BadRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Options for the batch generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Share of events passed through the corruption engine.
    pub bad_rate: BadRate,
    /// Seed for the generator RNG; entropy from the OS when unset.
    pub seed: Option<u64>,
}

/// Counts for one generated batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub events: u64,
    pub clean: u64,
    pub corrupted: u64,
    pub defects_by_mode: BTreeMap<String, u64>,
}

impl BatchReport {
    pub fn record_clean(&mut self) {
        self.events += 1;
        self.clean += 1;
    }

    pub fn record_defect(&mut self, mode: CorruptionMode) {
        self.events += 1;
        self.corrupted += 1;
        *self
            .defects_by_mode
            .entry(mode.as_str().to_string())
            .or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: &BatchReport) {
        self.events += other.events;
        self.clean += other.clean;
        self.corrupted += other.corrupted;
        for (mode, count) in &other.defects_by_mode {
            *self.defects_by_mode.entry(mode.clone()).or_insert(0) += count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_rate_rejects_out_of_range() {
        assert!(BadRate::new(0.0).is_ok());
        assert!(BadRate::new(1.0).is_ok());
        assert!(BadRate::new(-0.01).is_err());
        assert!(BadRate::new(1.5).is_err());
        assert!(BadRate::new(f64::NAN).is_err());
    }

    #[test]
    fn bad_rate_display_keeps_decimal_point() {
        assert_eq!(BadRate::new(0.0).unwrap().to_string(), "0.0");
        assert_eq!(BadRate::ALL.to_string(), "1.0");
        assert_eq!(BadRate::default().to_string(), "0.05");
    }

    #[test]
    fn bad_rate_deserialize_is_validated() {
        let rate: BadRate = serde_json::from_str("0.25").unwrap();
        assert_eq!(rate.value(), 0.25);
        assert!(serde_json::from_str::<BadRate>("2.0").is_err());
    }

    #[test]
    fn merge_sums_counts() {
        let mut total = BatchReport::default();
        let mut batch = BatchReport::default();
        batch.record_clean();
        batch.record_defect(CorruptionMode::QtyZero);
        batch.record_defect(CorruptionMode::QtyZero);

        total.merge(&batch);
        total.merge(&batch);

        assert_eq!(total.events, 6);
        assert_eq!(total.clean, 2);
        assert_eq!(total.corrupted, 4);
        assert_eq!(total.defects_by_mode.get("qty_zero"), Some(&4));
    }
}
