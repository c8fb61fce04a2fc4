use std::fmt;
use std::str::FromStr;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use salesgen_core::{EventTimestamp, Money, Quantity, SalesEvent, StagingRule, TotalAmount};

use crate::errors::GenerationError;

pub const BAD_TIMESTAMP: &str = "not-a-timestamp";
pub const NON_NUMERIC_QUANTITY: &str = "two";
pub const NON_NUMERIC_TOTAL: &str = "NaN";
pub const NEGATIVE_TOTAL: Money = Money::from_cents(-100);

/// Single-field defects injected into otherwise clean events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptionMode {
    MissingEventId,
    BadTs,
    QtyNonNumeric,
    QtyZero,
    TotalNonNumeric,
    TotalNull,
    TotalNegative,
}

impl CorruptionMode {
    pub const ALL: [CorruptionMode; 7] = [
        CorruptionMode::MissingEventId,
        CorruptionMode::BadTs,
        CorruptionMode::QtyNonNumeric,
        CorruptionMode::QtyZero,
        CorruptionMode::TotalNonNumeric,
        CorruptionMode::TotalNull,
        CorruptionMode::TotalNegative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CorruptionMode::MissingEventId => "missing_event_id",
            CorruptionMode::BadTs => "bad_ts",
            CorruptionMode::QtyNonNumeric => "qty_non_numeric",
            CorruptionMode::QtyZero => "qty_zero",
            CorruptionMode::TotalNonNumeric => "total_non_numeric",
            CorruptionMode::TotalNull => "total_null",
            CorruptionMode::TotalNegative => "total_negative",
        }
    }

    /// Staging rule an event corrupted with this mode is rejected by.
    pub fn violates(self) -> StagingRule {
        match self {
            CorruptionMode::MissingEventId => StagingRule::RequiredIdentifier,
            CorruptionMode::BadTs => StagingRule::TimestampParseable,
            CorruptionMode::QtyNonNumeric => StagingRule::QuantityNumeric,
            CorruptionMode::QtyZero => StagingRule::QuantityPositive,
            CorruptionMode::TotalNonNumeric => StagingRule::TotalNumeric,
            CorruptionMode::TotalNull => StagingRule::TotalNotNull,
            CorruptionMode::TotalNegative => StagingRule::TotalNonNegative,
        }
    }

    /// Overwrite the one field this mode targets.
    pub fn apply(self, event: &mut SalesEvent) {
        match self {
            CorruptionMode::MissingEventId => event.event_id = None,
            CorruptionMode::BadTs => {
                event.event_ts = EventTimestamp::Malformed(BAD_TIMESTAMP.to_string())
            }
            CorruptionMode::QtyNonNumeric => {
                event.quantity = Quantity::Text(NON_NUMERIC_QUANTITY.to_string())
            }
            CorruptionMode::QtyZero => event.quantity = Quantity::Units(0),
            CorruptionMode::TotalNonNumeric => {
                event.total_amount = Some(TotalAmount::Text(NON_NUMERIC_TOTAL.to_string()))
            }
            CorruptionMode::TotalNull => event.total_amount = None,
            CorruptionMode::TotalNegative => {
                event.total_amount = Some(TotalAmount::Amount(NEGATIVE_TOTAL))
            }
        }
    }
}

impl fmt::Display for CorruptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorruptionMode {
    type Err = GenerationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        CorruptionMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| {
                GenerationError::InvalidOptions(format!("unknown corruption mode '{value}'"))
            })
    }
}

/// Picks a corruption mode uniformly and applies it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorruptionEngine;

impl CorruptionEngine {
    pub fn pick(&self, rng: &mut dyn RngCore) -> CorruptionMode {
        CorruptionMode::ALL[rng.random_range(0..CorruptionMode::ALL.len())]
    }

    pub fn corrupt(&self, event: &mut SalesEvent, rng: &mut dyn RngCore) -> CorruptionMode {
        let mode = self.pick(rng);
        mode.apply(event);
        mode
    }
}
