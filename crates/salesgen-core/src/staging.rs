use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::{EventTimestamp, Quantity, SalesEvent, TotalAmount};
use crate::vocab;

/// Staging rules applied by the warehouse to raw sales events.
///
/// Each corruption mode is built to trip exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingRule {
    RequiredIdentifier,
    TimestampParseable,
    QuantityNumeric,
    QuantityPositive,
    TotalNumeric,
    TotalNotNull,
    TotalNonNegative,
}

impl StagingRule {
    pub const ALL: [StagingRule; 7] = [
        StagingRule::RequiredIdentifier,
        StagingRule::TimestampParseable,
        StagingRule::QuantityNumeric,
        StagingRule::QuantityPositive,
        StagingRule::TotalNumeric,
        StagingRule::TotalNotNull,
        StagingRule::TotalNonNegative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StagingRule::RequiredIdentifier => "required_identifier",
            StagingRule::TimestampParseable => "timestamp_parseable",
            StagingRule::QuantityNumeric => "quantity_numeric",
            StagingRule::QuantityPositive => "quantity_positive",
            StagingRule::TotalNumeric => "total_numeric",
            StagingRule::TotalNotNull => "total_not_null",
            StagingRule::TotalNonNegative => "total_non_negative",
        }
    }
}

impl fmt::Display for StagingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staging rules the event would be rejected for, in [`StagingRule::ALL`] order.
pub fn staging_violations(event: &SalesEvent) -> Vec<StagingRule> {
    let mut violations = Vec::new();

    if event.event_id.is_none() {
        violations.push(StagingRule::RequiredIdentifier);
    }
    if matches!(event.event_ts, EventTimestamp::Malformed(_)) {
        violations.push(StagingRule::TimestampParseable);
    }
    match &event.quantity {
        Quantity::Text(_) => violations.push(StagingRule::QuantityNumeric),
        Quantity::Units(units) if *units <= 0 => violations.push(StagingRule::QuantityPositive),
        Quantity::Units(_) => {}
    }
    match &event.total_amount {
        Some(TotalAmount::Text(_)) => violations.push(StagingRule::TotalNumeric),
        None => violations.push(StagingRule::TotalNotNull),
        Some(TotalAmount::Amount(amount)) if amount.is_negative() => {
            violations.push(StagingRule::TotalNonNegative)
        }
        Some(TotalAmount::Amount(_)) => {}
    }

    violations
}

/// Validate a clean event against every generation bound.
///
/// This checks:
/// - identifiers are present and non-empty
/// - `event_ts` parses
/// - numeric fields sit inside their bounds
/// - enumerated fields come from their vocabulary
/// - `total_amount` equals `quantity * unit_price`
pub fn validate_clean_event(event: &SalesEvent) -> Result<()> {
    if let Some(rule) = staging_violations(event).first() {
        return Err(Error::InvalidEvent(format!("violates staging rule {rule}")));
    }

    let event_id = event.event_id.as_deref().unwrap_or_default();
    for (field, value) in [
        ("event_id", event_id),
        ("order_id", event.order_id.as_str()),
        ("session_id", event.session_id.as_str()),
    ] {
        if value.is_empty() {
            return Err(Error::InvalidEvent(format!("{field} is empty")));
        }
    }

    check_range("customer_id", event.customer_id, &vocab::CUSTOMER_ID_RANGE)?;
    check_range("product_id", event.product_id, &vocab::PRODUCT_ID_RANGE)?;
    let quantity = event.quantity.units().unwrap_or_default();
    check_range("quantity", quantity, &vocab::QUANTITY_RANGE)?;
    check_range(
        "unit_price",
        event.unit_price.cents(),
        &vocab::UNIT_PRICE_CENTS_RANGE,
    )?;

    check_member("category", &event.category, vocab::CATEGORIES)?;
    check_member("payment_method", &event.payment_method, vocab::PAYMENT_METHODS)?;
    check_member("device", &event.device, vocab::DEVICES)?;
    check_member(
        "marketing_channel",
        &event.marketing_channel,
        vocab::MARKETING_CHANNELS,
    )?;

    if event.currency != vocab::CURRENCY {
        return Err(Error::InvalidEvent(format!(
            "currency '{}' is not {}",
            event.currency,
            vocab::CURRENCY
        )));
    }
    if event.country.len() != 2 || !event.country.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(Error::InvalidEvent(format!(
            "country '{}' is not an alpha-2 code",
            event.country
        )));
    }

    let total = event
        .total_amount
        .as_ref()
        .and_then(TotalAmount::amount)
        .unwrap_or_default();
    let expected = event.unit_price.checked_mul(quantity);
    if expected != Some(total) {
        return Err(Error::InvalidEvent(format!(
            "total_amount {total} does not match {quantity} x {}",
            event.unit_price
        )));
    }

    Ok(())
}

fn check_range(
    field: &str,
    value: i64,
    range: &std::ops::RangeInclusive<i64>,
) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidEvent(format!(
            "{field} {value} outside {}..={}",
            range.start(),
            range.end()
        )))
    }
}

fn check_member(field: &str, value: &str, vocabulary: &[&str]) -> Result<()> {
    if vocabulary.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidEvent(format!(
            "{field} '{value}' not in vocabulary"
        )))
    }
}
