use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single e-commerce sales event as it lands in the raw zone.
///
/// Fields that can be corrupted are modelled as small enums so that both the
/// clean and the malformed payload shapes round-trip through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesEvent {
    pub event_id: Option<String>,
    pub event_ts: EventTimestamp,
    pub order_id: String,
    pub customer_id: i64,
    pub session_id: String,
    pub product_id: i64,
    pub category: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub total_amount: Option<TotalAmount>,
    pub currency: String,
    pub payment_method: String,
    pub country: String,
    pub device: String,
    pub marketing_channel: String,
}

/// Monetary amount held as whole cents.
///
/// Serialized as a JSON number with at most two fractional digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money {
    cents: i64,
}

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub const fn cents(self) -> i64 {
        self.cents
    }

    pub fn as_f64(self) -> f64 {
        self.cents as f64 / 100.0
    }

    pub fn is_negative(self) -> bool {
        self.cents < 0
    }

    /// Multiply by a unit count. Exact, since both sides are integral.
    pub fn checked_mul(self, units: i64) -> Option<Self> {
        self.cents.checked_mul(units).map(Self::from_cents)
    }

    /// Round a float to the cent, halves away from zero.
    ///
    /// Rounding works on the shortest decimal rendering of `value`, so
    /// `1.005` becomes `1.01` even though its binary value sits just below.
    pub fn from_f64_rounded(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        let rendered = value.abs().to_string();
        let (whole, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
        let whole: i64 = whole.parse().ok()?;
        let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().unwrap_or(0) >= 5;

        let mut cents = whole
            .checked_mul(100)?
            .checked_add(tenths * 10 + hundredths)?;
        if round_up {
            cents = cents.checked_add(1)?;
        }
        if value.is_sign_negative() {
            cents = -cents;
        }
        Some(Self::from_cents(cents))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_f64_rounded(value)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {value}")))
    }
}

/// Units ordered; a string when the event was corrupted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Units(i64),
    Text(String),
}

impl Quantity {
    pub fn units(&self) -> Option<i64> {
        match self {
            Quantity::Units(units) => Some(*units),
            Quantity::Text(_) => None,
        }
    }
}

/// Order total; a string when the event was corrupted.
///
/// A null total is represented by `Option::None` on [`SalesEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalAmount {
    Amount(Money),
    Text(String),
}

impl TotalAmount {
    pub fn amount(&self) -> Option<Money> {
        match self {
            TotalAmount::Amount(amount) => Some(*amount),
            TotalAmount::Text(_) => None,
        }
    }
}

/// Event time. Anything that does not parse as RFC 3339 is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTimestamp {
    At(DateTime<Utc>),
    Malformed(String),
}

impl EventTimestamp {
    pub fn parse(raw: &str) -> Self {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => EventTimestamp::At(ts.with_timezone(&Utc)),
            Err(_) => EventTimestamp::Malformed(raw.to_string()),
        }
    }

    pub fn at(&self) -> Option<DateTime<Utc>> {
        match self {
            EventTimestamp::At(ts) => Some(*ts),
            EventTimestamp::Malformed(_) => None,
        }
    }
}

impl fmt::Display for EventTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // `+00:00` rather than `Z`, matching what the warehouse stage expects.
            EventTimestamp::At(ts) => f.write_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, false)),
            EventTimestamp::Malformed(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for EventTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(EventTimestamp::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(Money::from_f64_rounded(1.005), Some(Money::from_cents(101)));
        assert_eq!(Money::from_f64_rounded(2.675), Some(Money::from_cents(268)));
        assert_eq!(Money::from_f64_rounded(-1.005), Some(Money::from_cents(-101)));
        assert_eq!(Money::from_f64_rounded(12.344), Some(Money::from_cents(1234)));
        assert_eq!(Money::from_f64_rounded(500.0), Some(Money::from_cents(50000)));
        assert_eq!(Money::from_f64_rounded(f64::NAN), None);
    }

    #[test]
    fn money_serializes_as_json_number() {
        assert_eq!(serde_json::to_string(&Money::from_cents(1234)).unwrap(), "12.34");
        assert_eq!(serde_json::to_string(&Money::from_cents(1250)).unwrap(), "12.5");
        assert_eq!(serde_json::to_string(&Money::from_cents(-100)).unwrap(), "-1.0");
        assert_eq!(Money::from_cents(-100).to_string(), "-1.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn corrupted_shapes_deserialize() {
        let qty: Quantity = serde_json::from_str("\"two\"").unwrap();
        assert_eq!(qty, Quantity::Text("two".to_string()));

        let total: Option<TotalAmount> = serde_json::from_str("\"NaN\"").unwrap();
        assert_eq!(total, Some(TotalAmount::Text("NaN".to_string())));

        let total: Option<TotalAmount> = serde_json::from_str("null").unwrap();
        assert_eq!(total, None);

        let total: Option<TotalAmount> = serde_json::from_str("-1.0").unwrap();
        assert_eq!(total, Some(TotalAmount::Amount(Money::from_cents(-100))));
    }

    #[test]
    fn timestamp_keeps_unparseable_text() {
        let ts: EventTimestamp = serde_json::from_str("\"not-a-timestamp\"").unwrap();
        assert_eq!(ts, EventTimestamp::Malformed("not-a-timestamp".to_string()));

        let ts: EventTimestamp =
            serde_json::from_str("\"2024-03-01T10:15:30.123456+00:00\"").unwrap();
        assert!(ts.at().is_some());
        assert_eq!(ts.to_string(), "2024-03-01T10:15:30.123456+00:00");
    }
}
