//! Fixed vocabularies and numeric bounds for generated sales events.

use std::ops::RangeInclusive;

pub const CATEGORIES: &[&str] = &["electronics", "fashion", "home", "sports", "beauty"];

pub const PAYMENT_METHODS: &[&str] = &["card", "paypal", "apple_pay", "bank_transfer"];

pub const DEVICES: &[&str] = &["mobile", "desktop", "tablet"];

pub const MARKETING_CHANNELS: &[&str] =
    &["organic", "paid_search", "email", "social", "affiliate"];

pub const CURRENCY: &str = "USD";

pub const CUSTOMER_ID_RANGE: RangeInclusive<i64> = 1..=5000;

pub const PRODUCT_ID_RANGE: RangeInclusive<i64> = 1..=2000;

pub const QUANTITY_RANGE: RangeInclusive<i64> = 1..=5;

/// Unit price bounds in cents (5.00 to 500.00).
pub const UNIT_PRICE_CENTS_RANGE: RangeInclusive<i64> = 500..=50_000;
