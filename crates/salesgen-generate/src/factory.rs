use chrono::{DateTime, SubsecRound, Utc};
use fake::Fake;
use fake::faker::address::en::CountryCode;
use rand::{Rng, RngCore};

use salesgen_core::vocab;
use salesgen_core::{EventTimestamp, Money, Quantity, SalesEvent, TotalAmount};

/// Source of `event_ts` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall clock, read once per event.
    #[default]
    System,
    /// Every event carries the same instant.
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            // Microsecond precision survives the JSON round trip.
            Clock::System => Utc::now().trunc_subsecs(6),
            Clock::Fixed(ts) => *ts,
        }
    }
}

/// Builds well-formed sales events from an injected random source.
#[derive(Debug, Clone, Default)]
pub struct EventFactory {
    clock: Clock,
}

impl EventFactory {
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    pub fn build(&self, rng: &mut dyn RngCore) -> SalesEvent {
        let quantity = rng.random_range(vocab::QUANTITY_RANGE);
        let unit_price = Money::from_cents(rng.random_range(vocab::UNIT_PRICE_CENTS_RANGE));
        // Both factors are bounded, so the product fits comfortably.
        let total_amount = Money::from_cents(unit_price.cents() * quantity);
        let country: String = CountryCode().fake_with_rng(rng);

        SalesEvent {
            event_id: Some(random_uuid(rng)),
            event_ts: EventTimestamp::At(self.clock.now()),
            order_id: random_uuid(rng),
            customer_id: rng.random_range(vocab::CUSTOMER_ID_RANGE),
            session_id: random_uuid(rng),
            product_id: rng.random_range(vocab::PRODUCT_ID_RANGE),
            category: pick(vocab::CATEGORIES, rng),
            quantity: Quantity::Units(quantity),
            unit_price,
            total_amount: Some(TotalAmount::Amount(total_amount)),
            currency: vocab::CURRENCY.to_string(),
            payment_method: pick(vocab::PAYMENT_METHODS, rng),
            country,
            device: pick(vocab::DEVICES, rng),
            marketing_channel: pick(vocab::MARKETING_CHANNELS, rng),
        }
    }
}

fn random_uuid(rng: &mut dyn RngCore) -> String {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

fn pick(values: &[&str], rng: &mut dyn RngCore) -> String {
    let idx = rng.random_range(0..values.len());
    values[idx].to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use salesgen_core::{staging_violations, validate_clean_event};

    use super::*;

    fn fixed_factory() -> EventFactory {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        EventFactory::new(Clock::Fixed(ts))
    }

    #[test]
    fn builds_clean_events_within_bounds() {
        let factory = fixed_factory();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..2_000 {
            let event = factory.build(&mut rng);
            assert!(staging_violations(&event).is_empty());
            validate_clean_event(&event).expect("clean event");
        }
    }

    #[test]
    fn identifiers_are_unique_v4_uuids() {
        let factory = fixed_factory();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut seen = HashSet::new();

        for _ in 0..1_000 {
            let event = factory.build(&mut rng);
            let event_id = event.event_id.clone().expect("event_id");
            for id in [event_id, event.order_id, event.session_id] {
                let parsed = uuid::Uuid::parse_str(&id).expect("uuid");
                assert_eq!(parsed.get_version_num(), 4);
                assert!(seen.insert(id), "duplicate identifier");
            }
        }
    }

    #[test]
    fn same_seed_builds_same_event() {
        let factory = fixed_factory();
        let a = factory.build(&mut ChaCha8Rng::seed_from_u64(3));
        let b = factory.build(&mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn draws_every_category() {
        let factory = fixed_factory();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let seen: HashSet<String> = (0..500).map(|_| factory.build(&mut rng).category).collect();
        assert_eq!(seen.len(), vocab::CATEGORIES.len());
    }
}
