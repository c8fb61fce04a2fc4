use chrono::{DateTime, Utc};

/// Run-level time tokens, fixed once at run start and shared by every batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp {
    timestamp: String,
    date: String,
}

impl RunStamp {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            timestamp: instant.format("%Y%m%dT%H%M%SZ").to_string(),
            date: instant.format("%Y%m%d").to_string(),
        }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// `YYYYMMDDTHHMMSSZ`
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// `YYYYMMDD`, used as the `dt=` partition.
    pub fn date(&self) -> &str {
        &self.date
    }
}

/// Object key for batch `index` (1-based):
/// `{prefix}/dt={date}/sales_{timestamp}_{index}.jsonl`.
pub fn object_key(prefix: &str, stamp: &RunStamp, index: u32) -> String {
    let file = format!(
        "dt={}/sales_{}_{}.jsonl",
        stamp.date(),
        stamp.timestamp(),
        index
    );
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        file
    } else {
        format!("{prefix}/{file}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn stamp() -> RunStamp {
        RunStamp::at(Utc.with_ymd_and_hms(2024, 7, 4, 9, 5, 3).unwrap())
    }

    #[test]
    fn formats_tokens() {
        let stamp = stamp();
        assert_eq!(stamp.timestamp(), "20240704T090503Z");
        assert_eq!(stamp.date(), "20240704");
    }

    #[test]
    fn builds_partitioned_key() {
        assert_eq!(
            object_key("raw/sales", &stamp(), 1),
            "raw/sales/dt=20240704/sales_20240704T090503Z_1.jsonl"
        );
        assert_eq!(
            object_key("raw/sales/", &stamp(), 12),
            "raw/sales/dt=20240704/sales_20240704T090503Z_12.jsonl"
        );
        assert_eq!(
            object_key("", &stamp(), 3),
            "dt=20240704/sales_20240704T090503Z_3.jsonl"
        );
    }
}
