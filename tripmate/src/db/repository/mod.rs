mod daily_plans;
mod trip_items;
mod trips;

pub use daily_plans::DailyPlanRepository;
pub use trip_items::TripItemRepository;
pub use trips::TripRepository;

use chrono::{DateTime, Utc};

/// RFC 3339 column value; an unparsable one is replaced with the current time.
pub(crate) fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|error| {
            tracing::warn!(value = %value, error = %error, "Unparsable created_at timestamp, using now");
            Utc::now()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_reads_rfc3339() {
        let parsed = parse_timestamp("2025-04-01T09:30:00+09:00");
        assert_eq!(parsed.to_rfc3339(), "2025-04-01T00:30:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_falls_back_to_now() {
        let before = Utc::now();
        let parsed = parse_timestamp("yesterday-ish");
        assert!(parsed >= before);
        assert!(parsed <= Utc::now());
    }
}
