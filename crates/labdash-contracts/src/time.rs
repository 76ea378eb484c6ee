//! Lenient timestamp parsing.
//!
//! The backend mixes RFC 3339 strings, naive ISO datetimes without an offset,
//! and bare dates. Everything is read as UTC. Anything unparseable is treated
//! as absent rather than as a decode failure.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse `raw` as a UTC timestamp, accepting the formats the backend emits.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Milliseconds since the Unix epoch, with a missing or unparseable value
/// mapping to 0.
pub fn epoch_millis(raw: Option<&str>) -> i64 {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// `deserialize_with` helper for `Option<DateTime<Utc>>` fields.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-01T08:00:00+00:00");
    }

    #[test]
    fn parses_naive_datetime_as_utc() {
        let dt = parse_timestamp("2024-03-01T10:00:00.250").unwrap();
        assert_eq!(dt.timestamp_millis() % 1000, 250);
        assert!(parse_timestamp("2024-03-01 10:00:00").is_some());
    }

    #[test]
    fn parses_bare_date_at_midnight() {
        let dt = parse_timestamp("2024-01-01").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn missing_or_garbage_is_epoch_zero() {
        assert_eq!(epoch_millis(None), 0);
        assert_eq!(epoch_millis(Some("")), 0);
        assert_eq!(epoch_millis(Some("last tuesday")), 0);
        assert!(epoch_millis(Some("2024-01-02")) > epoch_millis(Some("2024-01-01")));
    }
}
