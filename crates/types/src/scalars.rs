//! Rust spellings of the Hasura / Postgres scalars.

/// `uuid` — hyphenated lowercase string on the wire.
pub type Uuid = uuid::Uuid;

/// `timestamptz` — RFC 3339 with offset.
pub type Timestamptz = chrono::DateTime<chrono::Utc>;

/// `timestamp` — RFC 3339 without offset.
pub type Timestamp = chrono::NaiveDateTime;

/// `date` — `YYYY-MM-DD`.
pub type Date = chrono::NaiveDate;

/// `numeric` — Hasura serialises it as a JSON number unless
/// `HASURA_GRAPHQL_STRINGIFY_NUMERIC_TYPES` is set.
pub type Numeric = f64;

pub type Bigint = i64;
pub type Int = i32;
pub type Float = f64;

pub type Jsonb = serde_json::Value;
pub type Json = serde_json::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn uuid_round_trips_as_hyphenated_string() {
        let id: Uuid = "6f1d3c1e-2b4a-4c55-9a0e-0d1f2e3a4b5c".parse().unwrap();
        let encoded = serde_json::to_value(id).unwrap();
        assert_eq!(encoded, "6f1d3c1e-2b4a-4c55-9a0e-0d1f2e3a4b5c");
        let decoded: Uuid = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, id);
    }

    #[test]
    fn timestamptz_accepts_hasura_offset_format() {
        // Hasura emits `+00:00` rather than `Z`.
        let decoded: Timestamptz =
            serde_json::from_str("\"2024-03-01T09:30:00.123456+00:00\"").unwrap();
        assert_eq!(
            decoded.timestamp(),
            chrono::Utc
                .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
                .unwrap()
                .timestamp()
        );
    }

    #[test]
    fn date_is_plain_calendar_day() {
        let day: Date = serde_json::from_str("\"2025-12-31\"").unwrap();
        assert_eq!(serde_json::to_string(&day).unwrap(), "\"2025-12-31\"");
    }

    #[test]
    fn numeric_decodes_from_json_number() {
        let value: Numeric = serde_json::from_str("1234.5").unwrap();
        assert!((value - 1234.5).abs() < f64::EPSILON);
    }
}
