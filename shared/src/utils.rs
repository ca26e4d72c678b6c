// Text formats for timestamps and decimals shared by the fetcher's readers and writers.

pub mod series_format {
    use anyhow::{anyhow, Result};
    use chrono::{DateTime, NaiveDateTime, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    /// `2024-01-31 13:45:00`, with fractional seconds only when present.
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.format(TIMESTAMP_FORMAT).to_string()
    }

    // Accepts the written format as well as RFC 3339.
    pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        let trimmed = s.trim();
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT) {
            return Ok(naive.and_utc());
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| anyhow!("Failed to parse timestamp '{}': {}", s, e))
    }

    pub fn timestamp_from_millis(ms: i64) -> Result<DateTime<Utc>> {
        DateTime::from_timestamp_millis(ms).ok_or_else(|| anyhow!("Timestamp out of range: {}ms", ms))
    }

    pub fn parse_decimal(s: &str) -> Result<Decimal> {
        let trimmed = s.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))
    }

    pub fn format_decimal(value: &Decimal) -> String {
        value.normalize().to_string()
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{Datelike, TimeZone, Timelike};

        #[test]
        fn test_parse_decimal_exchange_string() {
            assert_eq!(parse_decimal("42000.01000000").unwrap(), Decimal::new(4200001, 2));
        }

        #[test]
        fn test_parse_decimal_scientific() {
            assert_eq!(parse_decimal("1e-5").unwrap(), Decimal::new(1, 5));
        }

        #[test]
        fn test_parse_decimal_invalid() {
            assert!(parse_decimal("abc").is_err());
        }

        #[test]
        fn test_format_decimal_drops_trailing_zeros() {
            assert_eq!(format_decimal(&Decimal::from_str("12.3400").unwrap()), "12.34");
            assert_eq!(format_decimal(&Decimal::from_str("100.000").unwrap()), "100");
        }

        #[test]
        fn test_timestamp_text_form() {
            let ts = Utc.with_ymd_and_hms(2024, 12, 30, 18, 20, 0).unwrap();
            assert_eq!(format_timestamp(&ts), "2024-12-30 18:20:00");
            assert_eq!(parse_timestamp("2024-12-30 18:20:00").unwrap(), ts);
        }

        #[test]
        fn test_parse_timestamp_with_millis() {
            let dt = parse_timestamp("2024-12-30 18:20:00.250").unwrap();
            assert_eq!(dt.timestamp_subsec_millis(), 250);
            assert_eq!(dt.minute(), 20);
        }

        #[test]
        fn test_parse_timestamp_rfc3339() {
            let dt = parse_timestamp("2024-12-30T18:20:00Z").unwrap();
            assert_eq!(dt.year(), 2024);
            assert_eq!(dt.hour(), 18);
        }

        #[test]
        fn test_parse_timestamp_invalid() {
            assert!(parse_timestamp("30/12/2024 18:20").is_err());
        }

        #[test]
        fn test_timestamp_from_millis() {
            let dt = timestamp_from_millis(1_700_000_000_000).unwrap();
            assert_eq!(dt.timestamp(), 1_700_000_000);
            assert!(timestamp_from_millis(i64::MAX).is_err());
        }
    }
}
