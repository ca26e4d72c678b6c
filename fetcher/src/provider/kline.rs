use serde_json::Value;
use shared::models::Candle;
use shared::utils::series_format;

use crate::error::FetcherError;

/// One kline row as the exchange sends it: open time in epoch milliseconds and
/// the OHLCV fields still in their wire form (decimal strings).
#[derive(Debug, Clone, PartialEq)]
pub struct RawKline {
    pub open_time_ms: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

const FIELD_NAMES: [&str; 5] = ["open", "high", "low", "close", "volume"];

// [open_time, "open", "high", "low", "close", "volume", close_time, "quote_volume", trades, ...]
impl TryFrom<Vec<Value>> for RawKline {
    type Error = FetcherError;

    fn try_from(row: Vec<Value>) -> Result<Self, Self::Error> {
        if row.len() < 6 {
            return Err(FetcherError::MalformedKline(format!(
                "expected at least 6 fields, got {}",
                row.len()
            )));
        }

        let mut items = row.into_iter();
        let open_time_ms = match items.next() {
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| FetcherError::MalformedKline(format!("open_time is not an integer: {}", n)))?,
            other => return Err(FetcherError::MalformedKline(format!("open_time has invalid type: {:?}", other))),
        };

        let mut fields = Vec::with_capacity(FIELD_NAMES.len());
        for (name, value) in FIELD_NAMES.iter().zip(items) {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                other => return Err(FetcherError::MalformedKline(format!("{} has invalid type: {}", name, other))),
            };
            fields.push(text);
        }

        let [open, high, low, close, volume]: [String; 5] = fields
            .try_into()
            .map_err(|_| FetcherError::MalformedKline("missing OHLCV fields".to_string()))?;
        Ok(RawKline {
            open_time_ms,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

impl RawKline {
    /// Converts the wire strings into decimals and the open time into a UTC instant.
    pub fn to_candle(&self) -> Result<Candle, FetcherError> {
        let timestamp = series_format::timestamp_from_millis(self.open_time_ms)
            .map_err(|e| FetcherError::MalformedKline(e.to_string()))?;
        let parse = |name: &str, raw: &str| {
            series_format::parse_decimal(raw)
                .map_err(|e| FetcherError::MalformedKline(format!("{} at {}: {}", name, self.open_time_ms, e)))
        };

        Ok(Candle {
            timestamp,
            open: parse("open", &self.open)?,
            high: parse("high", &self.high)?,
            low: parse("low", &self.low)?,
            close: parse("close", &self.close)?,
            volume: parse("volume", &self.volume)?,
        })
    }
}

pub fn parse_klines(rows: Vec<Vec<Value>>) -> Result<Vec<RawKline>, FetcherError> {
    rows.into_iter().map(RawKline::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const PAGE: &str = r#"[
        [1499040000000, "0.01634790", "0.80000000", "0.01575800", "0.01577100", "148976.11427815",
         1499644799999, "2434.19055334", 308, "1756.87402397", "28.46694368", "0"],
        [1499040060000, "0.01577100", "0.01600000", "0.01570000", "0.01590000", "1000.00000000",
         1499040119999, "15.9", 12, "500.0", "7.9", "0"]
    ]"#;

    fn page() -> Vec<Vec<Value>> {
        serde_json::from_str(PAGE).unwrap()
    }

    #[test]
    fn test_parse_exchange_page() {
        let klines = parse_klines(page()).unwrap();

        assert_eq!(klines.len(), 2);
        assert_eq!(klines[0].open_time_ms, 1499040000000);
        assert_eq!(klines[0].open, "0.01634790");
        assert_eq!(klines[0].volume, "148976.11427815");
        assert_eq!(klines[1].close, "0.01590000");
    }

    #[test]
    fn test_to_candle_converts_fields() {
        let candle = parse_klines(page()).unwrap()[0].to_candle().unwrap();

        assert_eq!(candle.timestamp, Utc.timestamp_millis_opt(1499040000000).unwrap());
        assert_eq!(candle.open, Decimal::from_str("0.0163479").unwrap());
        assert_eq!(candle.high, Decimal::from_str("0.8").unwrap());
        assert_eq!(candle.volume, Decimal::from_str("148976.11427815").unwrap());
    }

    #[test]
    fn test_numeric_fields_are_accepted() {
        let row: Vec<Value> = serde_json::from_str(r#"[1700000000000, 1.5, 2, 1, 1.75, 10]"#).unwrap();
        let candle = RawKline::try_from(row).unwrap().to_candle().unwrap();
        assert_eq!(candle.close, Decimal::from_str("1.75").unwrap());
    }

    #[test]
    fn test_short_row_is_malformed() {
        let row: Vec<Value> = serde_json::from_str(r#"[1700000000000, "1", "2"]"#).unwrap();
        let err = RawKline::try_from(row).unwrap_err();
        assert!(err.to_string().contains("expected at least 6 fields"));
    }

    #[test]
    fn test_string_open_time_is_malformed() {
        let row: Vec<Value> = serde_json::from_str(r#"["1700000000000", "1", "2", "0.5", "1.5", "3"]"#).unwrap();
        assert!(matches!(RawKline::try_from(row), Err(FetcherError::MalformedKline(_))));
    }

    #[test]
    fn test_unparsable_price_is_malformed() {
        let row: Vec<Value> = serde_json::from_str(r#"[1700000000000, "1", "2", "0.5", "n/a", "3"]"#).unwrap();
        let err = RawKline::try_from(row).unwrap().to_candle().unwrap_err();
        assert!(err.to_string().contains("close"));
    }
}
