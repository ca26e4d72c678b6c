use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Kline intervals understood by the exchange.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    Second1,
    Minute1,
    Minute3,
    Minute5,
    Minute15,
    Minute30,
    Hour1,
    Hour2,
    Hour4,
    Hour6,
    Hour8,
    Hour12,
    Day1,
    Day3,
    Week1,
    Month1,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 16] = [
        TimeFrame::Second1,
        TimeFrame::Minute1,
        TimeFrame::Minute3,
        TimeFrame::Minute5,
        TimeFrame::Minute15,
        TimeFrame::Minute30,
        TimeFrame::Hour1,
        TimeFrame::Hour2,
        TimeFrame::Hour4,
        TimeFrame::Hour6,
        TimeFrame::Hour8,
        TimeFrame::Hour12,
        TimeFrame::Day1,
        TimeFrame::Day3,
        TimeFrame::Week1,
        TimeFrame::Month1,
    ];

    /// Resolves a timeframe label such as `"1m"` or `"4h"`.
    /// Anything unrecognized falls back to the daily interval.
    pub fn from_label(label: &str) -> TimeFrame {
        Self::ALL
            .into_iter()
            .find(|tf| tf.interval_code() == label)
            .unwrap_or(TimeFrame::Day1)
    }

    /// The interval code sent to the exchange.
    pub fn interval_code(&self) -> &'static str {
        match self {
            TimeFrame::Second1 => "1s",
            TimeFrame::Minute1 => "1m",
            TimeFrame::Minute3 => "3m",
            TimeFrame::Minute5 => "5m",
            TimeFrame::Minute15 => "15m",
            TimeFrame::Minute30 => "30m",
            TimeFrame::Hour1 => "1h",
            TimeFrame::Hour2 => "2h",
            TimeFrame::Hour4 => "4h",
            TimeFrame::Hour6 => "6h",
            TimeFrame::Hour8 => "8h",
            TimeFrame::Hour12 => "12h",
            TimeFrame::Day1 => "1d",
            TimeFrame::Day3 => "3d",
            TimeFrame::Week1 => "1w",
            TimeFrame::Month1 => "1M",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interval_code())
    }
}

/// Identity of one persisted series. The label is kept verbatim (even when it
/// resolves to the fallback interval) because it names the files on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub symbol: String,
    pub timeframe: String,
}

impl SeriesKey {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
        }
    }

    pub fn resolved_timeframe(&self) -> TimeFrame {
        TimeFrame::from_label(&self.timeframe)
    }

    /// `<root>/<timeframe>/<symbol>/<symbol>_<timeframe>_data.csv`
    pub fn file_path(&self, root: &Path) -> PathBuf {
        root.join(&self.timeframe)
            .join(&self.symbol)
            .join(format!("{}_{}_data.csv", self.symbol, self.timeframe))
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.timeframe)
    }
}
