use crate::error::{FetcherError, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use shared::models::{Candle, SeriesKey};
use shared::utils::series_format;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const SERIES_HEADER: [&str; 7] = ["", "timestamp", "open", "high", "low", "close", "volume"];

/// Flat-file store: one CSV per (timeframe, symbol) under a root directory.
#[derive(Debug, Clone)]
pub struct CsvSeriesStore {
    root: PathBuf,
}

impl CsvSeriesStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &SeriesKey) -> PathBuf {
        key.file_path(&self.root)
    }

    /// Returns the persisted series, or an empty one if nothing has been written yet.
    pub fn load(&self, key: &SeriesKey) -> Result<Vec<Candle>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_series(&path)
    }

    /// Replaces the series file in full. Parent directories are created as needed.
    pub fn save(&self, key: &SeriesKey, candles: &[Candle]) -> Result<PathBuf> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("csv.tmp");
        write_series(&tmp_path, candles)?;
        fs::rename(&tmp_path, &path)?;
        Ok(path)
    }
}

// Columns are looked up by header name so that extra columns are tolerated.
pub fn read_series(path: &Path) -> Result<Vec<Candle>> {
    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers = rdr.headers()?.clone();
    let mut candles = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 2;
        let record = result?;

        let timestamp_str = required_field(&record, &headers, "timestamp", line)?;
        let timestamp = series_format::parse_timestamp(timestamp_str)
            .map_err(|e| FetcherError::CsvDataFormatError(format!("line {}: {}", line, e)))?;

        candles.push(Candle {
            timestamp,
            open: decimal_field(&record, &headers, "open", line)?,
            high: decimal_field(&record, &headers, "high", line)?,
            low: decimal_field(&record, &headers, "low", line)?,
            close: decimal_field(&record, &headers, "close", line)?,
            volume: decimal_field(&record, &headers, "volume", line)?,
        });
    }
    Ok(candles)
}

/// Writes the header followed by one row per candle, prefixed with its row position.
pub fn write_series(path: &Path, candles: &[Candle]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(SERIES_HEADER)?;

    for (idx, candle) in candles.iter().enumerate() {
        wtr.write_record([
            idx.to_string(),
            series_format::format_timestamp(&candle.timestamp),
            series_format::format_decimal(&candle.open),
            series_format::format_decimal(&candle.high),
            series_format::format_decimal(&candle.low),
            series_format::format_decimal(&candle.close),
            series_format::format_decimal(&candle.volume),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn required_field<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<&'a str> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .and_then(|pos| record.get(pos))
        .ok_or_else(|| FetcherError::CsvDataFormatError(format!("Missing '{}' field at line {}", name, line)))
}

fn decimal_field(record: &StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<rust_decimal::Decimal> {
    let raw = required_field(record, headers, name, line)?;
    series_format::parse_decimal(raw)
        .map_err(|e| FetcherError::CsvDataFormatError(format!("Error parsing '{}' at line {}: {}", name, line, e)))
}
