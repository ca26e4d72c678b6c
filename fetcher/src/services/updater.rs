// Incremental refresh of persisted candle series
use chrono::{DateTime, Duration, Utc};
use shared::models::{Candle, SeriesKey, TimeFrame};
use std::path::PathBuf;

use crate::config::SeriesJob;
use crate::data::{merge_series, CsvSeriesStore};
use crate::error::{FetcherError, Result};
use crate::provider::KlineProvider;

const PROGRESS_EVERY: usize = 100;

/// Outcome of refreshing one (symbol, timeframe) series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub symbol: String,
    pub timeframe: String,
    pub interval: TimeFrame,
    pub path: PathBuf,
    pub existing_rows: usize,
    pub fetched_rows: usize,
    pub total_rows: usize,
    pub new_rows: usize,
}

pub struct SeriesUpdater<P> {
    provider: P,
    store: CsvSeriesStore,
}

impl<P: KlineProvider> SeriesUpdater<P> {
    pub fn new(provider: P, store: CsvSeriesStore) -> Self {
        SeriesUpdater { provider, store }
    }

    pub fn store(&self) -> &CsvSeriesStore {
        &self.store
    }

    /// Refreshes every job in order. The first failure aborts the run.
    pub async fn run(&self, jobs: &[SeriesJob]) -> Result<Vec<UpdateReport>> {
        let mut reports = Vec::with_capacity(jobs.len());
        for job in jobs {
            tracing::debug!(timeframe = %job.timeframe, "Processing timeframe");
            reports.push(self.update_pair(job).await?);
        }
        Ok(reports)
    }

    pub async fn update_pair(&self, job: &SeriesJob) -> Result<UpdateReport> {
        self.update_pair_at(job, Utc::now()).await
    }

    /// Same as [`update_pair`](Self::update_pair) with the window ending at `now`.
    pub async fn update_pair_at(&self, job: &SeriesJob, now: DateTime<Utc>) -> Result<UpdateReport> {
        let key = SeriesKey::new(job.symbol.as_str(), job.timeframe.as_str());
        let interval = key.resolved_timeframe();
        tracing::debug!(symbol = %key.symbol, interval = %interval, "Fetching data for symbol");

        let existing = self.store.load(&key)?;
        if existing.is_empty() {
            tracing::debug!(series = %key, "No existing data found. Starting fresh.");
        } else {
            tracing::debug!(series = %key, rows = existing.len(), "Existing data loaded");
        }

        let end = now;
        let start = Duration::try_days(job.lookback_days)
            .and_then(|lookback| end.checked_sub_signed(lookback))
            .ok_or_else(|| {
                FetcherError::ConfigError(format!("lookback of {} days is out of range for {}", job.lookback_days, key))
            })?;
        let raw = self
            .provider
            .get_historical_candles(&key.symbol, interval.interval_code(), start, end)
            .await?;

        let total = raw.len();
        tracing::debug!(series = %key, rows = total, "New data fetched");
        let mut fetched: Vec<Candle> = Vec::with_capacity(total);
        for (idx, kline) in raw.iter().enumerate() {
            fetched.push(kline.to_candle()?);
            if (idx + 1) % PROGRESS_EVERY == 0 {
                tracing::debug!(series = %key, "Processing row {}/{}", idx + 1, total);
            }
        }

        let existing_rows = existing.len();
        let merged = merge_series(existing, fetched);
        let new_rows = merged.len().saturating_sub(existing_rows);
        tracing::debug!(series = %key, new_rows, "New rows added");
        tracing::debug!(series = %key, total_rows = merged.len(), "Total data size");

        let path = self.store.save(&key, &merged)?;
        tracing::info!(
            "{} data for timeframe {} has been successfully updated in {}",
            key.symbol,
            key.timeframe,
            path.display()
        );

        Ok(UpdateReport {
            symbol: key.symbol,
            timeframe: key.timeframe,
            interval,
            path,
            existing_rows,
            fetched_rows: total,
            total_rows: merged.len(),
            new_rows,
        })
    }
}
