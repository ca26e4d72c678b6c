//! Sources of raw historical klines.
//!
//! The updater only depends on [`KlineProvider`], so the live exchange client
//! ([`binance::BinanceClient`]) can be swapped for an in-memory provider in tests.

pub mod binance;
pub mod kline;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
pub use kline::RawKline;

#[async_trait]
pub trait KlineProvider {
    /// Returns every kline whose open time falls within `[start, end]`, oldest first.
    async fn get_historical_candles(
        &self,
        symbol: &str,
        interval_code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawKline>>;
}
