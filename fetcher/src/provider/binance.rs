use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;

use crate::config::{Credentials, FetcherSettings};
use crate::error::{FetcherError, Result};
use crate::provider::kline::{parse_klines, RawKline};
use crate::provider::KlineProvider;

const KLINES_PATH: &str = "/api/v3/klines";
const API_KEY_HEADER: &str = "X-MBX-APIKEY";
/// Largest page the klines endpoint will return.
pub const MAX_PAGE_LIMIT: u16 = 1000;

/// Spot REST client for historical klines.
///
/// The API key travels in the `X-MBX-APIKEY` header. Klines are an unsigned
/// market-data endpoint, so the secret key is held but never sent.
pub struct BinanceClient {
    client: Client,
    base_url: String,
    limit: u16,
    _credentials: Credentials,
}

impl BinanceClient {
    pub fn new(settings: &FetcherSettings, credentials: Credentials) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let api_key = header::HeaderValue::from_str(credentials.api_key.expose_secret())
            .map_err(|e| FetcherError::ConfigError(format!("{} is not a valid header value: {}", API_KEY_HEADER, e)))?;
        headers.insert(API_KEY_HEADER, api_key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            limit: settings.request_limit.clamp(1, MAX_PAGE_LIMIT),
            _credentials: credentials,
        })
    }

    async fn fetch_page(&self, symbol: &str, interval_code: &str, start_ms: i64, end_ms: i64) -> Result<Vec<RawKline>> {
        let url = format!("{}{}", self.base_url, KLINES_PATH);
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval_code.to_string()),
            ("startTime", start_ms.to_string()),
            ("endTime", end_ms.to_string()),
            ("limit", self.limit.to_string()),
        ];

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(FetcherError::ApiError { status: status.as_u16(), body });
        }

        let rows = response.json::<Vec<Vec<Value>>>().await?;
        parse_klines(rows)
    }
}

/// Where the next page should start, or `None` once the window is exhausted.
/// A page that does not move past `start_ms` also ends the loop.
pub(crate) fn next_page_start(page: &[RawKline], limit: u16, start_ms: i64, end_ms: i64) -> Option<i64> {
    if page.len() < usize::from(limit) {
        return None;
    }
    let next = page.last()?.open_time_ms + 1;
    (next > start_ms && next <= end_ms).then_some(next)
}

#[async_trait]
impl KlineProvider for BinanceClient {
    async fn get_historical_candles(
        &self,
        symbol: &str,
        interval_code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawKline>> {
        let end_ms = end.timestamp_millis();
        let mut start_ms = start.timestamp_millis();
        let mut klines = Vec::new();

        while start_ms <= end_ms {
            let page = self.fetch_page(symbol, interval_code, start_ms, end_ms).await?;
            tracing::debug!(symbol, interval = interval_code, start_ms, rows = page.len(), "Fetched kline page");

            let next = next_page_start(&page, self.limit, start_ms, end_ms);
            klines.extend(page);
            match next {
                Some(next) => start_ms = next,
                None => break,
            }
        }
        Ok(klines)
    }
}
