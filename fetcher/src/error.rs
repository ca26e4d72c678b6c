use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetcherError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP request failed: {source}")]
    HttpError {
        #[from]
        source: reqwest::Error,
    },

    #[error("Exchange API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Malformed kline in provider response: {0}")]
    MalformedKline(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),
}

pub type Result<T> = std::result::Result<T, FetcherError>;
