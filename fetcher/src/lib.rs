// Fetcher library root

pub mod config;
pub mod data;
pub mod error;
pub mod provider;
pub mod services;

pub use error::{FetcherError, Result};
