pub mod settings;

pub use settings::{Credentials, FetcherSettings, SeriesJob};
