// Persistence and merge of candle series
pub mod csv_store;
pub mod merge;

pub use csv_store::CsvSeriesStore;
pub use merge::merge_series;
