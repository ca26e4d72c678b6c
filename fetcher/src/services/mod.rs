// Orchestration of series refreshes
pub mod updater;

pub use updater::{SeriesUpdater, UpdateReport};
