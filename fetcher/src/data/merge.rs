// Incremental merge of a persisted series with freshly fetched candles.
use shared::models::Candle;

/// Concatenates `existing` and `fetched`, keeps the last row seen for each
/// timestamp and returns the result sorted ascending by timestamp.
pub fn merge_series(existing: Vec<Candle>, fetched: Vec<Candle>) -> Vec<Candle> {
    let mut merged = existing;
    merged.extend(fetched);

    // Stable sort: for equal timestamps the later-arriving row stays behind the earlier one.
    merged.sort_by_key(|c| c.timestamp);
    merged.dedup_by(|later, kept| {
        if later.timestamp == kept.timestamp {
            std::mem::swap(later, kept);
            true
        } else {
            false
        }
    });
    merged
}
