mod history;
mod marker;

pub use history::HistoryStore;
pub use marker::MarkerStore;

/// Timestamp format used in the history file, `2024-11-03 18:05:41` style.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
