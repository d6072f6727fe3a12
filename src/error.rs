use thiserror::Error;

/// Run-level error kinds. The kind name (not the detail) is what the
/// notifier state machine persists to suppress duplicate alerts.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("store corrupt: {0}")]
    StoreCorrupt(String),

    #[error("mail send failed: {0}")]
    Send(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl RunError {
    /// Stable identifier written to the error marker file.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RunError::Fetch(_) => "FetchError",
            RunError::StoreCorrupt(_) => "StoreCorruptError",
            RunError::Send(_) => "SendError",
            RunError::Config(_) => "ConfigError",
        }
    }
}
