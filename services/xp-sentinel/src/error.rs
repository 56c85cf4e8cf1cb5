//! Error types for the xp-sentinel service

/// Errors that can occur in the xp-sentinel service
#[derive(Debug, thiserror::Error)]
pub enum XpSentinelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Fetching {url} returned status {status}")]
    Fetch { url: String, status: u16 },

    #[error("Webhook delivery failed: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for xp-sentinel operations
pub type Result<T> = std::result::Result<T, XpSentinelError>;
