//! Error types for the Kuma dashboard client

/// Errors that can occur while talking to an Uptime Kuma server
#[derive(Debug, thiserror::Error)]
pub enum KumaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch status page: {status} {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Unexpected response: {0}")]
    Format(String),

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Settings storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KumaError {
    /// Message shown on the page-level error banner.
    ///
    /// Transport failures get a hint about connectivity instead of the raw
    /// reqwest message.
    pub fn user_message(&self) -> String {
        match self {
            KumaError::Transport(_) => {
                "Network error. Please check your internet connection and server URL.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for Kuma client operations
pub type Result<T> = std::result::Result<T, KumaError>;
