use reqwest::StatusCode;

/// Convenience alias for web service call results.
pub type WsResult<T> = Result<T, WsError>;

// Error type shared by every web service operation
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status code {0}")]
    Status(StatusCode),

    #[error("Invalid site URL: {0}")]
    InvalidUrl(String),

    #[error("Malformed web service response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Web service fault [{errorcode}]: {message}")]
    Fault { errorcode: String, message: String },

    #[error("No session registered for site: {0}")]
    SessionNotFound(String),

    #[error("No current session selected")]
    NoCurrentSession,
}

impl WsError {
    /// True when the server answered with a structured fault payload.
    pub fn is_fault(&self) -> bool {
        matches!(self, WsError::Fault { .. })
    }
}
