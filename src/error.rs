use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Client-side validation failure. No request was made.
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-success status.
    #[error("Backend error {status}: {message}")]
    Backend { status: u16, message: String },

    /// The request never completed (connection refused, DNS, ...).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session store error: {0}")]
    SessionIo(#[from] std::io::Error),

    #[error("Session data is corrupt: {0}")]
    SessionData(#[from] serde_json::Error),

    #[error("Not authenticated")]
    Unauthenticated,
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// The backend's own error text, when there is one. Flows that surface
    /// the server message verbatim (UC close/open) read it from here.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            AppError::Backend { message, .. } => Some(message),
            _ => None,
        }
    }
}
