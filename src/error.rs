use thiserror::Error;

/// Failure taxonomy for everything that crosses the network (or fails to).
///
/// Form-level validation never becomes an `ApiError`; it is surfaced inline
/// by the views before a request is built.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("{0}")]
    MalformedResponse(String),

    #[error("auth session not available after {attempts} attempts")]
    AuthUnavailable { attempts: u32 },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        ApiError::MalformedResponse(detail.into())
    }
}
