use thiserror::Error;

/// Failure taxonomy for backend calls. `Network` covers timeouts,
/// unreachable hosts and unreadable bodies and is eligible for a single
/// retry; `Server` carries the backend's own status and message and is
/// never retried. Clonable so cache waiters can share one fetch outcome.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("not found: {0}")]
    NotFound(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network(format!("request timed out: {err}"))
        } else if err.is_connect() {
            ApiError::Network(format!("host unreachable: {err}"))
        } else {
            ApiError::Network(err.to_string())
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}
