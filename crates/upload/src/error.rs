//! Upload error types.

use lago_protocol::ApiError;

/// A failure of one of the remote storage operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors returned by [`UploadCoordinator::upload`](crate::UploadCoordinator::upload).
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The caller cancelled the upload.
    #[error("cancelled")]
    Cancelled,

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Reading the payload failed.
    #[error("source error: {0}")]
    Source(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl UploadError {
    /// Returns `true` if the caller withdrew the upload.
    ///
    /// UIs show nothing for this case rather than an error message.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, UploadError::Cancelled)
    }

    /// Returns `true` if retrying the whole upload may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, UploadError::Backend(_) | UploadError::Source(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_recognizable() {
        let err = UploadError::Cancelled;
        assert!(err.is_cancelled());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "cancelled");
    }

    #[test]
    fn backend_error_keeps_root_cause() {
        let err: UploadError = BackendError::Status {
            status: 503,
            body: "busy".into(),
        }
        .into();
        assert!(err.is_retryable());
        assert!(!err.is_cancelled());
        assert_eq!(err.to_string(), "backend error: API error 503: busy");
        assert!(matches!(
            err,
            UploadError::Backend(BackendError::Status { status: 503, .. })
        ));
    }

    #[test]
    fn api_rejection_converts() {
        let err: BackendError = ApiError::Rejected {
            message: "quota".into(),
        }
        .into();
        assert_eq!(err.to_string(), "request rejected: quota");
    }

    #[test]
    fn invalid_config_is_not_retryable() {
        assert!(!UploadError::InvalidConfig("x".into()).is_retryable());
    }
}
