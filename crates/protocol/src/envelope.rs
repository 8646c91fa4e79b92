use serde::{Deserialize, Serialize};

/// Failure reported inside an otherwise well-formed envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request rejected: {message}")]
    Rejected { message: String },

    #[error("response carried no data")]
    MissingData,
}

/// Envelope for every response from the upload service.
///
/// `data` is only meaningful when `success` is true; `message` carries
/// the server's explanation otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful envelope around `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Creates a failed envelope with the given message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Collapses the envelope into the payload or a typed error.
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "no message from server".into()),
            });
        }
        self.data.ok_or(ApiError::MissingData)
    }
}

impl ApiResponse<serde_json::Value> {
    /// Checks the success flag only, ignoring any payload.
    ///
    /// Used for operations whose response body carries nothing significant.
    pub fn into_unit(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "no message from server".into()),
            })
        }
    }
}
