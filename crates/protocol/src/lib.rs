//! Wire types for the Lago object-storage upload API.
//!
//! Every response from the upload service is wrapped in an
//! [`ApiResponse`] envelope: a `success` flag plus either a typed
//! payload or an error message.

pub mod constants;
pub mod envelope;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use envelope::{ApiError, ApiResponse};
pub use messages::{
    AbortMultipartRequest, CompleteMultipartRequest, CompleteMultipartResponse,
    InitMultipartRequest, InitMultipartResponse, SingleUploadResponse, UploadPartResponse,
};
pub use types::{Classification, CompletedPart};
