//! Upload coordinator for the Lago object-storage API.
//!
//! Small files go out in one request. Larger files are split into
//! parts and sent through a multipart session:
//!
//! 1. **Init**: open a session, receive `uploadId` + `objectKey`
//! 2. **Parts**: send each part in order, one at a time
//! 3. **Complete**: echo every part's etag back to stitch the object
//!
//! If anything fails after the session is open, the session is aborted
//! once (best effort) and the original error is returned.
//!
//! The coordinator talks to storage through [`TransferBackend`];
//! [`HttpBackend`] is the JSON-over-HTTP implementation.

pub mod backend;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod http;

// Re-export primary types for convenience.
pub use backend::{BackendFuture, TransferBackend};
pub use context::UploadContext;
pub use coordinator::{CoordinatorOptions, UploadCoordinator};
pub use error::{BackendError, UploadError};
pub use http::HttpBackend;

pub use lago_transfer::{
    ByteSource, Classification, FileSource, MemorySource, PartResult, TransferOutcome,
    TransferRequest,
};
pub use tokio_util::sync::CancellationToken;
