//! Transfer planning for chunked uploads.
//!
//! Everything here is transport-agnostic: how a file is split into
//! parts, what a session has acknowledged so far, and how progress is
//! reported. The upload coordinator drives these types against a
//! remote backend.

mod plan;
mod progress;
mod source;
mod types;
mod validation;

pub use plan::{PartPlan, PartRange, Strategy};
pub use progress::{ProgressCallback, ProgressReporter};
pub use source::{ByteSource, FileSource, MemorySource, ReadFuture, detect_mime_type};
pub use types::{EXTRA_OBJECT_KEY, PartResult, TransferOutcome, TransferRequest, TransferSession};
pub use validation::validate_sizes;

pub use lago_protocol::Classification;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid part size: {0}")]
    InvalidPartSize(String),

    #[error("{parts} parts exceed the part number range")]
    TooManyParts { parts: u64 },

    #[error("part coverage mismatch: {0}")]
    PartCoverage(String),
}
