use std::time::Duration;

/// Files up to and including this many bytes are sent in one request (8 MiB).
pub const DEFAULT_MULTIPART_THRESHOLD: u64 = 8 * 1024 * 1024;

/// Size of each part of a chunked transfer (5 MiB).
///
/// The last part may be shorter.
pub const DEFAULT_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Timeout for a single request/response round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on the best-effort cleanup call after a failed transfer.
pub const ABORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Single-shot upload endpoint (raw body).
pub const PATH_UPLOAD_SINGLE: &str = "/upload/single";

/// Opens a multipart session.
pub const PATH_MULTIPART_INIT: &str = "/upload/multipart/init";

/// Receives one part of a multipart session (raw body).
pub const PATH_MULTIPART_PART: &str = "/upload/multipart/part";

/// Stitches the uploaded parts together.
pub const PATH_MULTIPART_COMPLETE: &str = "/upload/multipart/complete";

/// Discards a multipart session and its parts.
pub const PATH_MULTIPART_ABORT: &str = "/upload/multipart/abort";
