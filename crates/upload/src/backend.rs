//! Transfer backend trait.
//!
//! The five remote operations the coordinator drives.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use lago_protocol::{CompleteMultipartResponse, InitMultipartResponse, SingleUploadResponse};
use lago_transfer::{PartResult, TransferRequest};

use crate::error::BackendError;

/// A boxed future returned by backend operations.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

/// Remote object storage.
pub trait TransferBackend: Send + Sync {
    /// Uploads a whole payload in one request.
    fn upload_single<'a>(
        &'a self,
        request: &'a TransferRequest,
        data: Vec<u8>,
    ) -> BackendFuture<'a, SingleUploadResponse>;

    /// Opens a multipart session.
    fn init<'a>(&'a self, request: &'a TransferRequest) -> BackendFuture<'a, InitMultipartResponse>;

    /// Uploads one part; the backend reports the part number it recorded.
    fn upload_part<'a>(
        &'a self,
        upload_id: &'a str,
        object_key: &'a str,
        part_number: u32,
        data: Vec<u8>,
    ) -> BackendFuture<'a, PartResult>;

    /// Stitches the given parts, ordered by part number.
    fn complete<'a>(
        &'a self,
        upload_id: &'a str,
        object_key: &'a str,
        parts: &'a [PartResult],
    ) -> BackendFuture<'a, CompleteMultipartResponse>;

    /// Discards a multipart session.
    fn abort<'a>(&'a self, upload_id: &'a str, object_key: &'a str) -> BackendFuture<'a, ()>;
}

impl<B: TransferBackend + ?Sized> TransferBackend for Arc<B> {
    fn upload_single<'a>(
        &'a self,
        request: &'a TransferRequest,
        data: Vec<u8>,
    ) -> BackendFuture<'a, SingleUploadResponse> {
        (**self).upload_single(request, data)
    }

    fn init<'a>(&'a self, request: &'a TransferRequest) -> BackendFuture<'a, InitMultipartResponse> {
        (**self).init(request)
    }

    fn upload_part<'a>(
        &'a self,
        upload_id: &'a str,
        object_key: &'a str,
        part_number: u32,
        data: Vec<u8>,
    ) -> BackendFuture<'a, PartResult> {
        (**self).upload_part(upload_id, object_key, part_number, data)
    }

    fn complete<'a>(
        &'a self,
        upload_id: &'a str,
        object_key: &'a str,
        parts: &'a [PartResult],
    ) -> BackendFuture<'a, CompleteMultipartResponse> {
        (**self).complete(upload_id, object_key, parts)
    }

    fn abort<'a>(&'a self, upload_id: &'a str, object_key: &'a str) -> BackendFuture<'a, ()> {
        (**self).abort(upload_id, object_key)
    }
}
