//! Per-upload caller context: progress callback and cancellation.

use std::sync::Arc;

use lago_transfer::ProgressCallback;
use tokio_util::sync::CancellationToken;

/// What the caller hands to a single upload.
#[derive(Clone, Default)]
pub struct UploadContext {
    cancel: CancellationToken,
    on_progress: Option<ProgressCallback>,
}

impl UploadContext {
    /// Creates a context with a fresh cancellation token and no callback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `cancel` as the cancellation signal.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets the progress callback (integer percent, 0–100).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Returns a clone of the cancellation token.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns `true` once the caller has cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn progress_callback(&self) -> Option<ProgressCallback> {
        self.on_progress.clone()
    }
}

impl std::fmt::Debug for UploadContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadContext")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}
