//! Upload coordinator.
//!
//! Chooses between a single-shot and a chunked transfer, drives the
//! chunked loop one part at a time, and aborts the remote session when
//! anything goes wrong after it was opened.

use std::time::Duration;

use lago_protocol::constants::{ABORT_TIMEOUT, DEFAULT_MULTIPART_THRESHOLD, DEFAULT_PART_SIZE};
use lago_transfer::{
    ByteSource, PartPlan, ProgressReporter, Strategy, TransferOutcome, TransferRequest,
    TransferSession, validate_sizes,
};
use tracing::{debug, info, warn};

use crate::backend::TransferBackend;
use crate::context::UploadContext;
use crate::error::{BackendError, UploadError};

/// Tunables for an [`UploadCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// Files up to and including this size are sent in one request.
    pub multipart_threshold: u64,
    /// Size of each part of a chunked transfer.
    pub part_size: u64,
    /// Upper bound on the cleanup call after a failure.
    pub abort_timeout: Duration,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            multipart_threshold: DEFAULT_MULTIPART_THRESHOLD,
            part_size: DEFAULT_PART_SIZE,
            abort_timeout: ABORT_TIMEOUT,
        }
    }
}

/// Uploads files through a [`TransferBackend`].
///
/// Holds no per-upload state: concurrent `upload` calls on the same
/// coordinator are independent.
pub struct UploadCoordinator<B> {
    backend: B,
    options: CoordinatorOptions,
}

impl<B: TransferBackend> UploadCoordinator<B> {
    /// Creates a coordinator, rejecting a zero part size or abort timeout.
    pub fn new(backend: B, options: CoordinatorOptions) -> Result<Self, UploadError> {
        validate_sizes(options.multipart_threshold, options.part_size)
            .map_err(|e| UploadError::InvalidConfig(e.to_string()))?;
        // A zero timeout would drop the abort request before it is sent.
        if options.abort_timeout.is_zero() {
            return Err(UploadError::InvalidConfig(
                "abort timeout must be greater than zero".into(),
            ));
        }
        Ok(Self { backend, options })
    }

    /// Creates a coordinator with the default 8 MiB threshold and 5 MiB parts.
    pub fn with_defaults(backend: B) -> Self {
        Self {
            backend,
            options: CoordinatorOptions::default(),
        }
    }

    /// Returns the active options.
    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Uploads `file` and returns where it ended up.
    ///
    /// Progress goes to the context's callback: 0 first, strictly
    /// increasing afterwards, exactly 100 on success. Cancellation is
    /// honoured before any request is made and before each part.
    pub async fn upload(
        &self,
        file: &dyn ByteSource,
        ctx: &UploadContext,
    ) -> Result<TransferOutcome, UploadError> {
        let request = TransferRequest::from_source(file);
        let mut progress = ProgressReporter::new(ctx.progress_callback());

        check_cancelled(ctx)?;

        let strategy = Strategy::select(request.size, self.options.multipart_threshold);
        debug!(
            name = %request.name,
            size = request.size,
            classification = %request.classification,
            ?strategy,
            "starting upload"
        );

        match strategy {
            Strategy::Single => self.upload_single(file, &request, &mut progress).await,
            Strategy::Multipart => {
                self.upload_multipart(file, &request, ctx, &mut progress)
                    .await
            }
        }
    }

    /// Sends the whole payload in one request. Nothing to clean up on failure.
    async fn upload_single(
        &self,
        file: &dyn ByteSource,
        request: &TransferRequest,
        progress: &mut ProgressReporter,
    ) -> Result<TransferOutcome, UploadError> {
        progress.report(0);

        let data = file.read_range(0..request.size).await?;
        let resp = self.backend.upload_single(request, data).await?;
        let outcome = TransferOutcome::from_single(request, resp);

        progress.report(100);
        info!(name = %outcome.name, url = %outcome.url, "upload complete");
        Ok(outcome)
    }

    /// Opens a session, sends every part, and completes or aborts it.
    async fn upload_multipart(
        &self,
        file: &dyn ByteSource,
        request: &TransferRequest,
        ctx: &UploadContext,
        progress: &mut ProgressReporter,
    ) -> Result<TransferOutcome, UploadError> {
        let plan = PartPlan::new(request.size, self.options.part_size)
            .map_err(|e| UploadError::InvalidConfig(e.to_string()))?;

        progress.report(0);

        let init = self.backend.init(request).await?;
        let mut session = TransferSession::new(init.upload_id, init.object_key, plan);

        info!(
            upload_id = %session.upload_id(),
            object_key = %session.object_key(),
            parts = session.total_parts(),
            "multipart session opened"
        );

        if let Err(err) = self
            .send_parts(file, &mut session, ctx, progress)
            .await
        {
            self.abort_quietly(&session, &err).await;
            return Err(err);
        }

        // `complete` and `abort` are mutually exclusive: once completion
        // has been requested the session is never aborted.
        let parts = match session.completion_parts() {
            Ok(parts) => parts,
            Err(e) => {
                let err = UploadError::Backend(BackendError::Malformed(e.to_string()));
                self.abort_quietly(&session, &err).await;
                return Err(err);
            }
        };

        let resp = self
            .backend
            .complete(session.upload_id(), session.object_key(), &parts)
            .await?;

        let outcome = TransferOutcome::from_multipart(request, resp.url, session.object_key());
        progress.report(100);

        info!(
            upload_id = %session.upload_id(),
            url = %outcome.url,
            "upload complete"
        );
        Ok(outcome)
    }

    /// Sends parts strictly in order, checking cancellation before each.
    async fn send_parts(
        &self,
        file: &dyn ByteSource,
        session: &mut TransferSession,
        ctx: &UploadContext,
        progress: &mut ProgressReporter,
    ) -> Result<(), UploadError> {
        let plan = *session.plan();

        for part in plan.parts() {
            check_cancelled(ctx)?;

            let data = file.read_range(part.range()).await?;
            let result = self
                .backend
                .upload_part(session.upload_id(), session.object_key(), part.number, data)
                .await?;

            if result.part_number != part.number {
                debug!(
                    sent = part.number,
                    recorded = result.part_number,
                    "backend renumbered part"
                );
            }
            debug!(
                upload_id = %session.upload_id(),
                part = part.number,
                of = plan.total_parts(),
                bytes = part.len,
                "part uploaded"
            );

            let pct = session.record(result);
            progress.report(pct);
        }

        Ok(())
    }

    /// Best-effort abort. Failures and timeouts are logged, never returned.
    async fn abort_quietly(&self, session: &TransferSession, cause: &UploadError) {
        info!(
            upload_id = %session.upload_id(),
            completed = session.completed().len(),
            of = session.total_parts(),
            cause = %cause,
            "aborting multipart session"
        );

        let abort = self
            .backend
            .abort(session.upload_id(), session.object_key());
        match tokio::time::timeout(self.options.abort_timeout, abort).await {
            Ok(Ok(())) => debug!(upload_id = %session.upload_id(), "session aborted"),
            Ok(Err(e)) => warn!(
                upload_id = %session.upload_id(),
                error = %e,
                "failed to abort session"
            ),
            Err(_) => warn!(
                upload_id = %session.upload_id(),
                timeout = ?self.options.abort_timeout,
                "abort timed out"
            ),
        }
    }
}

fn check_cancelled(ctx: &UploadContext) -> Result<(), UploadError> {
    if ctx.is_cancelled() {
        Err(UploadError::Cancelled)
    } else {
        Ok(())
    }
}
