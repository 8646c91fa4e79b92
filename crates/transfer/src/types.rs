use std::collections::{BTreeMap, HashMap};

use lago_protocol::{Classification, CompletedPart, SingleUploadResponse};
use serde::Serialize;

use crate::TransferError;
use crate::plan::PartPlan;
use crate::source::ByteSource;

/// Key under which the storage object key is exposed in [`TransferOutcome::extra`].
pub const EXTRA_OBJECT_KEY: &str = "objectKey";

/// Immutable description of the file being moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub classification: Classification,
}

impl TransferRequest {
    /// Builds a request, classifying the payload by its MIME type.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        let mime_type = mime_type.into();
        let classification = Classification::from_mime(&mime_type);
        Self {
            name: name.into(),
            mime_type,
            size,
            classification,
        }
    }

    /// Snapshot of a byte source's metadata.
    pub fn from_source(source: &dyn ByteSource) -> Self {
        Self::new(source.name(), source.mime_type(), source.size())
    }
}

/// A part acknowledged by the backend.
///
/// `part_number` is the number the backend reported back, which is
/// what must be echoed on completion along with the opaque `etag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartResult {
    pub part_number: u32,
    pub etag: String,
}

impl From<PartResult> for CompletedPart {
    fn from(part: PartResult) -> Self {
        CompletedPart {
            part_number: part.part_number,
            etag: part.etag,
        }
    }
}

impl From<&PartResult> for CompletedPart {
    fn from(part: &PartResult) -> Self {
        CompletedPart {
            part_number: part.part_number,
            etag: part.etag.clone(),
        }
    }
}

/// Final result of an upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub url: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub classification: Classification,
    /// Opaque values for collaborators, e.g. the storage object key.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

impl TransferOutcome {
    /// Maps a single-shot response, falling back to the request for
    /// anything the server did not echo.
    pub fn from_single(request: &TransferRequest, resp: SingleUploadResponse) -> Self {
        let mut extra = HashMap::new();
        if let Some(key) = resp.object_key {
            extra.insert(EXTRA_OBJECT_KEY.to_string(), key);
        }
        Self {
            url: resp.url,
            name: resp.name.unwrap_or_else(|| request.name.clone()),
            size: resp.size.unwrap_or(request.size),
            mime_type: resp.mime_type.unwrap_or_else(|| request.mime_type.clone()),
            classification: request.classification,
            extra,
        }
    }

    /// Maps a completed multipart session.
    pub fn from_multipart(request: &TransferRequest, url: String, object_key: &str) -> Self {
        let mut extra = HashMap::new();
        extra.insert(EXTRA_OBJECT_KEY.to_string(), object_key.to_string());
        Self {
            url,
            name: request.name.clone(),
            size: request.size,
            mime_type: request.mime_type.clone(),
            classification: request.classification,
            extra,
        }
    }

    /// Storage object key, when the backend reported one.
    pub fn object_key(&self) -> Option<&str> {
        self.extra.get(EXTRA_OBJECT_KEY).map(String::as_str)
    }
}

/// An in-progress chunked transfer.
///
/// Owned by exactly one upload; never shared between uploads.
#[derive(Debug)]
pub struct TransferSession {
    upload_id: String,
    object_key: String,
    plan: PartPlan,
    completed: Vec<PartResult>,
    progress: u8,
}

impl TransferSession {
    /// Creates a session for identifiers returned by `init`.
    pub fn new(upload_id: String, object_key: String, plan: PartPlan) -> Self {
        Self {
            upload_id,
            object_key,
            plan,
            completed: Vec::with_capacity(plan.total_parts().min(1024) as usize),
            progress: 0,
        }
    }

    /// Opaque session identifier.
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// Opaque storage object key.
    pub fn object_key(&self) -> &str {
        &self.object_key
    }

    /// Part layout of this session.
    pub fn plan(&self) -> &PartPlan {
        &self.plan
    }

    /// `ceil(size / part_size)`.
    pub fn total_parts(&self) -> u32 {
        self.plan.total_parts()
    }

    /// Records an acknowledged part and returns the new progress percentage.
    pub fn record(&mut self, part: PartResult) -> u8 {
        self.completed.push(part);
        let done = u32::try_from(self.completed.len()).unwrap_or(u32::MAX);
        self.progress = self.plan.progress_after(done);
        self.progress
    }

    /// Parts acknowledged so far, in arrival order.
    pub fn completed(&self) -> &[PartResult] {
        &self.completed
    }

    /// Current progress percentage.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Returns `true` once every planned part has been acknowledged.
    pub fn is_complete(&self) -> bool {
        self.completed.len() == self.plan.total_parts() as usize
    }

    /// Returns the parts to send on completion, ordered by part number.
    ///
    /// Fails unless the acknowledged part numbers are exactly
    /// `1..=total_parts`, each once.
    pub fn completion_parts(&self) -> Result<Vec<PartResult>, TransferError> {
        let total = self.plan.total_parts();
        let mut by_number: BTreeMap<u32, &PartResult> = BTreeMap::new();
        for part in &self.completed {
            if part.part_number == 0 || part.part_number > total {
                return Err(TransferError::PartCoverage(format!(
                    "part number {} outside 1..={total}",
                    part.part_number
                )));
            }
            if by_number.insert(part.part_number, part).is_some() {
                return Err(TransferError::PartCoverage(format!(
                    "part number {} acknowledged twice",
                    part.part_number
                )));
            }
        }
        if by_number.len() != total as usize {
            return Err(TransferError::PartCoverage(format!(
                "{} of {total} parts acknowledged",
                by_number.len()
            )));
        }
        Ok(by_number.into_values().cloned().collect())
    }
}
