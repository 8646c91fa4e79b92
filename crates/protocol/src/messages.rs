use serde::{Deserialize, Serialize};

use crate::types::{Classification, CompletedPart};

// ---------------------------------------------------------------------------
// Single-shot upload
// ---------------------------------------------------------------------------

/// Result of a single-shot upload.
///
/// Only `url` is guaranteed; the rest are echoed when the server knows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleUploadResponse {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Multipart session
// ---------------------------------------------------------------------------

/// Opens a multipart session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitMultipartRequest {
    pub file_name: String,
    pub mime_type: String,
    #[serde(rename = "type")]
    pub classification: Classification,
}

/// Identifiers of a freshly opened multipart session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitMultipartResponse {
    pub upload_id: String,
    pub object_key: String,
}

/// Acknowledges one uploaded part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPartResponse {
    pub part_number: u32,
    pub etag: String,
}

impl From<UploadPartResponse> for CompletedPart {
    fn from(resp: UploadPartResponse) -> Self {
        CompletedPart {
            part_number: resp.part_number,
            etag: resp.etag,
        }
    }
}

/// Stitches uploaded parts into the final object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMultipartRequest {
    pub upload_id: String,
    pub object_key: String,
    pub parts: Vec<CompletedPart>,
}

/// Location of the stitched object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMultipartResponse {
    pub url: String,
}

/// Discards a multipart session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortMultipartRequest {
    pub upload_id: String,
    pub object_key: String,
}
