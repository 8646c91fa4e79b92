use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse content type sent alongside an upload.
///
/// Derived from the declared MIME type; the storage service uses it to
/// pick a bucket prefix and any post-processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Image,
    Video,
    #[default]
    File,
}

impl Classification {
    /// Classifies a MIME type by its top-level prefix.
    ///
    /// Anything that is not `image/*` or `video/*` is a generic file.
    pub fn from_mime(mime: &str) -> Self {
        let top = mime
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match top.as_str() {
            "image" if mime.contains('/') => Classification::Image,
            "video" if mime.contains('/') => Classification::Video,
            _ => Classification::File,
        }
    }

    /// Wire name of this classification.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Image => "image",
            Classification::Video => "video",
            Classification::File => "file",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A part acknowledged by the storage service.
///
/// `etag` is opaque and must be echoed back verbatim on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedPart {
    pub part_number: u32,
    pub etag: String,
}
