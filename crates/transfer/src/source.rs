use std::future::Future;
use std::io::{self, SeekFrom};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

/// Fallback MIME type when nothing better is known.
const OCTET_STREAM: &str = "application/octet-stream";

/// A boxed future returned by [`ByteSource::read_range`].
pub type ReadFuture<'a> = Pin<Box<dyn Future<Output = io::Result<Vec<u8>>> + Send + 'a>>;

/// A file-like payload with a known length, name, and MIME type.
///
/// Parts are read on demand so large files never have to be held in
/// memory whole.
pub trait ByteSource: Send + Sync {
    /// Display name sent to the storage service.
    fn name(&self) -> &str;

    /// Declared MIME type.
    fn mime_type(&self) -> &str;

    /// Total length in bytes.
    fn size(&self) -> u64;

    /// Reads exactly the bytes in `range`.
    fn read_range(&self, range: Range<u64>) -> ReadFuture<'_>;
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// An in-memory payload.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    mime_type: String,
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }
}

impl ByteSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_range(&self, range: Range<u64>) -> ReadFuture<'_> {
        Box::pin(async move {
            let start = usize::try_from(range.start).unwrap_or(usize::MAX);
            let end = usize::try_from(range.end).unwrap_or(usize::MAX);
            self.data
                .get(start..end)
                .map(<[u8]>::to_vec)
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("range {start}..{end} outside {} bytes", self.data.len()),
                    )
                })
        })
    }
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// A file on disk, read part by part.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
    mime_type: String,
    size: u64,
}

impl FileSource {
    /// Opens `path`, recording its current length.
    ///
    /// When `mime_type` is `None` it is guessed from the file extension.
    pub async fn open(path: &Path, mime_type: Option<&str>) -> io::Result<Self> {
        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_type
            .map(str::to_string)
            .unwrap_or_else(|| detect_mime_type(path).to_string());

        debug!(path = %path.display(), size = meta.len(), mime = %mime_type, "opened file source");

        Ok(Self {
            path: path.to_path_buf(),
            name,
            mime_type,
            size: meta.len(),
        })
    }

    /// Path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_range(&self, range: Range<u64>) -> ReadFuture<'_> {
        Box::pin(async move {
            let len = usize::try_from(range.end.saturating_sub(range.start))
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            let mut file = tokio::fs::File::open(&self.path).await?;
            file.seek(SeekFrom::Start(range.start)).await?;
            let mut buf = vec![0u8; len];
            file.read_exact(&mut buf).await?;
            Ok(buf)
        })
    }
}

/// Guesses a MIME type from a file extension.
///
/// Covers the formats the marketplace accepts; everything else is
/// `application/octet-stream`.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("txt") => "text/plain",
        _ => OCTET_STREAM,
    }
}
