//! Client-side upload validation.
//!
//! Runs before any network call. A file that fails here never reaches the
//! backend.

use std::path::Path;

use labdash_contracts::error::{DashError, DashResult};

/// Largest accepted upload, inclusive: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// The document formats the backend can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Pdf,
    Jpeg,
    Png,
}

impl FileKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Check a prospective upload by its metadata.
///
/// The MIME type wins when the caller knows it; otherwise the file name's
/// extension decides.
pub fn validate_upload(file_name: &str, mime_type: Option<&str>, size: u64) -> DashResult<FileKind> {
    let kind = match mime_type {
        Some(mime) => FileKind::from_mime(mime),
        None => FileKind::from_file_name(file_name),
    }
    .ok_or_else(|| {
        DashError::validation(format!(
            "'{}' has an unsupported file type; upload a PDF, JPEG, or PNG file",
            file_name
        ))
    })?;

    if size == 0 {
        return Err(DashError::validation(format!("'{}' is empty", file_name)));
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(DashError::validation(format!(
            "'{}' is {} bytes; the maximum file size is 10MB",
            file_name, size
        )));
    }

    Ok(kind)
}

/// A file queued for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: Option<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type,
            content,
        }
    }

    /// Read `path` from disk. The MIME type is left unset so validation
    /// falls back to the extension. Type and size are checked against the
    /// file's metadata before any content is read.
    pub fn from_path(path: &Path) -> DashResult<Self> {
        let unreadable =
            |e: std::io::Error| DashError::validation(format!("failed to read '{}': {}", path.display(), e));
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let size = std::fs::metadata(path).map_err(unreadable)?.len();
        validate_upload(&file_name, None, size)?;

        let content = std::fs::read(path).map_err(unreadable)?;
        Ok(Self::new(file_name, None, content))
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Validate this file and return its detected kind.
    pub fn validate(&self) -> DashResult<FileKind> {
        validate_upload(&self.file_name, self.mime_type.as_deref(), self.size())
    }
}
