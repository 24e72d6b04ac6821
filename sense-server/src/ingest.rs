//! Scoped storage for uploaded clips
//!
//! Each upload is written to a uniquely named temp file owned by the request.
//! Deletion happens when the guard drops, so both success and failure paths
//! clean up without explicit bookkeeping.

use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// An uploaded clip persisted to disk for the duration of one request.
///
/// The backing file is deleted when this value is dropped.
pub struct UploadedClip {
    file: NamedTempFile,
}

impl UploadedClip {
    /// Write upload bytes to a fresh temp file under `dir`.
    ///
    /// `extension` hints the container format to downstream decoding
    /// ("wav", "mp3"); when given it becomes the file's suffix.
    pub fn write(bytes: &[u8], dir: &Path, extension: Option<&str>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".to_string()));
        }

        let suffix = extension.map(|ext| format!(".{}", ext));
        let mut builder = tempfile::Builder::new();
        builder.prefix("clip-");
        if let Some(s) = suffix.as_deref() {
            builder.suffix(s);
        }

        let mut file = builder.tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        debug!(
            "Stored {} byte upload at {}",
            bytes.len(),
            file.path().display()
        );

        Ok(Self { file })
    }

    /// Path of the stored clip.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
