//! Multipart uploads spooled to a temporary file for the lifetime of a request.

use std::io;
use std::path::{Path, PathBuf};

use axum::extract::multipart::{Multipart, MultipartError};
use base64::{engine::general_purpose::STANDARD, Engine};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

/// Name of the optional text field carrying the prompt.
pub const PROMPT_FIELD: &str = "prompt";

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Errors raised while reading a multipart body.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The body is not valid multipart or exceeded the size limit.
    #[error("invalid multipart payload: {0}")]
    Multipart(#[from] MultipartError),
    /// The upload could not be written to disk.
    #[error("failed to store upload: {0}")]
    Io(#[from] io::Error),
}

/// A file received from a client and stored in the upload directory.
///
/// The file is removed by [`UploadedFile::cleanup`], or when the value is dropped.
#[derive(Debug)]
pub struct UploadedFile {
    file: NamedTempFile,
    mime_type: String,
    original_name: Option<String>,
    len: u64,
}

impl UploadedFile {
    /// Location of the stored bytes.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// MIME type declared by the client, or guessed from the original filename.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Filename supplied by the client, if any.
    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    /// Number of bytes stored.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the upload carried no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads the stored bytes back and encodes them as standard padded base64.
    pub async fn read_base64(&self) -> io::Result<String> {
        let bytes = tokio::fs::read(self.path()).await?;
        Ok(STANDARD.encode(bytes))
    }

    /// Deletes the stored file. Failures are logged and otherwise ignored.
    pub fn cleanup(self) {
        let path: PathBuf = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!(path = %path.display(), "removed uploaded file"),
            Err(err) => error!(path = %path.display(), error = %err, "error deleting uploaded file"),
        }
    }
}

/// Fields of interest pulled out of a multipart body.
#[derive(Debug, Default)]
pub struct MultipartUpload {
    /// Value of the `prompt` text field.
    pub prompt: Option<String>,
    /// First non-empty file found under the requested field name.
    pub file: Option<UploadedFile>,
}

/// Reads `prompt` and the first file named `file_field`, spooling the file into `upload_dir`.
///
/// Other fields are skipped. A later file under the same name is ignored.
pub async fn read_multipart(
    multipart: &mut Multipart,
    file_field: &str,
    upload_dir: &Path,
) -> Result<MultipartUpload, UploadError> {
    let mut upload = MultipartUpload::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == PROMPT_FIELD && field.file_name().is_none() {
            upload.prompt = Some(field.text().await?);
            continue;
        }
        if name != file_field || upload.file.is_some() {
            continue;
        }

        let original_name = field.file_name().map(str::to_string);
        let mime_type = resolve_mime_type(field.content_type(), original_name.as_deref());

        let temp = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(upload_dir)?;
        let mut writer = tokio::fs::File::from_std(temp.reopen()?);
        let mut len = 0u64;
        while let Some(chunk) = field.chunk().await? {
            writer.write_all(&chunk).await?;
            len += chunk.len() as u64;
        }
        writer.flush().await?;

        let stored = UploadedFile {
            file: temp,
            mime_type,
            original_name,
            len,
        };
        if stored.is_empty() {
            stored.cleanup();
            continue;
        }
        debug!(
            field = %name,
            path = %stored.path().display(),
            mime_type = %stored.mime_type,
            bytes = stored.len,
            "stored upload"
        );
        upload.file = Some(stored);
    }

    Ok(upload)
}

/// Declared content type first, then a guess from the filename, then `application/octet-stream`.
pub fn resolve_mime_type(declared: Option<&str>, file_name: Option<&str>) -> String {
    declared
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
        .map(str::to_string)
        .or_else(|| {
            file_name
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|mime| mime.to_string())
        })
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_wins() {
        assert_eq!(resolve_mime_type(Some("image/webp"), Some("a.png")), "image/webp");
    }

    #[test]
    fn guesses_from_filename() {
        assert_eq!(resolve_mime_type(None, Some("notes.pdf")), "application/pdf");
        assert_eq!(resolve_mime_type(Some(" "), Some("clip.mp3")), "audio/mpeg");
    }

    #[test]
    fn falls_back_to_octet_stream() {
        assert_eq!(resolve_mime_type(None, Some("blob")), "application/octet-stream");
        assert_eq!(resolve_mime_type(None, None), "application/octet-stream");
    }

    #[tokio::test]
    async fn cleanup_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let temp = tempfile::Builder::new().tempfile_in(dir.path()).unwrap();
        std::fs::write(temp.path(), b"hello").unwrap();
        let upload = UploadedFile {
            file: temp,
            mime_type: "text/plain".into(),
            original_name: Some("hello.txt".into()),
            len: 5,
        };

        assert_eq!(upload.read_base64().await.unwrap(), "aGVsbG8=");
        let path = upload.path().to_path_buf();
        upload.cleanup();
        assert!(!path.exists());
    }
}
