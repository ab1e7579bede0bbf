//! Working directories and transient files

use crate::convert::source_extension;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Length of the random token in generated output names
const TOKEN_LEN: usize = 8;

/// Create `path` and its parents if missing.
///
/// Failure is logged, not returned: the write that follows reports the
/// concrete I/O error.
pub async fn ensure_dir(path: &Path) -> PathBuf {
    match tokio::fs::create_dir_all(path).await {
        Ok(()) => tracing::debug!(dir = %path.display(), "created or verified directory"),
        Err(e) => tracing::warn!(dir = %path.display(), error = %e, "failed to create directory"),
    }
    path.to_path_buf()
}

/// Output filename derived from `original_name`:
/// `<stem>-<unix millis>-<random token>.pdf`.
pub fn make_output_name(original_name: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "output".to_string());
    let timestamp = chrono::Utc::now().timestamp_millis();
    let token = uuid::Uuid::new_v4().simple().to_string();

    format!("{}-{}-{}.pdf", stem, timestamp, &token[..TOKEN_LEN])
}

/// Uploaded file staged on disk for the duration of one request.
///
/// The file is deleted when this value is closed or dropped.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    original_name: String,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Filename as claimed by the uploader
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Async write handle onto the staged file
    pub fn writer(&self) -> Result<tokio::fs::File> {
        let handle = self.file.as_file().try_clone()?;
        Ok(tokio::fs::File::from_std(handle))
    }

    /// Delete the staged file, reporting the error instead of ignoring it
    pub fn close(self) -> Result<()> {
        self.file.close()?;
        Ok(())
    }
}

/// Create an empty staged upload under `upload_dir`.
///
/// The on-disk name is generated; only the extension of `original_name` is
/// kept.
pub fn stage_upload(upload_dir: &Path, original_name: &str) -> Result<StagedUpload> {
    let suffix = source_extension(original_name);
    let file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(upload_dir)?;

    tracing::debug!(path = %file.path().display(), original_name, "staged upload");

    Ok(StagedUpload {
        file,
        original_name: original_name.to_string(),
    })
}
