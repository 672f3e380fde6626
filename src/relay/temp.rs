//! Short-lived on-disk copies of uploaded attachments.

use std::path::Path;
use tempfile::NamedTempFile;

/// An uploaded file written to the scratch directory.
///
/// The file is deleted when the guard is dropped, on every exit path.
/// [`TempUpload::remove`] deletes it explicitly and logs failures.
#[derive(Debug)]
pub struct TempUpload {
    file: NamedTempFile,
}

impl TempUpload {
    /// Write `bytes` to a fresh `upload_*` file inside `dir`
    pub async fn write(dir: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let file = tempfile::Builder::new()
            .prefix("upload_")
            .tempfile_in(dir)?;
        tokio::fs::write(file.path(), bytes).await?;

        tracing::debug!(path = %file.path().display(), size = bytes.len(), "stored temporary upload");
        Ok(Self { file })
    }

    /// Location of the stored file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now
    pub fn remove(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => tracing::debug!(path = %path.display(), "removed temporary upload"),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove temporary upload")
            }
        }
    }
}
