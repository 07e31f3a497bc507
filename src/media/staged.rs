use std::path::{Path, PathBuf};

use uuid::Uuid;

/// An upload written to the staging directory. The file is removed when the
/// guard drops, whichever way the request finishes.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    original_name: String,
    content_type: Option<String>,
}

impl StagedFile {
    /// Reserves a uniquely named file in the staging directory and returns it
    /// open for writing alongside its guard.
    pub async fn create(
        staging_dir: &Path,
        original_name: &str,
        content_type: Option<String>,
    ) -> std::io::Result<(Self, tokio::fs::File)> {
        tokio::fs::create_dir_all(staging_dir).await?;

        let stored_name = match extension_of(original_name) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        let guard = Self {
            path: staging_dir.join(stored_name),
            original_name: original_name.to_string(),
            content_type,
        };
        let file = tokio::fs::File::create(&guard.path).await?;
        Ok((guard, file))
    }

    #[cfg(test)]
    pub(crate) async fn write(
        staging_dir: &Path,
        original_name: &str,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> std::io::Result<Self> {
        use tokio::io::AsyncWriteExt;

        let (guard, mut file) = Self::create(staging_dir, original_name, content_type).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn extension(&self) -> Option<&str> {
        extension_of(&self.original_name)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to remove staged upload");
            }
        }
    }
}

/// Short alphanumeric extensions only; anything else is dropped from the stored name.
fn extension_of(name: &str) -> Option<&str> {
    let ext = Path::new(name).extension()?.to_str()?;
    let valid = !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}
