use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use super::{MediaError, MediaProviderId, MediaStore, StagedFile, StoredMedia};

/// Copies uploads into a directory the router serves read-only.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    public_dir: PathBuf,
    public_base_url: String,
}

impl LocalMediaStore {
    pub fn new(public_dir: PathBuf, public_base_url: String) -> Self {
        Self {
            public_dir,
            public_base_url,
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn id(&self) -> MediaProviderId {
        MediaProviderId::Local
    }

    async fn store(&self, file: &StagedFile) -> Result<StoredMedia, MediaError> {
        tokio::fs::create_dir_all(&self.public_dir).await?;

        let name = match file.extension() {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
            None => Uuid::new_v4().to_string(),
        };
        tokio::fs::copy(file.path(), self.public_dir.join(&name)).await?;

        Ok(StoredMedia {
            url: format!("{}/{}", self.public_base_url.trim_end_matches('/'), name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::LocalMediaStore;
    use crate::media::{MediaError, MediaStore, StagedFile};

    #[tokio::test]
    async fn stored_file_is_published_under_the_base_url() {
        let staging = tempfile::tempdir().expect("temp dir should exist");
        let public = tempfile::tempdir().expect("temp dir should exist");
        let store = LocalMediaStore::new(public.path().to_path_buf(), "/media/".to_string());

        let staged = StagedFile::write(staging.path(), "Avatar.PNG", None, b"img")
            .await
            .expect("staging should succeed");
        let stored = store.store(&staged).await.expect("store should succeed");

        assert!(stored.url.starts_with("/media/"));
        assert!(stored.url.ends_with(".png"));
        let name = stored.url.trim_start_matches("/media/");
        let copied = std::fs::read(public.path().join(name)).expect("copy should exist");
        assert_eq!(copied, b"img");
    }

    #[tokio::test]
    async fn missing_staged_file_is_an_io_error() {
        let staging = tempfile::tempdir().expect("temp dir should exist");
        let public = tempfile::tempdir().expect("temp dir should exist");
        let store = LocalMediaStore::new(public.path().to_path_buf(), "/media".to_string());

        let staged = StagedFile::write(staging.path(), "a.png", None, b"img")
            .await
            .expect("staging should succeed");
        std::fs::remove_file(staged.path()).expect("manual remove should succeed");

        let err = store.store(&staged).await.expect_err("store should fail");
        assert!(matches!(err, MediaError::Io(_)));
    }
}
