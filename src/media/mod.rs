use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::MediaConfig;

mod local;
mod remote;
mod staged;

pub use local::LocalMediaStore;
pub use remote::HttpMediaStore;
pub use staged::StagedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaProviderId {
    Local,
    Remote,
}

impl MediaProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaProviderId::Local => "local",
            MediaProviderId::Remote => "remote",
        }
    }
}

impl std::str::FromStr for MediaProviderId {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "local" => Ok(MediaProviderId::Local),
            "remote" => Ok(MediaProviderId::Remote),
            other => Err(format!("unsupported media provider: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("media upload request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("media provider rejected the upload with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("media provider response carried no url")]
    MissingUrl,
}

/// Capability that turns a staged upload into a publicly reachable url.
#[async_trait]
pub trait MediaStore: Send + Sync {
    fn id(&self) -> MediaProviderId;

    async fn store(&self, file: &StagedFile) -> Result<StoredMedia, MediaError>;
}

/// Hands the staged file to the store and always discards it afterwards.
/// Provider failures are logged and surface as `None`.
pub async fn upload_staged(store: &dyn MediaStore, file: StagedFile) -> Option<StoredMedia> {
    match store.store(&file).await {
        Ok(stored) => Some(stored),
        Err(err) => {
            tracing::warn!(
                provider = store.id().as_str(),
                file = file.original_name(),
                error = %err,
                "media upload failed"
            );
            None
        }
    }
}

pub fn build_media_store(cfg: &MediaConfig) -> anyhow::Result<Arc<dyn MediaStore>> {
    let store: Arc<dyn MediaStore> = match cfg.provider {
        MediaProviderId::Local => Arc::new(LocalMediaStore::new(
            cfg.public_dir.clone(),
            cfg.public_base_url.clone(),
        )),
        MediaProviderId::Remote => {
            let endpoint = cfg
                .remote_endpoint
                .clone()
                .ok_or_else(|| anyhow::anyhow!("media.remote_endpoint is required"))?;
            Arc::new(HttpMediaStore::new(
                endpoint,
                cfg.remote_api_key.clone(),
                std::time::Duration::from_secs(cfg.request_timeout_secs),
            )?)
        }
    };
    tracing::info!(provider = store.id().as_str(), "media store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::{
        MediaError, MediaProviderId, MediaStore, StagedFile, StoredMedia, upload_staged,
    };

    struct FailingStore;

    #[async_trait]
    impl MediaStore for FailingStore {
        fn id(&self) -> MediaProviderId {
            MediaProviderId::Remote
        }

        async fn store(&self, _file: &StagedFile) -> Result<StoredMedia, MediaError> {
            Err(MediaError::MissingUrl)
        }
    }

    #[test]
    fn provider_ids_parse_case_insensitively() {
        assert_eq!("LOCAL".parse::<MediaProviderId>(), Ok(MediaProviderId::Local));
        assert_eq!("remote".parse::<MediaProviderId>(), Ok(MediaProviderId::Remote));
        assert!("s3".parse::<MediaProviderId>().is_err());
    }

    #[tokio::test]
    async fn failed_upload_yields_nothing_and_removes_staged_file() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let staged = StagedFile::write(dir.path(), "a.png", None, b"bytes")
            .await
            .expect("staging should succeed");
        let path = staged.path().to_path_buf();

        assert!(upload_staged(&FailingStore, staged).await.is_none());
        assert!(!path.exists());
    }
}
