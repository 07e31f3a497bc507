use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::{MediaError, MediaProviderId, MediaStore, StagedFile, StoredMedia};

const BODY_SNIPPET_LEN: usize = 256;

/// Posts uploads to a hosted media service as `multipart/form-data`.
#[derive(Debug, Clone)]
pub struct HttpMediaStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

impl UploadResponse {
    fn into_url(self) -> Option<String> {
        self.secure_url
            .or(self.url)
            .filter(|url| !url.trim().is_empty())
    }
}

impl HttpMediaStore {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    fn id(&self) -> MediaProviderId {
        MediaProviderId::Remote
    }

    async fn store(&self, file: &StagedFile) -> Result<StoredMedia, MediaError> {
        let bytes = tokio::fs::read(file.path()).await?;

        let mut part = Part::bytes(bytes).file_name(file.original_name().to_string());
        if let Some(content_type) = file.content_type() {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new()
            .text("resource_type", "auto")
            .part("file", part);

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(api_key) = self.api_key.as_deref() {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(BODY_SNIPPET_LEN).collect(),
            });
        }

        let parsed: UploadResponse = response.json().await?;
        let url = parsed.into_url().ok_or(MediaError::MissingUrl)?;
        Ok(StoredMedia { url })
    }
}
