use std::{collections::HashMap, path::Path};

use axum::{
    extract::{Multipart, multipart::MultipartError},
    http::StatusCode,
};
use tokio::io::AsyncWriteExt;

use crate::{error::AppError, media::StagedFile};

/// A parsed `multipart/form-data` body. File parts are streamed chunk by chunk
/// into the staging directory; the first non-empty part per field name wins.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, StagedFile>,
}

impl MultipartForm {
    pub async fn parse(mut multipart: Multipart, staging_dir: &Path) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(mut field) = multipart.next_field().await.map_err(rejected)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);

            match file_name {
                Some(file_name) if !file_name.is_empty() => {
                    if form.files.contains_key(&name) {
                        continue;
                    }
                    let (staged, mut file) =
                        StagedFile::create(staging_dir, &file_name, content_type)
                            .await
                            .map_err(staging_failed)?;

                    let mut written = 0usize;
                    while let Some(chunk) = field.chunk().await.map_err(rejected)? {
                        written += chunk.len();
                        file.write_all(&chunk).await.map_err(staging_failed)?;
                    }
                    file.flush().await.map_err(staging_failed)?;

                    if written > 0 {
                        form.files.insert(name, staged);
                    }
                }
                _ => {
                    let text = field.text().await.map_err(rejected)?;
                    form.fields.entry(name).or_insert(text);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<StagedFile> {
        self.files.remove(name)
    }
}

/// Keeps the rejection's own status for oversized bodies.
fn rejected(err: MultipartError) -> AppError {
    tracing::debug!(error = %err, "multipart body rejected");
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(err.body_text())
    } else {
        AppError::validation("Invalid multipart body")
    }
}

fn staging_failed(err: std::io::Error) -> AppError {
    tracing::error!(error = %err, "failed to stage upload");
    AppError::internal("Failed to store upload")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::{
        Router,
        body::{self, Body},
        extract::{DefaultBodyLimit, Multipart, State},
        http::{Request, StatusCode, header},
        routing::post,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::MultipartForm;
    use crate::response::{ApiResult, JsonApiResponse};

    const BOUNDARY: &str = "form-boundary";

    fn body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, file_name, bytes) in parts {
            let disposition = match file_name {
                Some(file_name) => format!("name=\"{name}\"; filename=\"{file_name}\""),
                None => format!("name=\"{name}\""),
            };
            out.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; {disposition}\r\n\r\n")
                    .as_bytes(),
            );
            out.extend_from_slice(bytes);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        out
    }

    async fn upload(
        State(staging): State<PathBuf>,
        multipart: Multipart,
    ) -> ApiResult<Value> {
        let mut form = MultipartForm::parse(multipart, &staging).await?;
        let staged_bytes = form
            .take_file("file")
            .and_then(|file| std::fs::read(file.path()).ok())
            .map(|bytes| bytes.len());
        JsonApiResponse::with_status(
            StatusCode::OK,
            "parsed",
            json!({ "title": form.text("title"), "stagedBytes": staged_bytes }),
        )
    }

    fn app(staging: PathBuf, limit: usize) -> Router {
        Router::new()
            .route("/upload", post(upload))
            .layer(DefaultBodyLimit::max(limit))
            .with_state(staging)
    }

    async fn send(app: Router, payload: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(payload))
            .expect("request should build");
        let response = app.oneshot(request).await.expect("request should complete");
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        (status, serde_json::from_slice(&bytes).expect("body should be json"))
    }

    #[tokio::test]
    async fn streams_files_to_staging_and_keeps_first_text_value() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let payload = body(&[
            ("title", None, &b"first"[..]),
            ("title", None, &b"second"[..]),
            ("file", Some("a.png"), &[7u8; 3000][..]),
        ]);

        let (status, json) = send(app(dir.path().to_path_buf(), 1024 * 1024), payload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["title"], "first");
        assert_eq!(json["data"]["stagedBytes"], 3000);

        let leftovers = std::fs::read_dir(dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn empty_file_parts_are_skipped() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let payload = body(&[("file", Some("a.png"), &b""[..])]);

        let (status, json) = send(app(dir.path().to_path_buf(), 1024), payload).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"]["stagedBytes"].is_null());
    }

    #[tokio::test]
    async fn oversized_body_keeps_the_payload_too_large_status() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let payload = body(&[("file", Some("big.png"), &[1u8; 4096][..])]);

        let (status, json) = send(app(dir.path().to_path_buf(), 512), payload).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["status"], 413);
        assert_eq!(json["success"], false);
    }
}
