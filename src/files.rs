//! Media file upload and metadata lookup.
//!
//! Uploading is the entry point of the transcription workflow: it produces
//! the media file id every later call (ordering, status, retrieval) hangs
//! off of.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::client::{Envelope, ThreePlay};
use crate::error::{Error, Result};

/// Batch uploads land in when the caller does not pick one. A deployment
/// default, not service behavior; override it per call via
/// [`UploadOptions::batch_id`].
pub const DEFAULT_BATCH_ID: i64 = 4681;

/// Language submitted with uploads unless overridden (1 = English).
pub const DEFAULT_LANGUAGE_ID: i64 = 1;

/// A media file tracked by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaFile {
    /// Server-assigned identifier, referenced by all downstream calls
    pub id: i64,
    /// Display name given at upload time
    pub name: String,
}

/// Options for [`ThreePlay::upload`].
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Batch to place the file in; `None` falls back to [`DEFAULT_BATCH_ID`]
    pub batch_id: Option<i64>,
    /// Language of the source audio
    pub language_id: i64,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            batch_id: None,
            language_id: DEFAULT_LANGUAGE_ID,
        }
    }
}

impl ThreePlay {
    /// Uploads a media file for transcription and returns the created
    /// [`MediaFile`].
    ///
    /// The file is read as raw bytes and sent as the `source_file` multipart
    /// part. There is no up-front existence check: a missing or unreadable
    /// file surfaces as [`Error::Filesystem`] from the read itself.
    pub async fn upload(
        &self,
        path: &Path,
        name: &str,
        options: UploadOptions,
    ) -> Result<MediaFile> {
        let bytes = std::fs::read(path).map_err(|source| Error::Filesystem {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        tracing::debug!("Uploading {file_name} ({} bytes) as \"{name}\"", bytes.len());

        let form = Form::new()
            .text("name", name.to_string())
            .text("language_id", options.language_id.to_string())
            .text(
                "batch_id",
                options.batch_id.unwrap_or(DEFAULT_BATCH_ID).to_string(),
            )
            .part("source_file", Part::bytes(bytes).file_name(file_name));

        let envelope: Envelope<MediaFile> = self.post("/files", &[], Some(form)).await?;
        tracing::debug!("Upload complete, media file id {}", envelope.data.id);
        Ok(envelope.data)
    }

    /// Fetches metadata for an uploaded media file by its id.
    pub async fn file_info(&self, id: i64) -> Result<MediaFile> {
        let envelope: Envelope<MediaFile> = self.get(&format!("/files/{id}"), &[]).await?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ThreePlay {
        ThreePlay::new("test-key").with_base_url(server.uri())
    }

    fn fake_media_file(name: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("threeplay-test-{name}"));
        std::fs::write(&path, b"fake media bytes").unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_sends_fallback_batch_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/files"))
            .and(body_string_contains("Interview"))
            .and(body_string_contains("4681"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": 101, "name": "Interview"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let src = fake_media_file("interview.mp4");
        let media_file = client
            .upload(&src, "Interview", UploadOptions::default())
            .await
            .unwrap();

        assert_eq!(media_file.id, 101);
        assert_eq!(media_file.name, "Interview");
        std::fs::remove_file(src).ok();
    }

    #[tokio::test]
    async fn test_upload_sends_explicit_batch_and_language() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/files"))
            .and(body_string_contains("9000"))
            .and(body_string_contains("\"language_id\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": 102, "name": "Entrevista"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let src = fake_media_file("entrevista.mp4");
        let options = UploadOptions {
            batch_id: Some(9000),
            language_id: 2,
        };
        let media_file = client.upload(&src, "Entrevista", options).await.unwrap();

        assert_eq!(media_file.id, 102);
        std::fs::remove_file(src).ok();
    }

    #[tokio::test]
    async fn test_upload_of_missing_file_is_filesystem_error() {
        let server = MockServer::start().await;
        let client = test_client(&server);

        let result = client
            .upload(
                Path::new("/nonexistent/interview.mp4"),
                "Interview",
                UploadOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(Error::Filesystem { .. })));
        // Nothing should have reached the server.
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_response_without_id_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"name": "Interview"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let src = fake_media_file("no-id.mp4");
        let result = client
            .upload(&src, "Interview", UploadOptions::default())
            .await;

        assert!(matches!(result, Err(Error::MalformedResponse { .. })));
        std::fs::remove_file(src).ok();
    }

    #[tokio::test]
    async fn test_file_info_returns_metadata() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": 42, "name": "Interview"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let info = client.file_info(42).await.unwrap();

        assert_eq!(info.id, 42);
        assert_eq!(info.name, "Interview");
    }
}
