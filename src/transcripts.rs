//! Transcript ordering, status, and retrieval.
//!
//! Every operation here is a sequential chain of fallible steps over the
//! service's identifier model: a media file id resolves to a transcript id,
//! which resolves to a status or to the transcript text. Nothing is cached
//! between calls; state always comes fresh from the service.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::Form;
use serde::Deserialize;
use serde_json::Value;

use crate::client::{Envelope, ThreePlay};
use crate::error::{Error, Result};
use crate::files::UploadOptions;
use crate::formats::extension_for;

/// Output format requested when the caller does not pick one (51 = WebVTT).
pub const DEFAULT_OUTPUT_FORMAT: i64 = 51;

/// Row shape of `GET /transcripts`; only the id matters here.
#[derive(Debug, Clone, Deserialize)]
struct TranscriptRef {
    id: i64,
}

/// Pacing for [`ThreePlay::wait_for_completion`].
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Delay between status probes
    pub interval: Duration,
    /// Probes made before giving up with [`Error::Timeout`]
    pub max_attempts: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_attempts: 120,
        }
    }
}

/// Transcript content packaged for attachment-style delivery, e.g. behind a
/// `Content-Disposition: attachment` response.
#[derive(Debug, Clone)]
pub struct TranscriptDownload {
    /// `{name}.{ext}`, derived from the media file's display name
    pub file_name: String,
    /// Always `application/octet-stream`
    pub content_type: &'static str,
    /// The transcript text in the requested format
    pub content: String,
}

impl ThreePlay {
    /// Uploads a media file and orders its transcription in one step.
    ///
    /// Returns the raw order envelope; `data.media_file_id` identifies the
    /// file for later status and retrieval calls. If the upload response
    /// lacks `data.id` the order request is never issued.
    pub async fn order(
        &self,
        path: &Path,
        name: &str,
        options: UploadOptions,
    ) -> Result<Envelope<Value>> {
        let media_file = self.upload(path, name, options).await?;

        tracing::debug!("Ordering transcription for media file {}", media_file.id);
        let form = Form::new().text("media_file_id", media_file.id.to_string());
        self.post("/transcripts/order/transcription", &[], Some(form))
            .await
    }

    /// Resolves a media file id to its transcript id.
    ///
    /// The service does not hand the transcript id back at upload or order
    /// time; it has to be looked up by filtering transcripts on
    /// `media_file_id`. An empty result set means the job does not exist yet
    /// and is reported as [`Error::NotFound`]. Extra matches are ignored;
    /// the first row wins.
    pub async fn transcript_id(&self, media_file_id: i64) -> Result<i64> {
        let params = [("media_file_id", media_file_id.to_string())];
        let envelope: Envelope<Vec<TranscriptRef>> = self.get("/transcripts", &params).await?;

        match envelope.data.first() {
            Some(transcript) => Ok(transcript.id),
            None => Err(Error::NotFound {
                resource: "transcript",
                lookup: format!("media_file_id={media_file_id}"),
            }),
        }
    }

    /// Fetches the current status envelope for a media file's transcript.
    ///
    /// A single synchronous probe: resolve the transcript id, fetch
    /// `/transcripts/{id}`, return the raw envelope. Use
    /// [`wait_for_completion`](Self::wait_for_completion) to poll.
    pub async fn status(&self, media_file_id: i64) -> Result<Envelope<Value>> {
        let transcript_id = self.transcript_id(media_file_id).await?;
        self.get(&format!("/transcripts/{transcript_id}"), &[])
            .await
    }

    /// Polls [`status`](Self::status) until the transcript completes.
    ///
    /// Each probe re-derives state from the service. A transcript that is
    /// not resolvable yet (ordered moments ago) counts as still pending.
    /// Returns the final status envelope on `complete`, [`Error::JobFailed`]
    /// if the service reports `error` or `cancelled`, and [`Error::Timeout`]
    /// once the attempt budget is spent.
    pub async fn wait_for_completion(
        &self,
        media_file_id: i64,
        options: PollOptions,
    ) -> Result<Envelope<Value>> {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            if attempts > options.max_attempts {
                return Err(Error::Timeout {
                    media_file_id,
                    attempts: options.max_attempts,
                });
            }

            match self.status(media_file_id).await {
                Ok(envelope) => {
                    let Some(state) = envelope.data.get("status").and_then(Value::as_str) else {
                        return Err(Error::MalformedResponse {
                            endpoint: "/transcripts".to_string(),
                            reason: format!(
                                "transcript for media file {media_file_id} has no status field"
                            ),
                        });
                    };

                    tracing::debug!(
                        "Poll attempt {attempts}/{}: media file {media_file_id} is {state}",
                        options.max_attempts
                    );

                    match state {
                        "complete" => return Ok(envelope),
                        "error" | "cancelled" => {
                            return Err(Error::JobFailed {
                                media_file_id,
                                message: state.to_string(),
                            })
                        }
                        // pending, in_progress, or a state this client
                        // does not know about yet
                        _ => {}
                    }
                }
                // The transcript row may not exist right after ordering.
                Err(Error::NotFound { .. }) => {
                    tracing::debug!(
                        "Poll attempt {attempts}/{}: transcript for media file {media_file_id} not created yet",
                        options.max_attempts
                    );
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(options.interval).await;
        }
    }

    /// Fetches the transcript text for a media file in the given output
    /// format (`None` means WebVTT). The envelope's `data` is the text
    /// itself.
    pub async fn transcript_text(
        &self,
        media_file_id: i64,
        format_id: Option<i64>,
    ) -> Result<String> {
        let transcript_id = self.transcript_id(media_file_id).await?;
        let format_id = format_id.unwrap_or(DEFAULT_OUTPUT_FORMAT);

        let params = [("output_format_id", format_id.to_string())];
        let envelope: Envelope<String> = self
            .get(&format!("/transcripts/{transcript_id}/text"), &params)
            .await?;
        Ok(envelope.data)
    }

    /// Fetches the transcript and writes it to the cache directory as
    /// `{name}.{ext}`, returning the written path.
    ///
    /// The name comes from the media file's metadata, the extension from
    /// [`extension_for`]. The text is written to a temp file in the target
    /// directory and renamed over the final name, so a failed write never
    /// leaves a truncated transcript visible at the returned path.
    pub async fn generate_transcript(
        &self,
        media_file_id: i64,
        format_id: Option<i64>,
    ) -> Result<PathBuf> {
        let format_id = format_id.unwrap_or(DEFAULT_OUTPUT_FORMAT);

        let text = self.transcript_text(media_file_id, Some(format_id)).await?;
        let info = self.file_info(media_file_id).await?;
        let file_name = format!("{}.{}", info.name, extension_for(format_id));

        std::fs::create_dir_all(&self.cache_dir).map_err(|source| Error::Filesystem {
            path: self.cache_dir.clone(),
            source,
        })?;

        let target = self.cache_dir.join(&file_name);
        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.cache_dir).map_err(|source| {
                Error::Filesystem {
                    path: self.cache_dir.clone(),
                    source,
                }
            })?;
        tmp.write_all(text.as_bytes())
            .map_err(|source| Error::Filesystem {
                path: target.clone(),
                source,
            })?;
        tmp.persist(&target).map_err(|e| Error::Filesystem {
            path: target.clone(),
            source: e.error,
        })?;

        tracing::debug!(
            "Wrote transcript for media file {media_file_id} to {}",
            target.display()
        );
        Ok(target)
    }

    /// Fetches the transcript packaged as an attachment: filename, generic
    /// binary content type, and the text, without touching the filesystem.
    pub async fn download(
        &self,
        media_file_id: i64,
        format_id: Option<i64>,
    ) -> Result<TranscriptDownload> {
        let format_id = format_id.unwrap_or(DEFAULT_OUTPUT_FORMAT);

        let content = self.transcript_text(media_file_id, Some(format_id)).await?;
        let info = self.file_info(media_file_id).await?;

        Ok(TranscriptDownload {
            file_name: format!("{}.{}", info.name, extension_for(format_id)),
            content_type: "application/octet-stream",
            content,
        })
    }

    /// Lists the output formats the service supports.
    pub async fn output_formats(&self) -> Result<Envelope<Value>> {
        self.get("/transcripts/output_formats", &[]).await
    }
}
