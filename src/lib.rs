//! Async client library for the 3Play Media v3 transcription API.
//!
//! Uploads media files, orders transcription jobs, polls job status, and
//! retrieves finished transcripts in any of the service's output formats.
//! The whole workflow runs through one [`ThreePlay`] client:
//!
//! ```no_run
//! use std::path::Path;
//! use threeplay::{PollOptions, ThreePlay, UploadOptions};
//!
//! # async fn run() -> threeplay::Result<()> {
//! let client = ThreePlay::new("my-api-key");
//!
//! // Upload and order in one step.
//! let order = client
//!     .order(Path::new("interview.mp4"), "Interview", UploadOptions::default())
//!     .await?;
//! let media_file_id = order.data["media_file_id"]
//!     .as_i64()
//!     .expect("order response carries the media file id");
//!
//! // Poll until the transcript is ready, then write it out as WebVTT.
//! client
//!     .wait_for_completion(media_file_id, PollOptions::default())
//!     .await?;
//! let written = client.generate_transcript(media_file_id, None).await?;
//! println!("transcript written to {}", written.display());
//! # Ok(())
//! # }
//! ```
//!
//! The client holds its API key for its whole lifetime and injects it into
//! every request. It keeps no state between calls: identifiers are always
//! re-derived from the service, and the only local side effect is the
//! transcript file [`generate_transcript`](ThreePlay::generate_transcript)
//! writes. Errors stay distinguishable by kind (transport, malformed
//! response, not-found, filesystem) via [`Error`].

mod batches;
mod client;
mod error;
mod files;
mod formats;
mod transcripts;

pub use batches::Batch;
pub use client::{Envelope, ThreePlay};
pub use error::{Error, Result};
pub use files::{MediaFile, UploadOptions, DEFAULT_BATCH_ID, DEFAULT_LANGUAGE_ID};
pub use formats::extension_for;
pub use transcripts::{PollOptions, TranscriptDownload, DEFAULT_OUTPUT_FORMAT};
