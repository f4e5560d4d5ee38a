//! Error types for the 3Play Media client.
//!
//! Every fallible operation returns [`Error`], which keeps the failure kinds
//! a caller cares about distinguishable: transport problems, responses the
//! service should never have sent, lookups that legitimately matched nothing,
//! and local filesystem trouble.

use std::path::PathBuf;

/// Errors returned by the 3Play Media client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection failure, timeout, or non-success HTTP status. No usable
    /// response body exists; nothing was parsed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered 2xx but the body was not valid JSON, or lacked a
    /// field the caller depends on (e.g. no `data.id` after an upload).
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// API endpoint that produced the response
        endpoint: String,
        /// What was wrong with the body
        reason: String,
    },

    /// A lookup matched nothing. Expected in normal operation: a transcript
    /// may not be created yet, a batch name may not exist yet.
    #[error("no {resource} found for {lookup}")]
    NotFound {
        /// Resource kind that was looked up ("transcript", "batch", ...)
        resource: &'static str,
        /// The query that matched nothing, e.g. `media_file_id=42`
        lookup: String,
    },

    /// Reading a source file or writing a transcript file failed.
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        /// Path of the file that could not be read or written
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The service reported the transcription job itself as failed.
    #[error("transcription for media file {media_file_id} failed: {message}")]
    JobFailed {
        /// Media file whose transcription failed
        media_file_id: i64,
        /// Status reported by the service ("error", "cancelled")
        message: String,
    },

    /// [`wait_for_completion`](crate::ThreePlay::wait_for_completion)
    /// exhausted its attempt budget before the transcript completed.
    #[error("transcript for media file {media_file_id} not complete after {attempts} polls")]
    Timeout {
        /// Media file that was being polled
        media_file_id: i64,
        /// Number of status probes that were made
        attempts: u32,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
