//! Error types for the `chapterize` crate.
//!
//! This module defines [`ChapterizeError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry rich context to aid
//! debugging, including file paths, timestamps, and upstream error messages.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use thiserror::Error;

/// The unified error type for all `chapterize` operations.
///
/// Every public method that can fail returns `Result<T, ChapterizeError>`.
/// Variants carry enough context to identify the failing pipeline stage
/// without needing additional logging at the call site. A failed run never
/// yields a partial decision sequence.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChapterizeError {
    /// The video source could not be opened.
    #[error("Failed to open video source at {path}: {reason}")]
    SourceUnavailable {
        /// Path that was passed to the source constructor.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[cfg(feature = "ffmpeg")]
    #[error("Failed to decode video frame: {0}")]
    VideoDecode(String),

    /// The source produced zero frame samples.
    ///
    /// A sampler run over an unreadable or zero-length video cannot feed the
    /// detector, which has no statistics to compute over an empty series.
    #[error("Video source produced no frame samples")]
    EmptySource,

    /// The similarity series is empty, so no threshold can be derived.
    #[error("Similarity series is empty; cannot compute change-point statistics")]
    InsufficientData,

    /// The caption list is empty; there is nothing to fuse.
    #[error("Caption list is empty")]
    NoCaptions,

    /// A caption violates the input contract (ordering or timing).
    #[error("Invalid caption at index {index}: {reason}")]
    InvalidCaption {
        /// Zero-based position of the offending caption.
        index: usize,
        /// What the caption violated.
        reason: String,
    },

    /// The embedding model failed on a sampled frame.
    #[error("Embedding failed for frame at {timestamp:?}: {reason}")]
    EmbeddingFailed {
        /// Timestamp of the sample that could not be embedded.
        timestamp: Duration,
        /// Underlying reason reported by the model.
        reason: String,
    },

    /// An embedding vector did not match the model's declared length.
    ///
    /// Comparing vectors of different lengths would silently corrupt the
    /// dot product, so the mismatch is rejected instead.
    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        /// Length declared by [`FrameEmbedder::dimensions`](crate::FrameEmbedder::dimensions).
        expected: usize,
        /// Length of the vector actually produced.
        actual: usize,
    },

    /// A timestamp is out of range for the source, or regresses within a
    /// series that must be strictly increasing.
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(Duration),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while converting or saving frames.
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),
}

#[cfg(feature = "ffmpeg")]
impl From<ffmpeg_next::Error> for ChapterizeError {
    fn from(error: ffmpeg_next::Error) -> Self {
        ChapterizeError::VideoDecode(error.to_string())
    }
}
