//! Caption types.
//!
//! A [`Caption`] is one decoded text segment of a transcript with its display
//! interval. Caption lists arrive from outside the crate (a subtitle decoder,
//! a transcription service) already split into `(start, end, text)` triples —
//! this crate never parses subtitle file formats itself, it only consumes the
//! decoded triples and validates their ordering contract at the fusion
//! boundary.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ChapterizeError;

/// A single caption with timing and text content.
///
/// Serde representation uses fractional seconds for both timestamps, so a
/// decoded caption list round-trips through JSON as
/// `{"start": 12.5, "end": 15.0, "text": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// When this caption starts displaying.
    #[serde(with = "crate::timecode::duration_secs")]
    pub start: Duration,
    /// When this caption stops displaying.
    #[serde(with = "crate::timecode::duration_secs")]
    pub end: Duration,
    /// The text content of the caption.
    pub text: String,
}

impl Caption {
    /// Create a caption from its timing and text.
    pub fn new(start: Duration, end: Duration, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Validate a caption list against its input contract.
///
/// Captions must be ordered by `start` (abutting or overlapping intervals are
/// fine, regressions are not) and each must satisfy `start < end`.
///
/// # Errors
///
/// - [`ChapterizeError::NoCaptions`] if the list is empty.
/// - [`ChapterizeError::InvalidCaption`] naming the first offending index.
pub fn validate_captions(captions: &[Caption]) -> Result<(), ChapterizeError> {
    if captions.is_empty() {
        return Err(ChapterizeError::NoCaptions);
    }

    let mut previous_start = None;
    for (index, caption) in captions.iter().enumerate() {
        if caption.start >= caption.end {
            return Err(ChapterizeError::InvalidCaption {
                index,
                reason: format!(
                    "start ({:?}) must be before end ({:?})",
                    caption.start, caption.end
                ),
            });
        }

        if let Some(previous) = previous_start
            && caption.start < previous
        {
            return Err(ChapterizeError::InvalidCaption {
                index,
                reason: format!(
                    "start ({:?}) regresses behind the previous caption ({previous:?})",
                    caption.start
                ),
            });
        }

        previous_start = Some(caption.start);
    }

    Ok(())
}
