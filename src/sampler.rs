//! Frame sampling.
//!
//! [`FrameSampler`] pulls decoded frames from a [`VideoSource`] and yields at
//! most one [`FrameSample`] per whole second of video time — frames between
//! qualifying ticks are decoded and discarded. Sampling is lazy: each call to
//! [`next()`](Iterator::next) reads just enough frames from the source to
//! produce the next qualifying sample.
//!
//! # Example
//!
//! ```no_run
//! use chapterize::{ChapterizeError, FrameSampler, VideoSource};
//!
//! fn list_samples(source: &mut dyn VideoSource) -> Result<(), ChapterizeError> {
//!     for result in FrameSampler::new(source) {
//!         let sample = result?;
//!         println!("sampled frame at {:?}", sample.timestamp);
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use image::RgbImage;

use crate::error::ChapterizeError;

/// Minimum spacing between two consecutive frame samples.
pub const MIN_SAMPLE_SPACING: Duration = Duration::from_secs(1);

/// A finite, seekable video seen as a sequence of timestamped RGB frames.
///
/// Implemented by [`MediaSource`](crate::MediaSource) (feature `ffmpeg`) for
/// real media files; test code and embedders with their own decode path can
/// implement it over synthetic frames.
pub trait VideoSource {
    /// Frames per second reported by the source.
    ///
    /// May be approximate for variable-frame-rate content.
    fn frame_rate(&self) -> f64;

    /// Decode and return the next frame, or `None` once the source is
    /// exhausted. Timestamps must be non-decreasing.
    fn next_frame(&mut self) -> Result<Option<(Duration, RgbImage)>, ChapterizeError>;
}

/// A single sampled frame.
///
/// Produced by [`FrameSampler`], consumed once by the embedding stage, and
/// not retained afterwards — raw pixels are never cached.
#[derive(Debug, Clone)]
pub struct FrameSample {
    /// Presentation timestamp of the sampled frame.
    pub timestamp: Duration,
    /// Decoded pixel data.
    pub image: RgbImage,
}

/// Lazy iterator over qualifying frame samples.
///
/// Yields samples with strictly increasing timestamps, never closer than
/// [`MIN_SAMPLE_SPACING`] apart, until the underlying source is exhausted.
/// The sampler borrows the source mutably, so nothing else can decode from
/// it while the sampler is alive.
pub struct FrameSampler<'a, S: VideoSource + ?Sized> {
    source: &'a mut S,
    last_sampled: Option<Duration>,
    done: bool,
}

impl<'a, S: VideoSource + ?Sized> FrameSampler<'a, S> {
    /// Create a sampler over the given source.
    pub fn new(source: &'a mut S) -> Self {
        Self {
            source,
            last_sampled: None,
            done: false,
        }
    }

    /// Whether a frame at `timestamp` qualifies as the next sample.
    fn qualifies(&self, timestamp: Duration) -> bool {
        match self.last_sampled {
            None => true,
            // Strictly-increasing check is folded in: an equal or regressing
            // timestamp yields a zero difference under saturating subtraction.
            Some(last) => timestamp.saturating_sub(last) >= MIN_SAMPLE_SPACING,
        }
    }
}

impl<S: VideoSource + ?Sized> Iterator for FrameSampler<'_, S> {
    type Item = Result<FrameSample, ChapterizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.source.next_frame() {
                Ok(Some((timestamp, image))) => {
                    if !self.qualifies(timestamp) {
                        continue;
                    }
                    self.last_sampled = Some(timestamp);
                    return Some(Ok(FrameSample { timestamp, image }));
                }
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

/// Drain a source into a sample list.
///
/// # Errors
///
/// - [`ChapterizeError::EmptySource`] if the source yields no samples at all
///   — an empty sample set cannot feed the similarity series, so the failure
///   surfaces here rather than deep inside the detector.
/// - Any decode error from the underlying source.
pub fn collect_samples<S: VideoSource + ?Sized>(
    source: &mut S,
) -> Result<Vec<FrameSample>, ChapterizeError> {
    let samples = FrameSampler::new(source).collect::<Result<Vec<_>, _>>()?;

    if samples.is_empty() {
        return Err(ChapterizeError::EmptySource);
    }

    log::debug!(
        "Sampled {} frames ({:?} .. {:?})",
        samples.len(),
        samples.first().map(|s| s.timestamp),
        samples.last().map(|s| s.timestamp),
    );

    Ok(samples)
}
