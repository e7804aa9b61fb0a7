//! End-to-end segmentation pipeline.
//!
//! [`Segmenter`] ties the stages together: sample frames from a
//! [`VideoSource`], embed them with a caller-supplied [`FrameEmbedder`],
//! build the similarity series, detect scene changes, and fuse the result
//! with the caption stream. The run is all-or-nothing — either the full
//! decision sequence is produced, or the error names the stage that failed
//! and nothing is returned.
//!
//! # Example
//!
//! ```no_run
//! use chapterize::{Caption, ChapterizeError, GridEmbedder, Segmenter, VideoSource};
//!
//! fn segment(source: &mut dyn VideoSource, captions: &[Caption]) -> Result<(), ChapterizeError> {
//!     let embedder = GridEmbedder::new();
//!     let segmentation = Segmenter::new().run(source, &embedder, captions)?;
//!     for item in &segmentation.items {
//!         println!(
//!             "{:?} break={} frame={}",
//!             item.caption.start, item.paragraph_break, item.insert_frame,
//!         );
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::caption::Caption;
use crate::detector::{ChangePointOptions, detect_change_points};
use crate::embedding::FrameEmbedder;
use crate::error::ChapterizeError;
use crate::fusion::{FusionDecision, FusionOptions, fuse};
use crate::sampler::{FrameSample, VideoSource, collect_samples};
use crate::similarity::{SimilarityPoint, SimilaritySeriesBuilder};

/// One record of the handoff contract with the document assembler.
///
/// `frame_timestamp` is populated with the caption's start time exactly when
/// `insert_frame` is set, so the assembler can pull the matching frame from
/// the video source without re-deriving the timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyItem {
    /// The caption this decision applies to.
    pub caption: Caption,
    /// Start a new paragraph at this caption.
    pub paragraph_break: bool,
    /// Embed a video frame at this caption.
    pub insert_frame: bool,
    /// Where to pull the frame from, when `insert_frame` is set.
    #[serde(with = "crate::timecode::duration_secs_opt")]
    pub frame_timestamp: Option<Duration>,
}

/// The completed output of a segmentation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segmentation {
    /// Detected scene-change timestamps, strictly increasing.
    #[serde(with = "duration_vec_secs")]
    pub scene_changes: Vec<Duration>,
    /// One assembler record per caption, in caption order.
    pub items: Vec<AssemblyItem>,
}

mod duration_vec_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};

    pub fn serialize<S: Serializer>(value: &[Duration], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(value.len()))?;
        for duration in value {
            seq.serialize_element(&duration.as_secs_f64())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Duration>, D::Error> {
        let seconds = Vec::<f64>::deserialize(deserializer)?;
        seconds
            .into_iter()
            .map(|s| {
                Duration::try_from_secs_f64(s)
                    .map_err(|_| DeError::custom(format!("invalid timestamp: {s}")))
            })
            .collect()
    }
}

/// Segmentation pipeline driver.
///
/// Holds the detector and fusion settings; the video source, embedding
/// model, and caption list are supplied per run so one configured segmenter
/// can process several inputs.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    change_points: ChangePointOptions,
    fusion: FusionOptions,
}

impl Segmenter {
    /// Create a segmenter with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the change-point detector settings.
    pub fn change_points(mut self, options: ChangePointOptions) -> Self {
        self.change_points = options;
        self
    }

    /// Replace the fusion settings.
    pub fn fusion(mut self, options: FusionOptions) -> Self {
        self.fusion = options;
        self
    }

    /// Run the full pipeline sequentially.
    ///
    /// Sampling, embedding, and series construction happen in one streaming
    /// pass: at most two embedding vectors are alive at any time, and frame
    /// pixels are dropped as soon as they are embedded.
    ///
    /// # Errors
    ///
    /// Any stage error propagates unchanged: [`ChapterizeError::EmptySource`]
    /// from sampling, [`ChapterizeError::EmbeddingFailed`] (with the frame
    /// timestamp) from the model, [`ChapterizeError::InsufficientData`] from
    /// the detector, [`ChapterizeError::NoCaptions`] /
    /// [`ChapterizeError::InvalidCaption`] from fusion.
    pub fn run<S, E>(
        &self,
        source: &mut S,
        embedder: &E,
        captions: &[Caption],
    ) -> Result<Segmentation, ChapterizeError>
    where
        S: VideoSource + ?Sized,
        E: FrameEmbedder + ?Sized,
    {
        let samples = collect_samples(source)?;

        let mut builder = SimilaritySeriesBuilder::new(embedder.dimensions());
        for sample in samples {
            let vector = embed_sample(embedder, &sample)?;
            builder.push(sample.timestamp, vector)?;
        }

        self.finish(builder.finish(), captions)
    }

    /// Run the full pipeline with the embedding step fanned out across
    /// rayon threads.
    ///
    /// Sampling and decoding stay single-threaded; embeddings are computed
    /// concurrently and explicitly reassembled in timestamp order before the
    /// similarity series is built. Output is identical to [`run`](Self::run)
    /// for a deterministic embedder.
    #[cfg(feature = "rayon")]
    pub fn run_parallel<S, E>(
        &self,
        source: &mut S,
        embedder: &E,
        captions: &[Caption],
    ) -> Result<Segmentation, ChapterizeError>
    where
        S: VideoSource + ?Sized,
        E: FrameEmbedder + Sync + ?Sized,
    {
        let samples = collect_samples(source)?;

        let embedded = crate::parallel::embed_samples_parallel(embedder, samples)?;
        let mut builder = SimilaritySeriesBuilder::new(embedder.dimensions());
        for (timestamp, vector) in embedded {
            builder.push(timestamp, vector)?;
        }

        self.finish(builder.finish(), captions)
    }

    /// Shared tail of the sequential and parallel paths: detect, fuse, and
    /// assemble.
    pub(crate) fn finish(
        &self,
        series: Vec<SimilarityPoint>,
        captions: &[Caption],
    ) -> Result<Segmentation, ChapterizeError> {
        let scene_changes = detect_change_points(&series, &self.change_points)?;
        let decisions = fuse(captions, &scene_changes, &self.fusion)?;

        let items = captions
            .iter()
            .zip(decisions)
            .map(|(caption, decision)| assembly_item(caption, decision))
            .collect();

        Ok(Segmentation {
            scene_changes,
            items,
        })
    }
}

/// Embed one sample, attaching the frame timestamp to any model failure.
pub(crate) fn embed_sample<E: FrameEmbedder + ?Sized>(
    embedder: &E,
    sample: &FrameSample,
) -> Result<Vec<f32>, ChapterizeError> {
    embedder
        .embed(&sample.image)
        .map_err(|error| ChapterizeError::EmbeddingFailed {
            timestamp: sample.timestamp,
            reason: error.to_string(),
        })
}

fn assembly_item(caption: &Caption, decision: FusionDecision) -> AssemblyItem {
    AssemblyItem {
        caption: caption.clone(),
        paragraph_break: decision.paragraph_break,
        insert_frame: decision.insert_frame,
        frame_timestamp: decision.insert_frame.then_some(caption.start),
    }
}
