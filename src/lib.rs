//! # chapterize
//!
//! Segment spoken-video transcripts into document paragraphs, with
//! illustrative frame picks tied to actual visual shifts in the video.
//!
//! `chapterize` takes a finite video and its time-coded caption stream and
//! decides, per caption, whether the assembled document should start a new
//! paragraph there and whether a video frame should be embedded. Paragraph
//! boundaries track both elapsed time and detected scene changes: the video
//! is sampled at one frame per second, each sample is mapped to an embedding
//! vector, consecutive-pair cosine similarities form a time series, and a
//! statistical threshold turns that series into scene-change timestamps that
//! are fused with a pacing rule over the captions.
//!
//! Transcription, summarization, downloading, and document writing are other
//! programs' jobs; this crate is the segmentation engine between them.
//!
//! ## Quick Start
//!
//! With the `ffmpeg` feature enabled (for `MediaSource`):
//!
//! ```no_run
//! # #[cfg(feature = "ffmpeg")]
//! # fn run() -> Result<(), chapterize::ChapterizeError> {
//! use chapterize::{Caption, GridEmbedder, MediaSource, Segmenter};
//!
//! let mut source = MediaSource::open("talk.mp4")?;
//! let captions: Vec<Caption> =
//!     serde_json::from_str(&std::fs::read_to_string("talk.captions.json")?)
//!         .expect("captions decode");
//!
//! let embedder = GridEmbedder::new();
//! let segmentation = Segmenter::new().run(&mut source, &embedder, &captions)?;
//!
//! for item in &segmentation.items {
//!     if item.paragraph_break {
//!         println!("new paragraph at {:?}", item.caption.start);
//!     }
//!     if let Some(timestamp) = item.frame_timestamp {
//!         let frame = source.frame_at(timestamp)?;
//!         frame.save(format!("frame_{}.png", timestamp.as_secs()))?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! - **Frame sampling** — at most one sample per whole second of video time,
//!   strictly increasing, via a lazy [`FrameSampler`] over any
//!   [`VideoSource`]
//! - **Embedding** — a caller-owned [`FrameEmbedder`] maps frames to
//!   fixed-length vectors; [`GridEmbedder`] ships as a cheap default
//! - **Similarity series** — cosine similarity of each sample against its
//!   predecessor, built with at most two vectors alive
//! - **Change-point detection** — `mean - alpha * std` outlier rule OR a
//!   percentile-rank cutoff, tunable independently
//! - **Caption fusion** — elapsed-time pacing merged with scene changes,
//!   minimum break spacing enforced, one decision per caption
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ffmpeg` | `MediaSource`, an FFmpeg-backed `VideoSource`, plus the `chapterize` CLI |
//! | `rayon` | `Segmenter::run_parallel` distributes embedding across rayon threads |
//! | `full` | Enables all of the above |
//!
//! With the `ffmpeg` feature, FFmpeg development libraries must be installed
//! on your system.

pub mod caption;
pub mod detector;
pub mod embedding;
pub mod error;
pub mod fusion;
#[cfg(feature = "rayon")]
mod parallel;
pub mod pipeline;
pub mod sampler;
pub mod similarity;
#[cfg(feature = "ffmpeg")]
pub mod source;
mod timecode;

pub use caption::{Caption, validate_captions};
pub use detector::{ChangePointOptions, detect_change_points};
pub use embedding::{FrameEmbedder, GridEmbedder};
pub use error::ChapterizeError;
pub use fusion::{FusionDecision, FusionOptions, SceneCursor, fuse};
pub use pipeline::{AssemblyItem, Segmentation, Segmenter};
pub use sampler::{FrameSample, FrameSampler, MIN_SAMPLE_SPACING, VideoSource, collect_samples};
pub use similarity::{SimilarityPoint, SimilaritySeriesBuilder, cosine_similarity};
#[cfg(feature = "ffmpeg")]
pub use source::MediaSource;
pub use timecode::format_timestamp;
