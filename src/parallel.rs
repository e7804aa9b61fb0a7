//! Parallel frame embedding.
//!
//! This module distributes the embedding step across rayon threads. Sampling
//! and decoding stay single-threaded — video decoders are not safely shared —
//! and only the per-frame embedding work fans out. Completion order is never
//! trusted: results are collected keyed by timestamp and explicitly reordered
//! before the similarity series is built, since the consecutive-pair chain
//! silently corrupts under out-of-order assembly.
//!
//! The public API is exposed through
//! [`Segmenter::run_parallel`](crate::Segmenter::run_parallel) — this module
//! contains only the internal implementation.

use std::time::Duration;

use ::rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::embedding::FrameEmbedder;
use crate::error::ChapterizeError;
use crate::pipeline::embed_sample;
use crate::sampler::FrameSample;

/// Embed all samples across rayon threads, then restore timestamp order.
pub(crate) fn embed_samples_parallel<E>(
    embedder: &E,
    samples: Vec<FrameSample>,
) -> Result<Vec<(Duration, Vec<f32>)>, ChapterizeError>
where
    E: FrameEmbedder + Sync + ?Sized,
{
    let results: Result<Vec<(Duration, Vec<f32>)>, ChapterizeError> = samples
        .into_par_iter()
        .map(|sample| {
            let vector = embed_sample(embedder, &sample)?;
            Ok((sample.timestamp, vector))
        })
        .collect();

    let mut embedded = results?;
    embedded.sort_by_key(|(timestamp, _)| *timestamp);
    Ok(embedded)
}
