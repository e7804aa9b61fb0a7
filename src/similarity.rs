//! Similarity series construction.
//!
//! [`SimilaritySeriesBuilder`] consumes the ordered `(timestamp, vector)`
//! stream produced by the embedding stage and emits one [`SimilarityPoint`]
//! per consecutive pair of samples: the cosine similarity of each vector
//! against the immediately preceding one. The builder holds exactly one
//! "previous vector" slot, so in the sequential path at most two embeddings
//! are alive at any time.

use std::time::Duration;

use crate::error::ChapterizeError;

/// Cosine similarity of one sample against the previous sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityPoint {
    /// Timestamp of the *later* sample of the pair.
    pub timestamp: Duration,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f64,
}

/// Cosine similarity between two equal-length vectors.
///
/// If either vector has zero magnitude the similarity is undefined; this
/// returns 0.0 (maximal dissimilarity) so a genuine scene change next to a
/// degenerate frame — a black insert, an all-zero embedding — is never
/// suppressed. The fallback is logged and never aborts the pipeline.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += *x as f64 * *y as f64;
        norm_a += (*x as f64).powi(2);
        norm_b += (*y as f64).powi(2);
    }

    let magnitude = norm_a.sqrt() * norm_b.sqrt();
    if magnitude == 0.0 {
        log::warn!("Zero-magnitude embedding; treating pair as maximally dissimilar");
        return 0.0;
    }

    dot / magnitude
}

/// Incremental builder for the similarity series.
///
/// Push `(timestamp, vector)` pairs in sample order; the finished series has
/// one fewer point than the number of pushes (the first sample has no
/// predecessor) and strictly increasing timestamps.
#[derive(Debug)]
pub struct SimilaritySeriesBuilder {
    dimensions: usize,
    previous: Option<Vec<f32>>,
    last_timestamp: Option<Duration>,
    points: Vec<SimilarityPoint>,
}

impl SimilaritySeriesBuilder {
    /// Create a builder for vectors of the given length.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            previous: None,
            last_timestamp: None,
            points: Vec::new(),
        }
    }

    /// Append the next sample's embedding.
    ///
    /// # Errors
    ///
    /// - [`ChapterizeError::DimensionMismatch`] if the vector length differs
    ///   from the builder's declared dimensions.
    /// - [`ChapterizeError::InvalidTimestamp`] if `timestamp` does not
    ///   strictly increase — an out-of-order push would corrupt the
    ///   consecutive-pair chain.
    pub fn push(&mut self, timestamp: Duration, vector: Vec<f32>) -> Result<(), ChapterizeError> {
        if vector.len() != self.dimensions {
            return Err(ChapterizeError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }

        if let Some(last) = self.last_timestamp
            && timestamp <= last
        {
            return Err(ChapterizeError::InvalidTimestamp(timestamp));
        }

        if let Some(previous) = &self.previous {
            let score = cosine_similarity(previous, &vector);
            self.points.push(SimilarityPoint { timestamp, score });
        }

        self.previous = Some(vector);
        self.last_timestamp = Some(timestamp);
        Ok(())
    }

    /// Number of similarity points accumulated so far.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no similarity point has been produced yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consume the builder and return the ordered series.
    pub fn finish(self) -> Vec<SimilarityPoint> {
        self.points
    }
}
