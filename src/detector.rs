//! Scene change-point detection.
//!
//! Turns a similarity series into the sparse set of timestamps where the
//! video's visual content shifts. A point qualifies through either of two
//! independent criteria:
//!
//! - **statistical outlier** — its score is at or below
//!   `mean - alpha * std` of the whole series, catching sharp, rare cuts;
//! - **rank cutoff** — its score is at or below the percentile implied by
//!   [`target_rate`](ChangePointOptions::target_rate), guaranteeing a
//!   minimum density of breaks even in visually static footage.
//!
//! The two are alternatives, not a conjunction, and are tunable
//! independently.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use chapterize::{ChangePointOptions, SimilarityPoint, detect_change_points};
//!
//! let series = vec![
//!     SimilarityPoint { timestamp: Duration::from_secs(1), score: 0.98 },
//!     SimilarityPoint { timestamp: Duration::from_secs(2), score: 0.21 },
//!     SimilarityPoint { timestamp: Duration::from_secs(3), score: 0.97 },
//! ];
//! let changes = detect_change_points(&series, &ChangePointOptions::new())?;
//! assert!(changes.contains(&Duration::from_secs(2)));
//! # Ok::<(), chapterize::ChapterizeError>(())
//! ```

use std::time::Duration;

use crate::error::ChapterizeError;
use crate::similarity::SimilarityPoint;

/// Change-point detection settings.
///
/// The defaults mark every point at or below the series mean as a change,
/// plus the single most-dissimilar point via the rank rule.
#[derive(Debug, Clone, Default)]
pub struct ChangePointOptions {
    /// Sensitivity of the statistical threshold `mean - alpha * std`.
    ///
    /// 0.0 thresholds at the mean itself; larger values demand scores
    /// further below the mean. Default: 0.0.
    pub alpha: f64,
    /// Desired approximate scene changes per minute, converted to a
    /// percentile rank cutoff (`round(target_rate / 60 * 100)`, clamped to
    /// `[0, 100]`). Default: 0.0.
    pub target_rate: f64,
}

impl ChangePointOptions {
    /// Create a new detection configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the statistical-threshold sensitivity.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the target change rate in changes per minute.
    pub fn target_rate(mut self, target_rate: f64) -> Self {
        self.target_rate = target_rate;
        self
    }
}

/// Detect scene changes in a similarity series.
///
/// Returns the strictly increasing subset of series timestamps whose score
/// satisfies either criterion, preserving series order. The result may be
/// empty for visually static footage under a negative-threshold
/// configuration, and is a pure function of the series and options — the
/// same inputs always yield the same set.
///
/// A single-point series has `std = 0`, so the threshold collapses to the
/// mean and the point always qualifies. A two-sample video carries no
/// statistical power; the detector intentionally degrades to a below-average
/// rule there rather than special-casing it away.
///
/// # Errors
///
/// - [`ChapterizeError::InsufficientData`] if the series is empty.
pub fn detect_change_points(
    series: &[SimilarityPoint],
    options: &ChangePointOptions,
) -> Result<Vec<Duration>, ChapterizeError> {
    if series.is_empty() {
        return Err(ChapterizeError::InsufficientData);
    }

    let scores: Vec<f64> = series.iter().map(|point| point.score).collect();
    let count = scores.len() as f64;

    let mean = scores.iter().sum::<f64>() / count;
    let variance = scores
        .iter()
        .map(|score| (score - mean).powi(2))
        .sum::<f64>()
        / count;
    let threshold = mean - options.alpha * variance.sqrt();

    let rank = ((options.target_rate / 60.0) * 100.0).round().clamp(0.0, 100.0);
    let cutoff = percentile(&scores, rank);

    log::debug!(
        "Change-point statistics: mean={mean:.4} std={:.4} threshold={threshold:.4} \
         percentile_rank={rank} cutoff={cutoff:.4}",
        variance.sqrt(),
    );

    let changes: Vec<Duration> = series
        .iter()
        .filter(|point| point.score <= threshold || point.score <= cutoff)
        .map(|point| point.timestamp)
        .collect();

    log::debug!("Detected {} scene changes over {} points", changes.len(), series.len());
    Ok(changes)
}

/// Percentile of `scores` at `rank` (0–100), linearly interpolated between
/// closest ranks.
fn percentile(scores: &[f64], rank: f64) -> f64 {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = rank / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }

    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
