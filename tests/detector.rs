//! Change-point detector tests.

use std::collections::HashSet;
use std::time::Duration;

use chapterize::{ChangePointOptions, ChapterizeError, SimilarityPoint, detect_change_points};

fn series_from_scores(scores: &[f64]) -> Vec<SimilarityPoint> {
    scores
        .iter()
        .enumerate()
        .map(|(index, &score)| SimilarityPoint {
            timestamp: Duration::from_secs(index as u64 + 1),
            score,
        })
        .collect()
}

#[test]
fn empty_series_is_an_error() {
    let result = detect_change_points(&[], &ChangePointOptions::new());
    assert!(
        matches!(result, Err(ChapterizeError::InsufficientData)),
        "got {result:?}",
    );
}

#[test]
fn constant_series_marks_every_point() {
    // All scores equal: std = 0, threshold = mean, every score satisfies
    // score <= threshold. The degenerate behavior is intentional.
    let series = series_from_scores(&[0.9; 7]);
    let changes = detect_change_points(&series, &ChangePointOptions::new()).unwrap();
    assert_eq!(changes.len(), series.len());
}

#[test]
fn single_point_series_degrades_to_below_average_rule() {
    let series = series_from_scores(&[0.5]);
    let changes = detect_change_points(&series, &ChangePointOptions::new()).unwrap();
    assert_eq!(changes, vec![Duration::from_secs(1)]);
}

#[test]
fn output_is_a_subset_of_series_timestamps() {
    let series = series_from_scores(&[0.99, 0.97, 0.32, 0.98, 0.95, 0.11, 0.96]);
    let changes = detect_change_points(&series, &ChangePointOptions::new()).unwrap();

    assert!(changes.len() <= series.len());

    let known: HashSet<Duration> = series.iter().map(|point| point.timestamp).collect();
    for timestamp in &changes {
        assert!(known.contains(timestamp), "invented timestamp {timestamp:?}");
    }

    for pair in changes.windows(2) {
        assert!(pair[0] < pair[1], "output must be strictly increasing");
    }
}

#[test]
fn detector_is_idempotent() {
    let series = series_from_scores(&[0.8, 0.2, 0.9, 0.85, 0.4, 0.95]);
    let options = ChangePointOptions::new().alpha(0.5);
    let first = detect_change_points(&series, &options).unwrap();
    let second = detect_change_points(&series, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn outliers_are_detected_at_default_sensitivity() {
    // Two sharp dips in an otherwise stable series.
    let series = series_from_scores(&[0.98, 0.97, 0.21, 0.98, 0.99, 0.15, 0.97]);
    let changes = detect_change_points(&series, &ChangePointOptions::new()).unwrap();
    assert!(changes.contains(&Duration::from_secs(3)));
    assert!(changes.contains(&Duration::from_secs(6)));
    assert!(!changes.contains(&Duration::from_secs(1)));
}

#[test]
fn high_alpha_still_reports_the_rank_minimum() {
    // With alpha large enough, the statistical rule fires for nothing, but
    // the rank rule (target_rate 0 -> percentile 0 -> series minimum) still
    // reports the single most-dissimilar point.
    let series = series_from_scores(&[0.9, 0.7, 0.8, 0.95, 0.85]);
    let options = ChangePointOptions::new().alpha(50.0);
    let changes = detect_change_points(&series, &options).unwrap();
    assert_eq!(changes, vec![Duration::from_secs(2)]);
}

#[test]
fn target_rate_controls_break_density() {
    // 100 evenly spread scores; target_rate 30/min maps to the 50th
    // percentile, so about half the points qualify through the rank rule.
    let scores: Vec<f64> = (0..100).map(|i| i as f64 / 100.0).collect();
    let series = series_from_scores(&scores);

    let options = ChangePointOptions::new().alpha(1000.0).target_rate(30.0);
    let changes = detect_change_points(&series, &options).unwrap();

    assert!(
        (45..=55).contains(&changes.len()),
        "expected roughly half the points, got {}",
        changes.len(),
    );
}

#[test]
fn negative_alpha_widens_the_threshold() {
    // threshold = mean - alpha * std grows past the mean for negative alpha,
    // pulling in points the default would leave out.
    let series = series_from_scores(&[0.5, 0.6, 0.7, 0.8, 0.9]);
    let default_changes = detect_change_points(&series, &ChangePointOptions::new()).unwrap();
    let wide_changes =
        detect_change_points(&series, &ChangePointOptions::new().alpha(-5.0)).unwrap();
    assert!(wide_changes.len() >= default_changes.len());
    assert_eq!(wide_changes.len(), series.len());
}
