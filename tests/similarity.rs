//! Similarity series construction tests.

use std::time::Duration;

use chapterize::{ChapterizeError, SimilaritySeriesBuilder, cosine_similarity};

#[test]
fn cosine_of_identical_vectors_is_one() {
    let v = [0.5f32, 0.25, 0.75, 0.1];
    let score = cosine_similarity(&v, &v);
    assert!((score - 1.0).abs() < 1e-9, "expected 1.0, got {score}");
}

#[test]
fn cosine_of_orthogonal_vectors_is_zero() {
    let a = [1.0f32, 0.0];
    let b = [0.0f32, 1.0];
    assert_eq!(cosine_similarity(&a, &b), 0.0);
}

#[test]
fn cosine_of_opposite_vectors_is_negative_one() {
    let a = [0.3f32, 0.7];
    let b = [-0.3f32, -0.7];
    let score = cosine_similarity(&a, &b);
    assert!((score + 1.0).abs() < 1e-9, "expected -1.0, got {score}");
}

#[test]
fn zero_magnitude_vector_falls_back_to_zero() {
    // A degenerate frame must read as maximally dissimilar, not abort.
    let zero = [0.0f32, 0.0, 0.0];
    let other = [0.2f32, 0.4, 0.6];
    assert_eq!(cosine_similarity(&zero, &other), 0.0);
    assert_eq!(cosine_similarity(&other, &zero), 0.0);
    assert_eq!(cosine_similarity(&zero, &zero), 0.0);
}

#[test]
fn builder_emits_one_fewer_point_than_pushes() {
    let mut builder = SimilaritySeriesBuilder::new(2);
    builder
        .push(Duration::from_secs(1), vec![1.0, 0.0])
        .unwrap();
    builder
        .push(Duration::from_secs(2), vec![1.0, 0.0])
        .unwrap();
    builder
        .push(Duration::from_secs(3), vec![0.0, 1.0])
        .unwrap();

    let series = builder.finish();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].timestamp, Duration::from_secs(2));
    assert!((series[0].score - 1.0).abs() < 1e-9);
    assert_eq!(series[1].timestamp, Duration::from_secs(3));
    assert!(series[1].score.abs() < 1e-9);
}

#[test]
fn builder_timestamps_strictly_increase() {
    let mut builder = SimilaritySeriesBuilder::new(1);
    builder.push(Duration::from_secs(5), vec![1.0]).unwrap();

    let result = builder.push(Duration::from_secs(5), vec![1.0]);
    assert!(
        matches!(result, Err(ChapterizeError::InvalidTimestamp(_))),
        "equal timestamp must be rejected, got {result:?}",
    );

    let result = builder.push(Duration::from_secs(4), vec![1.0]);
    assert!(matches!(result, Err(ChapterizeError::InvalidTimestamp(_))));
}

#[test]
fn builder_rejects_dimension_mismatch() {
    let mut builder = SimilaritySeriesBuilder::new(3);
    let result = builder.push(Duration::from_secs(1), vec![1.0, 2.0]);
    assert!(
        matches!(
            result,
            Err(ChapterizeError::DimensionMismatch {
                expected: 3,
                actual: 2,
            })
        ),
        "got {result:?}",
    );
}

#[test]
fn single_push_yields_empty_series() {
    let mut builder = SimilaritySeriesBuilder::new(1);
    builder.push(Duration::from_secs(1), vec![0.5]).unwrap();
    assert!(builder.is_empty());
    assert!(builder.finish().is_empty());
}
