//! FFmpeg-backed video source tests.
//!
//! Decode tests require fixture files under `tests/fixtures/` and skip
//! themselves when the fixtures are absent; the error-path tests always run.

#![cfg(feature = "ffmpeg")]

use std::path::Path;
use std::time::Duration;

use chapterize::{ChapterizeError, MediaSource, VideoSource, collect_samples};

#[test]
fn open_nonexistent_file() {
    let result = MediaSource::open("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open video source"),
        "Error message should mention the open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    // A file with garbage content must fail to open, not decode garbage.
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = MediaSource::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn sampled_frames_respect_minimum_spacing() {
    let path = "tests/fixtures/sample_video.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let mut source = MediaSource::open(path).expect("Failed to open fixture");
    let samples = collect_samples(&mut source).expect("Failed to sample fixture");

    for pair in samples.windows(2) {
        assert!(
            pair[1].timestamp - pair[0].timestamp >= Duration::from_secs(1),
            "samples at {:?} and {:?} are closer than 1 s",
            pair[0].timestamp,
            pair[1].timestamp,
        );
    }
}

#[test]
fn frame_at_beyond_duration_is_rejected() {
    let path = "tests/fixtures/sample_video.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let mut source = MediaSource::open(path).expect("Failed to open fixture");
    // 1 hour is way beyond the fixture's length.
    let result = source.frame_at(Duration::from_secs(3600));
    assert!(
        matches!(result, Err(ChapterizeError::InvalidTimestamp(_))),
        "got {result:?}",
    );
}

#[test]
fn frame_at_returns_a_frame_with_source_dimensions() {
    let path = "tests/fixtures/sample_video.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let mut source = MediaSource::open(path).expect("Failed to open fixture");
    let (width, height) = source.dimensions();
    let frame = source
        .frame_at(Duration::from_secs(1))
        .expect("Failed to pull frame");
    assert_eq!(frame.dimensions(), (width, height));
    assert!(source.frame_rate() > 0.0);
}
