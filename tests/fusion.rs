//! Caption fusion tests.

use std::time::Duration;

use chapterize::{Caption, ChapterizeError, FusionOptions, SceneCursor, fuse};

fn captions_at(starts_secs: &[f64]) -> Vec<Caption> {
    starts_secs
        .iter()
        .enumerate()
        .map(|(index, &start)| {
            Caption::new(
                Duration::from_secs_f64(start),
                Duration::from_secs_f64(start + 4.0),
                format!("caption {index}"),
            )
        })
        .collect()
}

fn seconds(values: &[u64]) -> Vec<Duration> {
    values.iter().map(|&secs| Duration::from_secs(secs)).collect()
}

#[test]
fn scene_cursor_advances_once_per_call_and_never_rewinds() {
    let changes = seconds(&[1, 2]);
    let mut cursor = SceneCursor::new(&changes);

    // A timestamp past both changes drains them one call at a time.
    assert!(cursor.crossed(Duration::from_secs(10)));
    assert!(cursor.crossed(Duration::from_secs(10)));
    assert!(!cursor.crossed(Duration::from_secs(10)));

    // Exhausted cursors stay exhausted.
    assert!(!cursor.crossed(Duration::from_secs(100)));
}

#[test]
fn scene_pass_is_a_two_pointer_merge() {
    // Scene changes [10, 40, 90] against caption starts [5, 15, 42, 85, 95]
    // must yield [false, true, true, false, true]: the cursor advances
    // exactly once per crossing and never regresses.
    let captions = captions_at(&[5.0, 15.0, 42.0, 85.0, 95.0]);
    let changes = seconds(&[10, 40, 90]);

    // Frame decisions are scene-driven regardless of the pacing pass.
    let decisions = fuse(&captions, &changes, &FusionOptions::new()).unwrap();

    let inserts: Vec<bool> = decisions.iter().map(|d| d.insert_frame).collect();
    assert_eq!(inserts, vec![false, true, true, false, true]);
}

#[test]
fn time_pass_paces_paragraphs_at_half_minute_by_default() {
    // 10 captions spaced 10 s apart, no scene changes: breaks land exactly
    // at starts {0, 30, 60, 90}.
    let captions = captions_at(&[
        0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0,
    ]);
    let decisions = fuse(&captions, &[], &FusionOptions::new()).unwrap();

    let breaks: Vec<bool> = decisions.iter().map(|d| d.paragraph_break).collect();
    assert_eq!(
        breaks,
        vec![true, false, false, true, false, false, true, false, false, true],
    );
    assert!(
        decisions.iter().all(|d| !d.insert_frame),
        "no scene changes means no frame inserts",
    );
}

#[test]
fn close_breaks_are_suppressed_not_merged() {
    // Caption at t=5 crosses the scene change at t=2 but sits within 30 s of
    // the opening break; the time-based trigger at t=40 survives.
    let captions = captions_at(&[0.0, 5.0, 40.0]);
    let changes = seconds(&[2]);
    let decisions = fuse(&captions, &changes, &FusionOptions::new()).unwrap();

    let breaks: Vec<bool> = decisions.iter().map(|d| d.paragraph_break).collect();
    assert_eq!(breaks, vec![true, false, true]);

    // The suppressed caption keeps its frame insert: pictures follow the
    // scene pass alone.
    let inserts: Vec<bool> = decisions.iter().map(|d| d.insert_frame).collect();
    assert_eq!(inserts, vec![false, true, false]);
}

#[test]
fn suppression_forces_a_break_after_the_spacing_window() {
    // With a 10-minute pacing floor, only the opening caption and the scene
    // crossing at t=5 mark a break. Suppressing t=5 would leave the document
    // with no break at all, so one is forced at the first caption past 30 s.
    let captions = captions_at(&[0.0, 5.0, 35.0, 50.0]);
    let changes = seconds(&[2]);
    let options = FusionOptions::new().minutes_per_paragraph(10.0);
    let decisions = fuse(&captions, &changes, &options).unwrap();

    let breaks: Vec<bool> = decisions.iter().map(|d| d.paragraph_break).collect();
    assert_eq!(breaks, vec![true, false, true, false]);
}

#[test]
fn natural_gaps_do_not_force_breaks() {
    // No mark was suppressed here, so the long quiet stretch stays unbroken
    // under a 10-minute pacing floor.
    let captions = captions_at(&[0.0, 40.0, 80.0]);
    let options = FusionOptions::new().minutes_per_paragraph(10.0);
    let decisions = fuse(&captions, &[], &options).unwrap();

    let breaks: Vec<bool> = decisions.iter().map(|d| d.paragraph_break).collect();
    assert_eq!(breaks, vec![true, false, false]);
}

#[test]
fn accepted_breaks_respect_minimum_spacing() {
    // Dense marks from both passes: captions every 10 s, a scene change
    // before each one. Accepted breaks must still be >= 30 s apart.
    let starts: Vec<f64> = (0..20).map(|i| i as f64 * 10.0).collect();
    let captions = captions_at(&starts);
    let changes: Vec<Duration> = (0..20)
        .map(|i| Duration::from_secs(i * 10 + 5))
        .collect();

    let decisions = fuse(&captions, &changes, &FusionOptions::new()).unwrap();

    let accepted: Vec<Duration> = captions
        .iter()
        .zip(&decisions)
        .filter(|(_, d)| d.paragraph_break)
        .map(|(c, _)| c.start)
        .collect();

    assert!(!accepted.is_empty());
    for pair in accepted.windows(2) {
        assert!(
            pair[1] - pair[0] >= Duration::from_secs(30),
            "breaks at {pair:?} violate the spacing floor",
        );
    }
}

#[test]
fn picture_embed_toggle_disables_all_inserts() {
    let captions = captions_at(&[0.0, 15.0, 42.0]);
    let changes = seconds(&[10, 40]);
    let options = FusionOptions::new().picture_embed(false);
    let decisions = fuse(&captions, &changes, &options).unwrap();

    assert!(decisions.iter().all(|d| !d.insert_frame));
    // Paragraph pacing is unaffected by the toggle.
    assert!(decisions[0].paragraph_break);
}

#[test]
fn empty_caption_list_is_an_error() {
    let result = fuse(&[], &[], &FusionOptions::new());
    assert!(matches!(result, Err(ChapterizeError::NoCaptions)));
}

#[test]
fn caption_with_inverted_interval_is_rejected() {
    let captions = vec![Caption::new(
        Duration::from_secs(10),
        Duration::from_secs(10),
        "zero-length",
    )];
    let result = fuse(&captions, &[], &FusionOptions::new());
    assert!(
        matches!(result, Err(ChapterizeError::InvalidCaption { index: 0, .. })),
        "got {result:?}",
    );
}

#[test]
fn unordered_captions_are_rejected() {
    let captions = vec![
        Caption::new(Duration::from_secs(10), Duration::from_secs(14), "b"),
        Caption::new(Duration::from_secs(0), Duration::from_secs(4), "a"),
    ];
    let result = fuse(&captions, &[], &FusionOptions::new());
    assert!(
        matches!(result, Err(ChapterizeError::InvalidCaption { index: 1, .. })),
        "got {result:?}",
    );
}

#[test]
fn one_decision_per_caption_in_order() {
    let captions = captions_at(&[0.0, 31.0, 62.0, 93.0]);
    let decisions = fuse(&captions, &[], &FusionOptions::new()).unwrap();
    assert_eq!(decisions.len(), captions.len());
    // Every caption is 31 s from its predecessor, so each opens a paragraph.
    assert!(decisions.iter().all(|d| d.paragraph_break));
}
