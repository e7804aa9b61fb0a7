//! Caption fusion.
//!
//! Merges two independent break signals — elapsed-time pacing and detected
//! scene changes — into one [`FusionDecision`] per caption. The engine is a
//! single forward scan over the caption list carrying three pieces of state
//! (the pacing clock, the scene cursor, and the last accepted break), with no
//! backtracking: O(n) total work and a single terminal state.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use chapterize::{Caption, FusionOptions, fuse};
//!
//! let captions = vec![
//!     Caption::new(Duration::from_secs(0), Duration::from_secs(4), "intro"),
//!     Caption::new(Duration::from_secs(35), Duration::from_secs(39), "later"),
//! ];
//! let scene_changes = [Duration::from_secs(20)];
//! let decisions = fuse(&captions, &scene_changes, &FusionOptions::new())?;
//! assert!(decisions[1].paragraph_break);
//! assert!(decisions[1].insert_frame);
//! # Ok::<(), chapterize::ChapterizeError>(())
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::caption::{Caption, validate_captions};
use crate::error::ChapterizeError;

/// The per-caption output of the fusion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionDecision {
    /// Start a new document paragraph at this caption.
    ///
    /// The first caption always reports `true` — it opens the document — and
    /// the assembler may treat that value as a don't-care.
    pub paragraph_break: bool,
    /// Embed a video frame (pulled at the caption's start time) here.
    pub insert_frame: bool,
}

/// Fusion settings.
///
/// The defaults pace paragraphs at one per half minute, keep breaks at least
/// 30 seconds apart, and embed a frame at every detected scene change.
#[derive(Debug, Clone)]
pub struct FusionOptions {
    /// Time-based pacing floor, in minutes per paragraph. Default: 0.5.
    pub minutes_per_paragraph: f64,
    /// Whether scene changes produce frame inserts at all. When disabled,
    /// `insert_frame` is `false` for every caption. Default: enabled.
    pub picture_embed: bool,
    /// Minimum spacing between accepted paragraph breaks. Default: 30 s.
    pub min_break_spacing: Duration,
}

impl Default for FusionOptions {
    fn default() -> Self {
        Self {
            minutes_per_paragraph: 0.5,
            picture_embed: true,
            min_break_spacing: Duration::from_secs(30),
        }
    }
}

impl FusionOptions {
    /// Create a new fusion configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pacing floor in minutes per paragraph.
    pub fn minutes_per_paragraph(mut self, minutes: f64) -> Self {
        self.minutes_per_paragraph = minutes;
        self
    }

    /// Enable or disable frame inserts.
    pub fn picture_embed(mut self, enabled: bool) -> Self {
        self.picture_embed = enabled;
        self
    }

    /// Set the minimum spacing between accepted paragraph breaks.
    pub fn min_break_spacing(mut self, spacing: Duration) -> Self {
        self.min_break_spacing = spacing;
        self
    }

    fn pacing(&self) -> Duration {
        Duration::from_secs_f64((self.minutes_per_paragraph * 60.0).max(0.0))
    }
}

/// Forward-only cursor over a time-ordered scene-change list.
///
/// Both the scene list and the caption list are time-ordered, so a two-pointer
/// merge is correct and linear — but only as long as the cursor never rewinds.
/// Encoding the cursor as a type (rather than a raw index threaded through the
/// scan) makes that invariant unbreakable at the call site.
#[derive(Debug)]
pub struct SceneCursor<'a> {
    changes: &'a [Duration],
    position: usize,
}

impl<'a> SceneCursor<'a> {
    /// Create a cursor at the start of a time-ordered scene-change list.
    pub fn new(changes: &'a [Duration]) -> Self {
        Self {
            changes,
            position: 0,
        }
    }

    /// Whether `timestamp` has advanced strictly past the current scene
    /// change. If so, the cursor moves on — at most one advance per call,
    /// and never backwards. Once the list is exhausted, always `false`.
    pub fn crossed(&mut self, timestamp: Duration) -> bool {
        match self.changes.get(self.position) {
            Some(&change) if timestamp > change => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }
}

/// Fuse captions with scene changes into per-caption decisions.
///
/// `scene_changes` must be time-ordered (the detector's output already is)
/// and may be empty. Produces exactly one decision per caption, in caption
/// order; either the whole sequence is produced or an error is returned.
///
/// # Errors
///
/// - [`ChapterizeError::NoCaptions`] if `captions` is empty.
/// - [`ChapterizeError::InvalidCaption`] if a caption is unordered or has
///   `start >= end`.
pub fn fuse(
    captions: &[Caption],
    scene_changes: &[Duration],
    options: &FusionOptions,
) -> Result<Vec<FusionDecision>, ChapterizeError> {
    validate_captions(captions)?;

    let time_marks = time_based_pass(captions, options.pacing());
    let scene_marks = scene_based_pass(captions, scene_changes);

    let merged: Vec<bool> = time_marks
        .iter()
        .zip(scene_marks.iter())
        .map(|(time, scene)| *time || *scene)
        .collect();
    let breaks = enforce_break_spacing(captions, &merged, options.min_break_spacing);

    let decisions = breaks
        .into_iter()
        .zip(scene_marks)
        .map(|(paragraph_break, scene)| FusionDecision {
            paragraph_break,
            insert_frame: options.picture_embed && scene,
        })
        .collect();

    Ok(decisions)
}

/// Elapsed-time pacing pass.
///
/// The first caption always triggers (it opens the document); thereafter a
/// caption triggers once `pacing` has elapsed since the last trigger, which
/// resets the clock to its start time.
fn time_based_pass(captions: &[Caption], pacing: Duration) -> Vec<bool> {
    let mut last_break_time: Option<Duration> = None;

    captions
        .iter()
        .map(|caption| match last_break_time {
            Some(last) if caption.start.saturating_sub(last) < pacing => false,
            _ => {
                last_break_time = Some(caption.start);
                true
            }
        })
        .collect()
}

/// Scene-change pass: a linear two-pointer merge via [`SceneCursor`].
fn scene_based_pass(captions: &[Caption], scene_changes: &[Duration]) -> Vec<bool> {
    let mut cursor = SceneCursor::new(scene_changes);
    captions
        .iter()
        .map(|caption| cursor.crossed(caption.start))
        .collect()
}

/// Minimum-spacing pass over the OR-merged break marks.
///
/// A mark closer than `spacing` to the last accepted break is suppressed —
/// not merged into a neighbour. If a suppression would leave the document
/// with no break for longer than `spacing`, a break is forced at the first
/// caption at or beyond the window, even though neither underlying rule
/// fired there.
fn enforce_break_spacing(captions: &[Caption], merged: &[bool], spacing: Duration) -> Vec<bool> {
    let mut accepted = Vec::with_capacity(merged.len());
    let mut last_accepted: Option<Duration> = None;
    let mut suppressed_since_accept = false;

    for (caption, &marked) in captions.iter().zip(merged.iter()) {
        let elapsed = last_accepted.map(|last| caption.start.saturating_sub(last));
        let window_open = elapsed.is_none_or(|e| e >= spacing);

        let accept = if marked {
            if window_open {
                true
            } else {
                suppressed_since_accept = true;
                false
            }
        } else {
            // Gap-forcing: only a prior suppression justifies inventing a
            // break neither rule asked for.
            suppressed_since_accept && window_open
        };

        if accept {
            last_accepted = Some(caption.start);
            suppressed_since_accept = false;
        }
        accepted.push(accept);
    }

    accepted
}
