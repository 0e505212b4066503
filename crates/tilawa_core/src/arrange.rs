//! Pure arrangement helpers. None of these touch a [`Timeline`]; the
//! editing operations call them and apply the result.
//!
//! [`Timeline`]: crate::types::Timeline

use crate::error::{CoreError, Result};
use crate::span::TimeSpan;
use crate::types::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An uncovered interval `[start, end)` on a track.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gap {
    pub start: TimeUs,
    pub end: TimeUs,
}

impl Gap {
    pub fn duration(&self) -> TimeUs {
        self.end - self.start
    }
}

/// Lay clips out back to back from zero, in order of their current start
/// (ties broken by id), leaving `padding` between neighbours.
///
/// A negative padding is treated as zero.
pub fn auto_arrange(clips: &[Clip], padding: TimeUs) -> Vec<Clip> {
    let padding = padding.max(TimeUs::ZERO);
    let mut sorted: Vec<Clip> = clips.to_vec();
    sorted.sort_by(|a, b| a.start().cmp(&b.start()).then(a.id.cmp(&b.id)));

    let mut running = TimeUs::ZERO;
    for clip in &mut sorted {
        clip.span = clip.span.shifted_to(running);
        running = running + clip.duration() + padding;
    }
    sorted
}

/// Join clips that sit exactly end-to-start into one new clip.
///
/// The inputs may be given in any order. The result gets a fresh id and
/// takes its name and media handles from the earliest input.
pub fn merge_clips(clips: &[Clip]) -> Result<Clip> {
    if clips.len() < 2 {
        return Err(CoreError::InsufficientClips);
    }
    let first = &clips[0];
    if clips
        .iter()
        .any(|c| c.track_id != first.track_id || c.kind != first.kind)
    {
        return Err(CoreError::MixedTracks);
    }

    let mut sorted: Vec<&Clip> = clips.iter().collect();
    sorted.sort_by(|a, b| a.start().cmp(&b.start()).then(a.id.cmp(&b.id)));

    for pair in sorted.windows(2) {
        if pair[1].start() != pair[0].end() {
            return Err(CoreError::NotAdjacent);
        }
    }

    let head = sorted[0];
    let last = sorted[sorted.len() - 1];
    Ok(Clip {
        id: Uuid::new_v4(),
        track_id: head.track_id,
        kind: head.kind,
        span: TimeSpan::from_bounds(head.start(), last.end())?,
        display_name: head.display_name.clone(),
        source_ref: head.source_ref.clone(),
        thumbnail_ref: head.thumbnail_ref.clone(),
    })
}

/// Uncovered intervals of `track` within `[0, total_duration)`.
pub fn find_gaps(track: &Track, total_duration: TimeUs) -> Vec<Gap> {
    let mut sorted: Vec<&Clip> = track.clips.iter().collect();
    sorted.sort_by_key(|c| c.start());

    let mut gaps = Vec::new();
    let mut current_end = TimeUs::ZERO;
    for clip in sorted {
        if clip.start() > current_end {
            gaps.push(Gap {
                start: current_end,
                end: clip.start(),
            });
        }
        current_end = current_end.max(clip.end());
    }
    if current_end < total_duration {
        gaps.push(Gap {
            start: current_end,
            end: total_duration,
        });
    }
    gaps
}
