use crate::arrange::{self, Gap};
use crate::error::{CoreError, Result};
use crate::span::TimeSpan;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// A resize must leave a clip strictly longer than this.
pub const MIN_CLIP_DURATION: TimeUs = TimeUs(100_000);

/// Which edge of a clip a resize drags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// Keeps the end fixed and moves the start.
    Left,
    /// Keeps the start fixed and moves the end.
    Right,
}

impl std::str::FromStr for Edge {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" | "in" => Ok(Edge::Left),
            "right" | "out" => Ok(Edge::Right),
            other => Err(CoreError::InvalidOperation(format!("unknown edge: {other}"))),
        }
    }
}

// Every operation below checks all of its preconditions before touching
// `self`, so an `Err` always leaves the timeline exactly as it was.
impl Timeline {
    // -----------------------------------------------------------------------
    // Tracks
    // -----------------------------------------------------------------------

    /// Append a new empty track and return its id.
    pub fn add_track(&mut self, kind: ClipKind, name: impl Into<String>) -> Uuid {
        let track = Track::new(kind, name);
        let id = track.id;
        self.tracks.push(track);
        id
    }

    /// Remove a track together with all of its clips.
    pub fn remove_track(&mut self, track_id: Uuid) -> Result<Track> {
        let idx = self
            .find_track_index(track_id)
            .ok_or(CoreError::TrackNotFound(track_id))?;
        if self.tracks[idx].locked {
            return Err(CoreError::TrackLocked(track_id));
        }
        let track = self.tracks.remove(idx);
        self.clamp_playhead();
        Ok(track)
    }

    pub fn set_track_locked(&mut self, track_id: Uuid, locked: bool) -> Result<()> {
        self.track_mut(track_id)?.locked = locked;
        Ok(())
    }

    pub fn set_track_visible(&mut self, track_id: Uuid, visible: bool) -> Result<()> {
        self.track_mut(track_id)?.visible = visible;
        Ok(())
    }

    pub fn set_track_volume(&mut self, track_id: Uuid, volume: Option<f64>) -> Result<()> {
        if let Some(v) = volume {
            if !v.is_finite() || v < 0.0 {
                return Err(CoreError::InvalidOperation(format!(
                    "volume must be finite and non-negative (got {v})"
                )));
            }
        }
        self.track_mut(track_id)?.volume = volume;
        Ok(())
    }

    pub fn set_track_pan(&mut self, track_id: Uuid, pan: Option<f64>) -> Result<()> {
        if let Some(p) = pan {
            if !(-1.0..=1.0).contains(&p) {
                return Err(CoreError::InvalidOperation(format!(
                    "pan must be within [-1, 1] (got {p})"
                )));
            }
        }
        self.track_mut(track_id)?.pan = pan;
        Ok(())
    }

    fn track_mut(&mut self, track_id: Uuid) -> Result<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or(CoreError::TrackNotFound(track_id))
    }

    // -----------------------------------------------------------------------
    // Markers, duration, zoom
    // -----------------------------------------------------------------------

    pub fn add_marker(&mut self, time: TimeUs, label: impl Into<String>) -> Result<Uuid> {
        if time < TimeUs::ZERO || time > TimeUs::MAX {
            return Err(CoreError::InvalidSpan(format!(
                "marker time must be within [0, {}] (got {time})",
                TimeUs::MAX
            )));
        }
        let marker = Marker {
            id: Uuid::new_v4(),
            time,
            label: label.into(),
        };
        let id = marker.id;
        let idx = self.markers.partition_point(|m| m.time <= time);
        self.markers.insert(idx, marker);
        Ok(id)
    }

    pub fn remove_marker(&mut self, marker_id: Uuid) -> Result<Marker> {
        let idx = self
            .markers
            .iter()
            .position(|m| m.id == marker_id)
            .ok_or(CoreError::MarkerNotFound(marker_id))?;
        Ok(self.markers.remove(idx))
    }

    /// Pin the duration from project settings, or unpin with `None` so it
    /// follows the content again.
    pub fn set_pinned_duration(&mut self, duration: Option<TimeUs>) -> Result<()> {
        if let Some(d) = duration {
            if d <= TimeUs::ZERO || d > TimeUs::MAX {
                return Err(CoreError::InvalidSpan(format!(
                    "pinned duration must be within (0, {}] (got {}us)",
                    TimeUs::MAX,
                    d.0
                )));
            }
        }
        self.pinned_duration = duration;
        self.clamp_playhead();
        Ok(())
    }

    /// Store a zoom factor. Range clamping is the caller's job
    /// (see [`crate::coords::ZoomLimits`]).
    pub fn set_zoom(&mut self, zoom: f64) -> Result<()> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(CoreError::InvalidZoom(zoom));
        }
        self.zoom = zoom;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Clips
    // -----------------------------------------------------------------------

    /// Add a clip to a track. The clip is kept in start order; overlap with
    /// existing clips is allowed.
    pub fn add_clip(&mut self, track_id: Uuid, mut clip: Clip) -> Result<()> {
        let idx = self
            .find_track_index(track_id)
            .ok_or(CoreError::TrackNotFound(track_id))?;
        let track = &self.tracks[idx];
        if clip.kind != track.kind {
            return Err(CoreError::KindMismatch {
                expected: track.kind,
                found: clip.kind,
            });
        }
        // TimeSpan cannot hold an invalid span, so the InvalidSpan case for
        // add is raised where the span is built.
        if track.locked {
            return Err(CoreError::TrackLocked(track_id));
        }
        if self.clip(clip.id).is_some() {
            return Err(CoreError::DuplicateClip(clip.id));
        }

        clip.track_id = track_id;
        self.tracks[idx].insert_sorted(clip);
        Ok(())
    }

    /// Remove a clip by its id. Returns the removed clip.
    pub fn remove_clip(&mut self, clip_id: Uuid) -> Result<Clip> {
        let (ti, ci) = self
            .find_clip_location(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let clip = self.tracks[ti].clips.remove(ci);
        self.clamp_playhead();
        Ok(clip)
    }

    /// Move a clip to a new start on its own track. Overlapping a sibling is
    /// allowed; the later clip in track order draws on top.
    pub fn move_clip(&mut self, clip_id: Uuid, new_start: TimeUs) -> Result<()> {
        let (ti, ci) = self
            .find_clip_location(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let track = &self.tracks[ti];
        if track.locked {
            return Err(CoreError::TrackLocked(track.id));
        }
        let span = track.clips[ci].span.with_start(new_start)?;

        self.replace_span(ti, ci, span);
        self.clamp_playhead();
        Ok(())
    }

    /// Move a clip onto another track of the same kind.
    pub fn move_clip_to_track(
        &mut self,
        clip_id: Uuid,
        track_id: Uuid,
        new_start: TimeUs,
    ) -> Result<()> {
        let (src_ti, ci) = self
            .find_clip_location(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let dst_ti = self
            .find_track_index(track_id)
            .ok_or(CoreError::TrackNotFound(track_id))?;

        let src = &self.tracks[src_ti];
        let dst = &self.tracks[dst_ti];
        let clip = &src.clips[ci];
        if clip.kind != dst.kind {
            return Err(CoreError::KindMismatch {
                expected: dst.kind,
                found: clip.kind,
            });
        }
        if src.locked {
            return Err(CoreError::TrackLocked(src.id));
        }
        if dst.locked {
            return Err(CoreError::TrackLocked(dst.id));
        }
        let span = clip.span.with_start(new_start)?;

        let mut clip = self.tracks[src_ti].clips.remove(ci);
        clip.span = span;
        clip.track_id = track_id;
        self.tracks[dst_ti].insert_sorted(clip);
        self.clamp_playhead();
        Ok(())
    }

    /// Change a clip's duration by dragging one edge.
    pub fn resize_clip(&mut self, clip_id: Uuid, edge: Edge, new_duration: TimeUs) -> Result<()> {
        let (ti, ci) = self
            .find_clip_location(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let track = &self.tracks[ti];
        if track.locked {
            return Err(CoreError::TrackLocked(track.id));
        }
        if new_duration <= MIN_CLIP_DURATION {
            return Err(CoreError::InvalidSpan(format!(
                "duration {}us must exceed the {}us minimum",
                new_duration.0, MIN_CLIP_DURATION.0
            )));
        }

        let old = track.clips[ci].span;
        let span = match edge {
            Edge::Left => TimeSpan::new(old.end() - new_duration, new_duration)?,
            Edge::Right => old.with_duration(new_duration)?,
        };

        self.replace_span(ti, ci, span);
        self.clamp_playhead();
        Ok(())
    }

    /// Split a clip at a timeline position strictly inside it.
    ///
    /// The original id is retired; both fragments get fresh ids, returned as
    /// `(left, right)`.
    pub fn split_clip(&mut self, clip_id: Uuid, at: TimeUs) -> Result<(Uuid, Uuid)> {
        let (ti, ci) = self
            .find_clip_location(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let track = &self.tracks[ti];
        if track.locked {
            return Err(CoreError::TrackLocked(track.id));
        }
        let original = &track.clips[ci];
        if at <= original.start() || at >= original.end() {
            return Err(CoreError::SplitPointOutOfRange);
        }

        let left = Clip {
            id: Uuid::new_v4(),
            span: TimeSpan::from_bounds(original.start(), at)?,
            ..original.clone()
        };
        let right = Clip {
            id: Uuid::new_v4(),
            span: TimeSpan::from_bounds(at, original.end())?,
            ..original.clone()
        };
        let ids = (left.id, right.id);

        // left keeps the original start, so it can take the original slot
        self.tracks[ti].clips[ci] = left;
        self.tracks[ti].insert_sorted(right);
        Ok(ids)
    }

    /// Merge adjacent clips of one track into a single new clip.
    pub fn merge_clips(&mut self, clip_ids: &[Uuid]) -> Result<Uuid> {
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = clip_ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if ids.len() < 2 {
            return Err(CoreError::InsufficientClips);
        }

        let clips = ids
            .iter()
            .map(|id| self.clip(*id).cloned().ok_or(CoreError::ClipNotFound(*id)))
            .collect::<Result<Vec<_>>>()?;
        let track_id = clips[0].track_id;
        if clips.iter().any(|c| c.track_id != track_id) {
            return Err(CoreError::MixedTracks);
        }
        let ti = self
            .find_track_index(track_id)
            .ok_or(CoreError::TrackNotFound(track_id))?;
        if self.tracks[ti].locked {
            return Err(CoreError::TrackLocked(track_id));
        }
        let merged = arrange::merge_clips(&clips)?;
        let merged_id = merged.id;

        let track = &mut self.tracks[ti];
        track.clips.retain(|c| !seen.contains(&c.id));
        track.insert_sorted(merged);
        Ok(merged_id)
    }

    /// Re-lay a track's clips back to back from zero with `padding` between
    /// them. See [`arrange::auto_arrange`].
    pub fn auto_arrange_track(&mut self, track_id: Uuid, padding: TimeUs) -> Result<()> {
        let idx = self
            .find_track_index(track_id)
            .ok_or(CoreError::TrackNotFound(track_id))?;
        if self.tracks[idx].locked {
            return Err(CoreError::TrackLocked(track_id));
        }
        if padding < TimeUs::ZERO {
            return Err(CoreError::InvalidSpan(format!(
                "padding must not be negative (got {}us)",
                padding.0
            )));
        }

        let arranged = arrange::auto_arrange(&self.tracks[idx].clips, padding);
        if let Some(last) = arranged.last() {
            if last.end() > TimeUs::MAX {
                return Err(CoreError::InvalidSpan(format!(
                    "arranged clips would run past {}",
                    TimeUs::MAX
                )));
            }
        }
        self.tracks[idx].clips = arranged;
        self.clamp_playhead();
        Ok(())
    }

    /// Uncovered intervals of one track up to the timeline duration.
    pub fn gaps(&self, track_id: Uuid) -> Result<Vec<Gap>> {
        let track = self
            .track(track_id)
            .ok_or(CoreError::TrackNotFound(track_id))?;
        Ok(arrange::find_gaps(track, self.duration()))
    }

    /// Give the clip at (ti, ci) a new span and re-seat it in start order.
    fn replace_span(&mut self, ti: usize, ci: usize, span: TimeSpan) {
        let track = &mut self.tracks[ti];
        let mut clip = track.clips.remove(ci);
        clip.span = span;
        track.insert_sorted(clip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::overlaps;

    fn secs(s: f64) -> TimeUs {
        TimeUs::from_seconds(s)
    }

    fn video_clip(start: f64, duration: f64) -> Clip {
        Clip::new(
            ClipKind::Video,
            TimeSpan::from_seconds(start, duration).unwrap(),
            "background",
            "media://background",
        )
    }

    /// One video track holding a single clip at [0, 5s).
    fn make_test_timeline() -> (Timeline, Uuid, Uuid) {
        let mut tl = Timeline::new();
        let track_id = tl.add_track(ClipKind::Video, "V1");
        let clip = video_clip(0.0, 5.0);
        let clip_id = clip.id;
        tl.add_clip(track_id, clip).unwrap();
        (tl, track_id, clip_id)
    }

    fn assert_unchanged<F>(tl: &mut Timeline, op: F)
    where
        F: FnOnce(&mut Timeline) -> bool,
    {
        let before = tl.clone();
        assert!(op(&mut *tl), "operation was expected to fail");
        assert_eq!(*tl, before);
    }

    // -----------------------------------------------------------------------
    // tracks
    // -----------------------------------------------------------------------

    #[test]
    fn add_and_remove_track() {
        let mut tl = Timeline::new();
        let id = tl.add_track(ClipKind::Subtitle, "Verses");
        assert_eq!(tl.tracks().len(), 1);
        assert_eq!(tl.track(id).unwrap().kind, ClipKind::Subtitle);

        let removed = tl.remove_track(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(tl.tracks().is_empty());
        assert!(matches!(tl.remove_track(id), Err(CoreError::TrackNotFound(_))));
    }

    #[test]
    fn removing_track_reclamps_playhead() {
        let (mut tl, track_id, _) = make_test_timeline();
        tl.playhead = secs(4.0);
        tl.remove_track(track_id).unwrap();
        assert_eq!(tl.playhead(), TimeUs::ZERO);
    }

    #[test]
    fn locked_track_cannot_be_removed() {
        let (mut tl, track_id, _) = make_test_timeline();
        tl.set_track_locked(track_id, true).unwrap();
        assert_unchanged(&mut tl, |tl| {
            matches!(tl.remove_track(track_id), Err(CoreError::TrackLocked(_)))
        });
    }

    #[test]
    fn track_volume_and_pan_validation() {
        let (mut tl, track_id, _) = make_test_timeline();
        tl.set_track_volume(track_id, Some(0.8)).unwrap();
        tl.set_track_pan(track_id, Some(-0.5)).unwrap();
        assert_eq!(tl.track(track_id).unwrap().volume, Some(0.8));
        assert_eq!(tl.track(track_id).unwrap().pan, Some(-0.5));

        assert!(tl.set_track_volume(track_id, Some(-1.0)).is_err());
        assert!(tl.set_track_volume(track_id, Some(f64::NAN)).is_err());
        assert!(tl.set_track_pan(track_id, Some(1.5)).is_err());
        tl.set_track_volume(track_id, None).unwrap();
        assert_eq!(tl.track(track_id).unwrap().volume, None);
    }

    // -----------------------------------------------------------------------
    // markers, duration, zoom
    // -----------------------------------------------------------------------

    #[test]
    fn markers_stay_sorted() {
        let mut tl = Timeline::new();
        tl.add_marker(secs(3.0), "ayah 3").unwrap();
        let first = tl.add_marker(secs(1.0), "ayah 1").unwrap();
        assert_eq!(tl.markers()[0].id, first);
        assert!(tl.add_marker(secs(-1.0), "bad").is_err());

        tl.remove_marker(first).unwrap();
        assert_eq!(tl.markers().len(), 1);
        assert!(matches!(tl.remove_marker(first), Err(CoreError::MarkerNotFound(_))));
    }

    #[test]
    fn duration_follows_content_unless_pinned() {
        let (mut tl, _, _) = make_test_timeline();
        assert_eq!(tl.duration(), secs(5.0));

        tl.set_pinned_duration(Some(secs(30.0))).unwrap();
        assert_eq!(tl.duration(), secs(30.0));

        tl.playhead = secs(20.0);
        tl.set_pinned_duration(None).unwrap();
        assert_eq!(tl.duration(), secs(5.0));
        assert_eq!(tl.playhead(), secs(5.0));

        assert!(tl.set_pinned_duration(Some(TimeUs::ZERO)).is_err());
    }

    #[test]
    fn times_past_the_limit_are_rejected() {
        let (mut tl, track_id, clip_id) = make_test_timeline();
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.add_marker(TimeUs(TimeUs::MAX.0 + 1), "late"),
                Err(CoreError::InvalidSpan(_))
            )
        });
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.set_pinned_duration(Some(TimeUs(i64::MAX))),
                Err(CoreError::InvalidSpan(_))
            )
        });
        assert_unchanged(&mut tl, |tl| {
            matches!(tl.move_clip(clip_id, TimeUs::MAX), Err(CoreError::InvalidSpan(_)))
        });
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.resize_clip(clip_id, Edge::Right, TimeUs(i64::MAX)),
                Err(CoreError::InvalidSpan(_))
            )
        });

        tl.add_clip(track_id, video_clip(10.0, 1.0)).unwrap();
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.auto_arrange_track(track_id, TimeUs::MAX),
                Err(CoreError::InvalidSpan(_))
            )
        });
    }

    #[test]
    fn zoom_must_be_positive_and_finite() {
        let mut tl = Timeline::new();
        tl.set_zoom(4.0).unwrap();
        assert_eq!(tl.zoom(), 4.0);
        assert!(matches!(tl.set_zoom(0.0), Err(CoreError::InvalidZoom(_))));
        assert!(tl.set_zoom(-2.0).is_err());
        assert!(tl.set_zoom(f64::INFINITY).is_err());
        assert_eq!(tl.zoom(), 4.0);
    }

    // -----------------------------------------------------------------------
    // add_clip
    // -----------------------------------------------------------------------

    #[test]
    fn add_clip_assigns_track_and_sorts() {
        let (mut tl, track_id, first) = make_test_timeline();
        let early = video_clip(0.0, 1.0);
        let late = video_clip(10.0, 2.0);
        let (early_id, late_id) = (early.id, late.id);
        tl.add_clip(track_id, late).unwrap();
        tl.add_clip(track_id, early).unwrap();

        let ids: Vec<Uuid> = tl.track(track_id).unwrap().clips.iter().map(|c| c.id).collect();
        // equal starts keep insertion order
        assert_eq!(ids, vec![first, early_id, late_id]);
        assert!(tl.clips().all(|c| c.track_id == track_id));
        assert_eq!(tl.duration(), secs(12.0));
    }

    #[test]
    fn add_clip_overlap_is_allowed() {
        let (mut tl, track_id, _) = make_test_timeline();
        assert!(tl.add_clip(track_id, video_clip(2.0, 5.0)).is_ok());
        assert_eq!(tl.track(track_id).unwrap().clips.len(), 2);
    }

    #[test]
    fn add_clip_to_nonexistent_track_fails() {
        let mut tl = Timeline::new();
        let result = tl.add_clip(Uuid::new_v4(), video_clip(0.0, 1.0));
        assert!(matches!(result, Err(CoreError::TrackNotFound(_))));
    }

    #[test]
    fn add_clip_kind_mismatch_fails() {
        let (mut tl, track_id, _) = make_test_timeline();
        let audio = Clip::new(
            ClipKind::Audio,
            TimeSpan::from_seconds(0.0, 1.0).unwrap(),
            "recitation",
            "media://recitation",
        );
        assert_unchanged(&mut tl, |tl| {
            matches!(tl.add_clip(track_id, audio), Err(CoreError::KindMismatch { .. }))
        });
    }

    #[test]
    fn add_clip_to_locked_track_fails() {
        let (mut tl, track_id, _) = make_test_timeline();
        tl.set_track_locked(track_id, true).unwrap();
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.add_clip(track_id, video_clip(6.0, 1.0)),
                Err(CoreError::TrackLocked(_))
            )
        });
    }

    #[test]
    fn add_clip_with_existing_id_fails() {
        let (mut tl, track_id, clip_id) = make_test_timeline();
        let other = tl.add_track(ClipKind::Video, "V2");
        let mut dup = video_clip(0.0, 1.0);
        dup.id = clip_id;
        assert_unchanged(&mut tl, |tl| {
            matches!(tl.add_clip(other, dup), Err(CoreError::DuplicateClip(_)))
        });
        assert_eq!(tl.track(track_id).unwrap().clips.len(), 1);
    }

    #[test]
    fn invalid_span_rejected_at_construction() {
        assert!(matches!(
            TimeSpan::from_seconds(-1.0, 2.0),
            Err(CoreError::InvalidSpan(_))
        ));
        assert!(matches!(
            TimeSpan::from_seconds(0.0, 0.0),
            Err(CoreError::InvalidSpan(_))
        ));
    }

    // -----------------------------------------------------------------------
    // remove_clip
    // -----------------------------------------------------------------------

    #[test]
    fn remove_clip_works() {
        let (mut tl, _, clip_id) = make_test_timeline();
        let removed = tl.remove_clip(clip_id).unwrap();
        assert_eq!(removed.id, clip_id);
        assert!(tl.tracks()[0].clips.is_empty());
        assert_eq!(tl.duration(), TimeUs::ZERO);
    }

    #[test]
    fn remove_clip_reclamps_playhead() {
        let (mut tl, track_id, clip_id) = make_test_timeline();
        tl.add_clip(track_id, video_clip(0.0, 2.0)).unwrap();
        tl.playhead = secs(4.0);
        tl.remove_clip(clip_id).unwrap();
        assert_eq!(tl.playhead(), secs(2.0));
    }

    #[test]
    fn remove_clip_with_bad_id_fails() {
        let (mut tl, _, _) = make_test_timeline();
        assert_unchanged(&mut tl, |tl| {
            matches!(tl.remove_clip(Uuid::new_v4()), Err(CoreError::ClipNotFound(_)))
        });
    }

    // -----------------------------------------------------------------------
    // move_clip
    // -----------------------------------------------------------------------

    #[test]
    fn move_clip_into_overlap_is_allowed() {
        let mut tl = Timeline::new();
        let track_id = tl.add_track(ClipKind::Video, "V1");
        let a = video_clip(0.0, 5.0);
        let b = video_clip(10.0, 5.0);
        let (a_id, b_id) = (a.id, b.id);
        tl.add_clip(track_id, a).unwrap();
        tl.add_clip(track_id, b).unwrap();

        tl.move_clip(b_id, secs(2.0)).unwrap();

        let a = tl.clip(a_id).unwrap();
        let b = tl.clip(b_id).unwrap();
        assert_eq!(a.span, TimeSpan::from_seconds(0.0, 5.0).unwrap());
        assert_eq!(b.span, TimeSpan::from_seconds(2.0, 5.0).unwrap());
        assert!(overlaps(&a.span, &b.span));
    }

    #[test]
    fn move_clip_keeps_start_order() {
        let (mut tl, track_id, first) = make_test_timeline();
        let other = video_clip(10.0, 1.0);
        let other_id = other.id;
        tl.add_clip(track_id, other).unwrap();

        tl.move_clip(first, secs(20.0)).unwrap();
        let ids: Vec<Uuid> = tl.track(track_id).unwrap().clips.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![other_id, first]);
        assert_eq!(tl.duration(), secs(25.0));
    }

    #[test]
    fn move_clip_negative_start_fails() {
        let (mut tl, _, clip_id) = make_test_timeline();
        assert_unchanged(&mut tl, |tl| {
            matches!(tl.move_clip(clip_id, secs(-0.5)), Err(CoreError::InvalidSpan(_)))
        });
    }

    #[test]
    fn move_clip_on_locked_track_fails() {
        let (mut tl, track_id, clip_id) = make_test_timeline();
        tl.set_track_locked(track_id, true).unwrap();
        assert_unchanged(&mut tl, |tl| {
            matches!(tl.move_clip(clip_id, secs(1.0)), Err(CoreError::TrackLocked(_)))
        });
    }

    #[test]
    fn move_clip_nonexistent_fails() {
        let (mut tl, _, _) = make_test_timeline();
        let result = tl.move_clip(Uuid::new_v4(), TimeUs::ZERO);
        assert!(matches!(result, Err(CoreError::ClipNotFound(_))));
    }

    #[test]
    fn move_clip_to_other_track() {
        let (mut tl, track_a, clip_id) = make_test_timeline();
        let track_b = tl.add_track(ClipKind::Video, "V2");

        tl.move_clip_to_track(clip_id, track_b, secs(2.0)).unwrap();
        assert!(tl.track(track_a).unwrap().clips.is_empty());
        let moved = tl.clip(clip_id).unwrap();
        assert_eq!(moved.track_id, track_b);
        assert_eq!(moved.start(), secs(2.0));
    }

    #[test]
    fn move_clip_to_track_of_other_kind_fails() {
        let (mut tl, _, clip_id) = make_test_timeline();
        let audio = tl.add_track(ClipKind::Audio, "A1");
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.move_clip_to_track(clip_id, audio, TimeUs::ZERO),
                Err(CoreError::KindMismatch { .. })
            )
        });
    }

    #[test]
    fn move_clip_to_locked_track_fails() {
        let (mut tl, _, clip_id) = make_test_timeline();
        let locked = tl.add_track(ClipKind::Video, "V2");
        tl.set_track_locked(locked, true).unwrap();
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.move_clip_to_track(clip_id, locked, TimeUs::ZERO),
                Err(CoreError::TrackLocked(id)) if id == locked
            )
        });
    }

    // -----------------------------------------------------------------------
    // resize_clip
    // -----------------------------------------------------------------------

    #[test]
    fn resize_right_keeps_start() {
        let (mut tl, _, clip_id) = make_test_timeline();
        tl.resize_clip(clip_id, Edge::Right, secs(3.0)).unwrap();
        let clip = tl.clip(clip_id).unwrap();
        assert_eq!(clip.start(), TimeUs::ZERO);
        assert_eq!(clip.end(), secs(3.0));
    }

    #[test]
    fn resize_left_keeps_end() {
        let (mut tl, _, clip_id) = make_test_timeline();
        tl.resize_clip(clip_id, Edge::Left, secs(2.0)).unwrap();
        let clip = tl.clip(clip_id).unwrap();
        assert_eq!(clip.start(), secs(3.0));
        assert_eq!(clip.end(), secs(5.0));
    }

    #[test]
    fn resize_left_past_zero_fails() {
        let (mut tl, _, clip_id) = make_test_timeline();
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.resize_clip(clip_id, Edge::Left, secs(6.0)),
                Err(CoreError::InvalidSpan(_))
            )
        });
    }

    #[test]
    fn resize_below_minimum_fails() {
        let (mut tl, _, clip_id) = make_test_timeline();
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.resize_clip(clip_id, Edge::Right, secs(0.05)),
                Err(CoreError::InvalidSpan(_))
            )
        });
        assert!(tl.resize_clip(clip_id, Edge::Right, TimeUs::ZERO).is_err());
        let just_over = MIN_CLIP_DURATION + TimeUs(1);
        assert!(tl.resize_clip(clip_id, Edge::Right, just_over).is_ok());
        assert_eq!(tl.clip(clip_id).unwrap().duration(), just_over);
    }

    #[test]
    fn resize_to_exact_minimum_fails() {
        let (mut tl, _, clip_id) = make_test_timeline();
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.resize_clip(clip_id, Edge::Right, secs(0.1)),
                Err(CoreError::InvalidSpan(_))
            )
        });
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.resize_clip(clip_id, Edge::Left, MIN_CLIP_DURATION),
                Err(CoreError::InvalidSpan(_))
            )
        });
    }

    #[test]
    fn resize_on_locked_track_fails() {
        let (mut tl, track_id, clip_id) = make_test_timeline();
        tl.set_track_locked(track_id, true).unwrap();
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.resize_clip(clip_id, Edge::Right, secs(2.0)),
                Err(CoreError::TrackLocked(_))
            )
        });
    }

    #[test]
    fn edge_parses() {
        assert_eq!("left".parse::<Edge>().unwrap(), Edge::Left);
        assert_eq!("out".parse::<Edge>().unwrap(), Edge::Right);
        assert!("middle".parse::<Edge>().is_err());
    }

    // -----------------------------------------------------------------------
    // split_clip
    // -----------------------------------------------------------------------

    #[test]
    fn split_rejects_boundary_points() {
        let mut tl = Timeline::new();
        let track_id = tl.add_track(ClipKind::Video, "V1");
        let clip = video_clip(0.0, 4.0);
        let clip_id = clip.id;
        tl.add_clip(track_id, clip).unwrap();

        assert_unchanged(&mut tl, |tl| {
            matches!(tl.split_clip(clip_id, secs(0.0)), Err(CoreError::SplitPointOutOfRange))
        });
        assert_unchanged(&mut tl, |tl| {
            matches!(tl.split_clip(clip_id, secs(4.0)), Err(CoreError::SplitPointOutOfRange))
        });

        let (left, right) = tl.split_clip(clip_id, secs(2.0)).unwrap();
        assert_eq!(tl.clip(left).unwrap().span, TimeSpan::from_seconds(0.0, 2.0).unwrap());
        assert_eq!(tl.clip(right).unwrap().span, TimeSpan::from_seconds(2.0, 2.0).unwrap());
    }

    #[test]
    fn split_retires_original_id() {
        let (mut tl, track_id, clip_id) = make_test_timeline();
        let (left, right) = tl.split_clip(clip_id, secs(2.0)).unwrap();

        assert!(tl.clip(clip_id).is_none());
        assert_ne!(left, clip_id);
        assert_ne!(right, clip_id);
        assert_ne!(left, right);

        let clips = &tl.track(track_id).unwrap().clips;
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].id, left);
        assert_eq!(clips[1].id, right);
        assert_eq!(clips[0].source_ref, clips[1].source_ref);
    }

    #[test]
    fn split_keeps_start_order_with_overlaps() {
        let (mut tl, track_id, clip_id) = make_test_timeline();
        let inner = video_clip(1.0, 1.0);
        let inner_id = inner.id;
        tl.add_clip(track_id, inner).unwrap();

        let (left, right) = tl.split_clip(clip_id, secs(3.0)).unwrap();
        let ids: Vec<Uuid> = tl.track(track_id).unwrap().clips.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![left, inner_id, right]);
    }

    #[test]
    fn split_outside_clip_fails() {
        let (mut tl, _, clip_id) = make_test_timeline();
        assert!(matches!(
            tl.split_clip(clip_id, secs(9.0)),
            Err(CoreError::SplitPointOutOfRange)
        ));
        assert!(matches!(
            tl.split_clip(Uuid::new_v4(), secs(1.0)),
            Err(CoreError::ClipNotFound(_))
        ));
    }

    // -----------------------------------------------------------------------
    // merge_clips
    // -----------------------------------------------------------------------

    #[test]
    fn split_then_merge_restores_span() {
        let (mut tl, track_id, clip_id) = make_test_timeline();
        let original = tl.clip(clip_id).unwrap().clone();

        let (left, right) = tl.split_clip(clip_id, secs(1.7)).unwrap();
        let merged = tl.merge_clips(&[right, left]).unwrap();

        let clip = tl.clip(merged).unwrap();
        assert_eq!(clip.span, original.span);
        assert_eq!(clip.kind, original.kind);
        assert_eq!(clip.track_id, track_id);
        assert_eq!(tl.track(track_id).unwrap().clips.len(), 1);
    }

    #[test]
    fn merge_with_one_distinct_id_fails() {
        let (mut tl, _, clip_id) = make_test_timeline();
        assert_unchanged(&mut tl, |tl| {
            matches!(tl.merge_clips(&[clip_id, clip_id]), Err(CoreError::InsufficientClips))
        });
    }

    #[test]
    fn merge_across_tracks_fails() {
        let (mut tl, _, clip_id) = make_test_timeline();
        let other = tl.add_track(ClipKind::Video, "V2");
        let clip = video_clip(5.0, 1.0);
        let other_clip = clip.id;
        tl.add_clip(other, clip).unwrap();
        assert_unchanged(&mut tl, |tl| {
            matches!(tl.merge_clips(&[clip_id, other_clip]), Err(CoreError::MixedTracks))
        });
    }

    #[test]
    fn merge_non_adjacent_fails() {
        let (mut tl, track_id, clip_id) = make_test_timeline();
        let later = video_clip(6.0, 1.0);
        let later_id = later.id;
        tl.add_clip(track_id, later).unwrap();
        assert_unchanged(&mut tl, |tl| {
            matches!(tl.merge_clips(&[clip_id, later_id]), Err(CoreError::NotAdjacent))
        });
    }

    #[test]
    fn merge_unknown_clip_fails() {
        let (mut tl, _, clip_id) = make_test_timeline();
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.merge_clips(&[clip_id, Uuid::new_v4()]),
                Err(CoreError::ClipNotFound(_))
            )
        });
    }

    // -----------------------------------------------------------------------
    // auto_arrange_track / gaps
    // -----------------------------------------------------------------------

    #[test]
    fn auto_arrange_track_packs_clips() {
        let mut tl = Timeline::new();
        let track_id = tl.add_track(ClipKind::Video, "V1");
        let a = video_clip(5.0, 2.0);
        let b = video_clip(1.0, 3.0);
        let (a_id, b_id) = (a.id, b.id);
        tl.add_clip(track_id, a).unwrap();
        tl.add_clip(track_id, b).unwrap();

        tl.auto_arrange_track(track_id, secs(1.0)).unwrap();
        assert_eq!(tl.clip(b_id).unwrap().span, TimeSpan::from_seconds(0.0, 3.0).unwrap());
        assert_eq!(tl.clip(a_id).unwrap().span, TimeSpan::from_seconds(4.0, 2.0).unwrap());
        assert!(tl.gaps(track_id).unwrap().len() == 1);
    }

    #[test]
    fn auto_arrange_rejects_negative_padding() {
        let (mut tl, track_id, _) = make_test_timeline();
        assert_unchanged(&mut tl, |tl| {
            matches!(
                tl.auto_arrange_track(track_id, secs(-1.0)),
                Err(CoreError::InvalidSpan(_))
            )
        });
    }

    #[test]
    fn gaps_use_timeline_duration() {
        let (mut tl, track_id, _) = make_test_timeline();
        let other = tl.add_track(ClipKind::Video, "V2");
        tl.add_clip(other, video_clip(0.0, 8.0)).unwrap();

        let gaps = tl.gaps(track_id).unwrap();
        assert_eq!(gaps, vec![Gap { start: secs(5.0), end: secs(8.0) }]);
        assert!(matches!(tl.gaps(Uuid::new_v4()), Err(CoreError::TrackNotFound(_))));
    }

    // -----------------------------------------------------------------------
    // multiple operations in sequence
    // -----------------------------------------------------------------------

    #[test]
    fn multiple_operations_in_sequence() {
        let mut tl = Timeline::new();
        let track_id = tl.add_track(ClipKind::Video, "V1");

        let clip1 = video_clip(0.0, 5.0);
        let clip1_id = clip1.id;
        tl.add_clip(track_id, clip1).unwrap();
        let clip2 = video_clip(5.0, 5.0);
        let clip2_id = clip2.id;
        tl.add_clip(track_id, clip2).unwrap();

        let (left, right) = tl.split_clip(clip1_id, secs(2.0)).unwrap();
        assert_eq!(tl.track(track_id).unwrap().clips.len(), 3);

        tl.remove_clip(right).unwrap();
        tl.move_clip(clip2_id, secs(2.0)).unwrap();
        let merged = tl.merge_clips(&[left, clip2_id]).unwrap();

        let clips = &tl.track(track_id).unwrap().clips;
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].id, merged);
        assert_eq!(clips[0].span, TimeSpan::from_seconds(0.0, 7.0).unwrap());
        tl.validate().unwrap();
    }
}
