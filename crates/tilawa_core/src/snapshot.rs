use crate::error::{CoreError, Result};
use crate::types::*;
use std::collections::HashSet;

impl Timeline {
    pub fn new() -> Self {
        Self {
            tracks: vec![],
            markers: vec![],
            pinned_duration: None,
            playhead: TimeUs::ZERO,
            zoom: default_zoom(),
        }
    }

    /// Serialize the full timeline state as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot produced by [`Timeline::to_json`]. Every invariant is
    /// re-checked, so a tampered snapshot is rejected instead of loaded.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every model invariant.
    pub fn validate(&self) -> Result<()> {
        let mut track_ids = HashSet::new();
        let mut clip_ids = HashSet::new();

        for track in &self.tracks {
            if !track_ids.insert(track.id) {
                return Err(CoreError::DuplicateTrack(track.id));
            }
            let mut prev_start = TimeUs::ZERO;
            for clip in &track.clips {
                if !clip_ids.insert(clip.id) {
                    return Err(CoreError::DuplicateClip(clip.id));
                }
                if clip.track_id != track.id {
                    return Err(CoreError::InvalidSnapshot(format!(
                        "clip {} claims track {} but lives on {}",
                        clip.id, clip.track_id, track.id
                    )));
                }
                if clip.kind != track.kind {
                    return Err(CoreError::KindMismatch {
                        expected: track.kind,
                        found: clip.kind,
                    });
                }
                if clip.start() < prev_start {
                    return Err(CoreError::InvalidSnapshot(format!(
                        "clips on track {} are not ordered by start",
                        track.id
                    )));
                }
                prev_start = clip.start();
            }
        }

        if let Some(pinned) = self.pinned_duration {
            if pinned <= TimeUs::ZERO || pinned > TimeUs::MAX {
                return Err(CoreError::InvalidSpan(
                    "pinned duration out of range".into(),
                ));
            }
        }
        if let Some(marker) = self
            .markers
            .iter()
            .find(|m| m.time < TimeUs::ZERO || m.time > TimeUs::MAX)
        {
            return Err(CoreError::InvalidSnapshot(format!(
                "marker {} at {} is out of range",
                marker.id, marker.time
            )));
        }
        if self.playhead < TimeUs::ZERO || self.playhead > self.duration() {
            return Err(CoreError::InvalidSnapshot(format!(
                "playhead {} outside [0, {}]",
                self.playhead,
                self.duration()
            )));
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(CoreError::InvalidZoom(self.zoom));
        }
        Ok(())
    }

    /// Replace the arrangement (tracks, markers, pinned duration) with the
    /// one from `snapshot`, keeping this timeline's zoom and playhead.
    pub fn restore_arrangement(&mut self, snapshot: &Timeline) {
        self.tracks = snapshot.tracks.clone();
        self.markers = snapshot.markers.clone();
        self.pinned_duration = snapshot.pinned_duration;
        self.clamp_playhead();
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
