use crate::span::contains;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Paused,
    Playing,
}

/// Play/pause/stop state machine driving the timeline's playhead.
///
/// The cursor owns no clock. The host calls [`PlaybackCursor::advance`]
/// from its own timer with the elapsed time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackCursor {
    state: PlaybackState,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Start or resume playback from the current playhead.
    pub fn play(&mut self) -> PlaybackState {
        self.state = PlaybackState::Playing;
        self.state
    }

    /// Pause keeps the playhead. Only meaningful while playing.
    pub fn pause(&mut self) -> PlaybackState {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
        self.state
    }

    /// Stop and rewind to zero.
    pub fn stop(&mut self, timeline: &mut Timeline) -> PlaybackState {
        self.state = PlaybackState::Stopped;
        timeline.playhead = TimeUs::ZERO;
        self.state
    }

    /// Jump to `t`, clamped to the timeline. The state is unchanged.
    pub fn seek(&mut self, timeline: &mut Timeline, t: TimeUs) -> TimeUs {
        timeline.playhead = t;
        timeline.clamp_playhead();
        timeline.playhead
    }

    /// Move the playhead forward by `delta` while playing.
    ///
    /// Running past the end stops playback with the playhead left at
    /// `duration`. There is no looping.
    pub fn advance(&mut self, timeline: &mut Timeline, delta: TimeUs) -> PlaybackState {
        if self.state != PlaybackState::Playing || delta < TimeUs::ZERO {
            return self.state;
        }
        let duration = timeline.duration();
        let next = timeline.playhead + delta;
        if next > duration {
            timeline.playhead = duration;
            self.state = PlaybackState::Stopped;
        } else {
            timeline.playhead = next;
        }
        self.state
    }
}

impl Timeline {
    /// Clips on visible tracks that cover `t`, in track then clip order.
    pub fn active_clips(&self, t: TimeUs) -> Vec<&Clip> {
        self.tracks
            .iter()
            .filter(|track| track.visible)
            .flat_map(|track| track.clips.iter())
            .filter(|clip| contains(&clip.span, t))
            .collect()
    }

    /// [`Timeline::active_clips`] at the playhead.
    pub fn clips_at_playhead(&self) -> Vec<&Clip> {
        self.active_clips(self.playhead)
    }
}
