use crate::error::CoreError;
use crate::span::TimeSpan;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TimeUs
// ---------------------------------------------------------------------------

/// Timeline time in whole microseconds.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct TimeUs(pub i64);

impl TimeUs {
    pub const ZERO: Self = Self(0);

    /// Latest time a span may reach: 10 000 hours. Keeps sums of any two
    /// timeline times far from `i64` overflow.
    pub const MAX: Self = Self(36_000_000_000_000);

    /// Rounds to the nearest microsecond.
    pub fn from_seconds(s: f64) -> Self {
        Self((s * 1_000_000.0).round() as i64)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl Add for TimeUs {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for TimeUs {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<i64> for TimeUs {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Div<i64> for TimeUs {
    type Output = Self;
    fn div(self, rhs: i64) -> Self {
        Self(self.0 / rhs)
    }
}

impl fmt::Display for TimeUs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_us = self.0.unsigned_abs();
        let total_ms = total_us / 1_000;
        let ms = total_ms % 1_000;
        let total_secs = total_ms / 1_000;
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        let mins = total_mins % 60;
        let hours = total_mins / 60;
        if self.0 < 0 {
            write!(f, "-{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        } else {
            write!(f, "{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        }
    }
}

// ---------------------------------------------------------------------------
// ClipKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    Video,
    Audio,
    Subtitle,
    Image,
}

impl ClipKind {
    pub fn default_height(&self) -> u32 {
        match self {
            ClipKind::Video => 64,
            ClipKind::Audio => 48,
            ClipKind::Subtitle => 40,
            ClipKind::Image => 48,
        }
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            ClipKind::Video => "#3b82f6",
            ClipKind::Audio => "#10b981",
            ClipKind::Subtitle => "#f59e0b",
            ClipKind::Image => "#a855f7",
        }
    }
}

impl std::str::FromStr for ClipKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(ClipKind::Video),
            "audio" => Ok(ClipKind::Audio),
            "subtitle" => Ok(ClipKind::Subtitle),
            "image" => Ok(ClipKind::Image),
            other => Err(CoreError::InvalidOperation(format!(
                "unknown clip kind: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Clip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    pub id: Uuid,
    pub track_id: Uuid,
    pub kind: ClipKind,
    pub span: TimeSpan,
    pub display_name: String,
    /// Opaque handle understood by the media collaborator.
    pub source_ref: String,
    pub thumbnail_ref: Option<String>,
}

impl Clip {
    /// A fresh clip, not yet owned by any track.
    pub fn new(
        kind: ClipKind,
        span: TimeSpan,
        display_name: impl Into<String>,
        source_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            track_id: Uuid::nil(),
            kind,
            span,
            display_name: display_name.into(),
            source_ref: source_ref.into(),
            thumbnail_ref: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail_ref: impl Into<String>) -> Self {
        self.thumbnail_ref = Some(thumbnail_ref.into());
        self
    }

    pub fn start(&self) -> TimeUs {
        self.span.start()
    }

    pub fn duration(&self) -> TimeUs {
        self.span.duration()
    }

    pub fn end(&self) -> TimeUs {
        self.span.end()
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: Uuid,
    pub kind: ClipKind,
    pub name: String,
    /// Ordered by start time; clips with equal starts keep insertion order.
    pub clips: Vec<Clip>,
    pub height: u32,
    pub color: String,
    pub visible: bool,
    pub locked: bool,
    pub volume: Option<f64>,
    pub pan: Option<f64>,
}

impl Track {
    pub fn new(kind: ClipKind, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
            clips: vec![],
            height: kind.default_height(),
            color: kind.default_color().to_string(),
            visible: true,
            locked: false,
            volume: None,
            pan: None,
        }
    }

    pub fn clip(&self, clip_id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    /// Index where a clip starting at `start` goes, after any equal starts.
    pub(crate) fn insertion_index(&self, start: TimeUs) -> usize {
        self.clips.partition_point(|c| c.start() <= start)
    }

    pub(crate) fn insert_sorted(&mut self, clip: Clip) {
        let idx = self.insertion_index(clip.start());
        self.clips.insert(idx, clip);
    }

    pub fn content_end(&self) -> TimeUs {
        self.clips
            .iter()
            .map(|c| c.end())
            .max()
            .unwrap_or(TimeUs::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Marker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Marker {
    pub id: Uuid,
    pub time: TimeUs,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// The whole arrangement of one open project.
///
/// Fields are only reachable through accessors; every change goes through
/// the editing operations so the invariants hold after each call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "TimelineData")]
pub struct Timeline {
    pub(crate) tracks: Vec<Track>,
    pub(crate) markers: Vec<Marker>,
    pub(crate) pinned_duration: Option<TimeUs>,
    pub(crate) playhead: TimeUs,
    pub(crate) zoom: f64,
}

#[derive(Deserialize)]
pub(crate) struct TimelineData {
    tracks: Vec<Track>,
    #[serde(default)]
    markers: Vec<Marker>,
    #[serde(default)]
    pinned_duration: Option<TimeUs>,
    #[serde(default)]
    playhead: TimeUs,
    #[serde(default = "default_zoom")]
    zoom: f64,
}

pub(crate) fn default_zoom() -> f64 {
    1.0
}

impl TryFrom<TimelineData> for Timeline {
    type Error = CoreError;

    fn try_from(data: TimelineData) -> Result<Self, Self::Error> {
        let timeline = Timeline {
            tracks: data.tracks,
            markers: data.markers,
            pinned_duration: data.pinned_duration,
            playhead: data.playhead,
            zoom: data.zoom,
        };
        timeline.validate()?;
        Ok(timeline)
    }
}

impl Timeline {
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, track_id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.iter().flat_map(|t| t.clips.iter())
    }

    pub fn clip(&self, clip_id: Uuid) -> Option<&Clip> {
        self.clips().find(|c| c.id == clip_id)
    }

    pub fn playhead(&self) -> TimeUs {
        self.playhead
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pinned_duration(&self) -> Option<TimeUs> {
        self.pinned_duration
    }

    /// End of the last clip on any track, or zero when empty.
    pub fn content_end(&self) -> TimeUs {
        self.tracks
            .iter()
            .map(Track::content_end)
            .max()
            .unwrap_or(TimeUs::ZERO)
    }

    pub fn duration(&self) -> TimeUs {
        self.pinned_duration.unwrap_or_else(|| self.content_end())
    }

    pub(crate) fn clamp_playhead(&mut self) {
        self.playhead = self.playhead.clamp(TimeUs::ZERO, self.duration());
    }

    /// (track_index, clip_index) of a clip.
    pub(crate) fn find_clip_location(&self, clip_id: Uuid) -> Option<(usize, usize)> {
        for (ti, track) in self.tracks.iter().enumerate() {
            if let Some(ci) = track.clips.iter().position(|c| c.id == clip_id) {
                return Some((ti, ci));
            }
        }
        None
    }

    pub(crate) fn find_track_index(&self, track_id: Uuid) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == track_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
