use crate::editing::Edge;
use crate::error::{CoreError, Result};
use crate::types::*;
use serde::Serialize;
use uuid::Uuid;

/// What a successful edit did, in terms of ids the UI can follow.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    ClipAdded { clip_id: Uuid, track_id: Uuid },
    ClipRemoved { clip_id: Uuid },
    ClipMoved { clip_id: Uuid, track_id: Uuid },
    ClipResized { clip_id: Uuid },
    ClipSplit { retired: Uuid, left: Uuid, right: Uuid },
    ClipsMerged { retired: Vec<Uuid>, merged: Uuid },
    TrackArranged { track_id: Uuid },
    TrackAdded { track_id: Uuid },
    TrackRemoved { track_id: Uuid },
    TrackUpdated { track_id: Uuid },
    MarkerAdded { marker_id: Uuid },
    MarkerRemoved { marker_id: Uuid },
    DurationPinned { duration: Option<TimeUs> },
}

/// A command that can be executed and described.
///
/// Undo does not need per-command logic: [`History`] snapshots the
/// arrangement around each execution.
pub trait Command: std::fmt::Debug + Send {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change>;
    fn description(&self) -> &str;
}

#[derive(Debug)]
struct Entry {
    description: String,
    before: Timeline,
    after: Timeline,
}

/// Undo/redo history stack.
///
/// Each entry brackets one command with the arrangement before and after
/// it, so a split or merge is undone as a single unit.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Entry>,
    redo_stack: Vec<Entry>,
    max_size: usize,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Execute a command and push it onto the undo stack. Clears redo stack.
    /// A failed command leaves both the timeline and the history untouched.
    pub fn execute(&mut self, cmd: Box<dyn Command>, timeline: &mut Timeline) -> Result<Change> {
        let before = timeline.clone();
        let change = cmd.execute(timeline)?;
        self.redo_stack.clear();
        self.undo_stack.push(Entry {
            description: cmd.description().to_string(),
            before,
            after: timeline.clone(),
        });
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        Ok(change)
    }

    /// Undo the last command.
    pub fn undo(&mut self, timeline: &mut Timeline) -> Result<()> {
        let entry = self.undo_stack.pop().ok_or(CoreError::NothingToUndo)?;
        timeline.restore_arrangement(&entry.before);
        self.redo_stack.push(entry);
        Ok(())
    }

    /// Redo the last undone command.
    pub fn redo(&mut self, timeline: &mut Timeline) -> Result<()> {
        let entry = self.redo_stack.pop().ok_or(CoreError::NothingToRedo)?;
        timeline.restore_arrangement(&entry.after);
        self.undo_stack.push(entry);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.description.as_str())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

// ---------------------------------------------------------------------------
// AddClipCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AddClipCommand {
    track_id: Uuid,
    clip: Clip,
}

impl AddClipCommand {
    pub fn new(track_id: Uuid, clip: Clip) -> Self {
        Self { track_id, clip }
    }
}

impl Command for AddClipCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.add_clip(self.track_id, self.clip.clone())?;
        Ok(Change::ClipAdded {
            clip_id: self.clip.id,
            track_id: self.track_id,
        })
    }

    fn description(&self) -> &str {
        "Add clip"
    }
}

// ---------------------------------------------------------------------------
// RemoveClipCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RemoveClipCommand {
    clip_id: Uuid,
}

impl RemoveClipCommand {
    pub fn new(clip_id: Uuid) -> Self {
        Self { clip_id }
    }
}

impl Command for RemoveClipCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.remove_clip(self.clip_id)?;
        Ok(Change::ClipRemoved {
            clip_id: self.clip_id,
        })
    }

    fn description(&self) -> &str {
        "Remove clip"
    }
}

// ---------------------------------------------------------------------------
// MoveClipCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MoveClipCommand {
    clip_id: Uuid,
    new_start: TimeUs,
}

impl MoveClipCommand {
    pub fn new(clip_id: Uuid, new_start: TimeUs) -> Self {
        Self { clip_id, new_start }
    }
}

impl Command for MoveClipCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.move_clip(self.clip_id, self.new_start)?;
        let track_id = find_clip(timeline, self.clip_id)?.track_id;
        Ok(Change::ClipMoved {
            clip_id: self.clip_id,
            track_id,
        })
    }

    fn description(&self) -> &str {
        "Move clip"
    }
}

// ---------------------------------------------------------------------------
// MoveClipToTrackCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MoveClipToTrackCommand {
    clip_id: Uuid,
    track_id: Uuid,
    new_start: TimeUs,
}

impl MoveClipToTrackCommand {
    pub fn new(clip_id: Uuid, track_id: Uuid, new_start: TimeUs) -> Self {
        Self {
            clip_id,
            track_id,
            new_start,
        }
    }
}

impl Command for MoveClipToTrackCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.move_clip_to_track(self.clip_id, self.track_id, self.new_start)?;
        Ok(Change::ClipMoved {
            clip_id: self.clip_id,
            track_id: self.track_id,
        })
    }

    fn description(&self) -> &str {
        "Move clip to track"
    }
}

// ---------------------------------------------------------------------------
// ResizeClipCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ResizeClipCommand {
    clip_id: Uuid,
    edge: Edge,
    new_duration: TimeUs,
}

impl ResizeClipCommand {
    pub fn new(clip_id: Uuid, edge: Edge, new_duration: TimeUs) -> Self {
        Self {
            clip_id,
            edge,
            new_duration,
        }
    }
}

impl Command for ResizeClipCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.resize_clip(self.clip_id, self.edge, self.new_duration)?;
        Ok(Change::ClipResized {
            clip_id: self.clip_id,
        })
    }

    fn description(&self) -> &str {
        match self.edge {
            Edge::Left => "Trim in-point",
            Edge::Right => "Trim out-point",
        }
    }
}

// ---------------------------------------------------------------------------
// SplitClipCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SplitClipCommand {
    clip_id: Uuid,
    at: TimeUs,
}

impl SplitClipCommand {
    pub fn new(clip_id: Uuid, at: TimeUs) -> Self {
        Self { clip_id, at }
    }
}

impl Command for SplitClipCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        let (left, right) = timeline.split_clip(self.clip_id, self.at)?;
        Ok(Change::ClipSplit {
            retired: self.clip_id,
            left,
            right,
        })
    }

    fn description(&self) -> &str {
        "Split clip"
    }
}

// ---------------------------------------------------------------------------
// MergeClipsCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MergeClipsCommand {
    clip_ids: Vec<Uuid>,
}

impl MergeClipsCommand {
    pub fn new(clip_ids: Vec<Uuid>) -> Self {
        Self { clip_ids }
    }
}

impl Command for MergeClipsCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        let merged = timeline.merge_clips(&self.clip_ids)?;
        let mut retired = self.clip_ids.clone();
        retired.sort();
        retired.dedup();
        Ok(Change::ClipsMerged { retired, merged })
    }

    fn description(&self) -> &str {
        "Merge clips"
    }
}

// ---------------------------------------------------------------------------
// AutoArrangeCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AutoArrangeCommand {
    track_id: Uuid,
    padding: TimeUs,
}

impl AutoArrangeCommand {
    pub fn new(track_id: Uuid, padding: TimeUs) -> Self {
        Self { track_id, padding }
    }
}

impl Command for AutoArrangeCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.auto_arrange_track(self.track_id, self.padding)?;
        Ok(Change::TrackArranged {
            track_id: self.track_id,
        })
    }

    fn description(&self) -> &str {
        "Auto-arrange track"
    }
}

// ---------------------------------------------------------------------------
// AddTrackCommand / RemoveTrackCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AddTrackCommand {
    kind: ClipKind,
    name: String,
}

impl AddTrackCommand {
    pub fn new(kind: ClipKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl Command for AddTrackCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        let track_id = timeline.add_track(self.kind, self.name.clone());
        Ok(Change::TrackAdded { track_id })
    }

    fn description(&self) -> &str {
        "Add track"
    }
}

#[derive(Debug)]
pub struct RemoveTrackCommand {
    track_id: Uuid,
}

impl RemoveTrackCommand {
    pub fn new(track_id: Uuid) -> Self {
        Self { track_id }
    }
}

impl Command for RemoveTrackCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.remove_track(self.track_id)?;
        Ok(Change::TrackRemoved {
            track_id: self.track_id,
        })
    }

    fn description(&self) -> &str {
        "Remove track"
    }
}

// ---------------------------------------------------------------------------
// Track flags
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SetTrackLockedCommand {
    track_id: Uuid,
    locked: bool,
}

impl SetTrackLockedCommand {
    pub fn new(track_id: Uuid, locked: bool) -> Self {
        Self { track_id, locked }
    }
}

impl Command for SetTrackLockedCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.set_track_locked(self.track_id, self.locked)?;
        Ok(Change::TrackUpdated {
            track_id: self.track_id,
        })
    }

    fn description(&self) -> &str {
        if self.locked {
            "Lock track"
        } else {
            "Unlock track"
        }
    }
}

#[derive(Debug)]
pub struct SetTrackVisibleCommand {
    track_id: Uuid,
    visible: bool,
}

impl SetTrackVisibleCommand {
    pub fn new(track_id: Uuid, visible: bool) -> Self {
        Self { track_id, visible }
    }
}

impl Command for SetTrackVisibleCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.set_track_visible(self.track_id, self.visible)?;
        Ok(Change::TrackUpdated {
            track_id: self.track_id,
        })
    }

    fn description(&self) -> &str {
        if self.visible {
            "Show track"
        } else {
            "Hide track"
        }
    }
}

// ---------------------------------------------------------------------------
// Track mix
// ---------------------------------------------------------------------------

/// Set or clear a track's volume. `None` means the mixer default.
#[derive(Debug)]
pub struct SetTrackVolumeCommand {
    track_id: Uuid,
    volume: Option<f64>,
}

impl SetTrackVolumeCommand {
    pub fn new(track_id: Uuid, volume: Option<f64>) -> Self {
        Self { track_id, volume }
    }
}

impl Command for SetTrackVolumeCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.set_track_volume(self.track_id, self.volume)?;
        Ok(Change::TrackUpdated {
            track_id: self.track_id,
        })
    }

    fn description(&self) -> &str {
        "Set track volume"
    }
}

#[derive(Debug)]
pub struct SetTrackPanCommand {
    track_id: Uuid,
    pan: Option<f64>,
}

impl SetTrackPanCommand {
    pub fn new(track_id: Uuid, pan: Option<f64>) -> Self {
        Self { track_id, pan }
    }
}

impl Command for SetTrackPanCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.set_track_pan(self.track_id, self.pan)?;
        Ok(Change::TrackUpdated {
            track_id: self.track_id,
        })
    }

    fn description(&self) -> &str {
        "Set track pan"
    }
}

// ---------------------------------------------------------------------------
// Markers and duration
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AddMarkerCommand {
    time: TimeUs,
    label: String,
}

impl AddMarkerCommand {
    pub fn new(time: TimeUs, label: impl Into<String>) -> Self {
        Self {
            time,
            label: label.into(),
        }
    }
}

impl Command for AddMarkerCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        let marker_id = timeline.add_marker(self.time, self.label.clone())?;
        Ok(Change::MarkerAdded { marker_id })
    }

    fn description(&self) -> &str {
        "Add marker"
    }
}

#[derive(Debug)]
pub struct RemoveMarkerCommand {
    marker_id: Uuid,
}

impl RemoveMarkerCommand {
    pub fn new(marker_id: Uuid) -> Self {
        Self { marker_id }
    }
}

impl Command for RemoveMarkerCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.remove_marker(self.marker_id)?;
        Ok(Change::MarkerRemoved {
            marker_id: self.marker_id,
        })
    }

    fn description(&self) -> &str {
        "Remove marker"
    }
}

#[derive(Debug)]
pub struct PinDurationCommand {
    duration: Option<TimeUs>,
}

impl PinDurationCommand {
    pub fn new(duration: Option<TimeUs>) -> Self {
        Self { duration }
    }
}

impl Command for PinDurationCommand {
    fn execute(&self, timeline: &mut Timeline) -> Result<Change> {
        timeline.set_pinned_duration(self.duration)?;
        Ok(Change::DurationPinned {
            duration: self.duration,
        })
    }

    fn description(&self) -> &str {
        "Set duration"
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn find_clip(timeline: &Timeline, clip_id: Uuid) -> Result<&Clip> {
    timeline
        .clip(clip_id)
        .ok_or(CoreError::ClipNotFound(clip_id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
