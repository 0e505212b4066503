use crate::config::EditorConfig;
use crate::error::{CommandError, Result};
use crate::state::{AppState, EditSession};
use serde::Serialize;
use tilawa_core::coords::CoordinateMapper;
use tilawa_core::editing::Edge;
use tilawa_core::history::*;
use tilawa_core::playback::PlaybackState;
use tilawa_core::snapping::{collect_snap_points, find_snap_point, snap};
use tilawa_core::{Clip, ClipKind, CoreError, TimeSpan, TimeUs, Timeline};
use uuid::Uuid;

#[derive(Serialize)]
struct Applied<'a> {
    change: &'a Change,
    timeline: &'a Timeline,
}

#[derive(Serialize)]
struct HistoryView<'a> {
    timeline: &'a Timeline,
    can_undo: bool,
    can_redo: bool,
    undo_description: Option<&'a str>,
    redo_description: Option<&'a str>,
}

#[derive(Serialize)]
struct PlaybackView {
    state: PlaybackState,
    playhead: TimeUs,
    playhead_seconds: f64,
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|source| CommandError::BadId {
        id: id.to_string(),
        source,
    })
}

/// Convert a seconds argument, rejecting anything outside
/// `[-TimeUs::MAX, TimeUs::MAX]`.
fn seconds(value: f64, what: &str) -> Result<TimeUs> {
    let limit = TimeUs::MAX.as_seconds();
    if !value.is_finite() || value.abs() > limit {
        return Err(CommandError::BadArgument(format!(
            "{what} must be a finite number of seconds within +/-{limit}, got {value}"
        )));
    }
    Ok(TimeUs::from_seconds(value))
}

/// Run `cmd` through the session history and report what changed.
fn apply(name: &str, session: &mut EditSession, cmd: Box<dyn Command>) -> Result<serde_json::Value> {
    match session.history.execute(cmd, &mut session.timeline) {
        Ok(change) => {
            tracing::debug!(command = name, ?change, "applied");
            Ok(serde_json::to_value(Applied {
                change: &change,
                timeline: &session.timeline,
            })?)
        }
        Err(e) => {
            tracing::warn!(command = name, code = e.code(), error = %e, "rejected");
            Err(e.into())
        }
    }
}

fn run(state: &AppState, name: &str, cmd: Box<dyn Command>) -> Result<serde_json::Value> {
    let mut session = state.lock()?;
    apply(name, &mut session, cmd)
}

fn playback_view(session: &EditSession) -> Result<serde_json::Value> {
    let playhead = session.timeline.playhead();
    Ok(serde_json::to_value(PlaybackView {
        state: session.cursor.state(),
        playhead,
        playhead_seconds: playhead.as_seconds(),
    })?)
}

fn history_view(session: &EditSession) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(HistoryView {
        timeline: &session.timeline,
        can_undo: session.history.can_undo(),
        can_redo: session.history.can_redo(),
        undo_description: session.history.undo_description(),
        redo_description: session.history.redo_description(),
    })?)
}

fn default_track_name(kind: ClipKind) -> &'static str {
    match kind {
        ClipKind::Video => "Background",
        ClipKind::Audio => "Recitation",
        ClipKind::Subtitle => "Verses",
        ClipKind::Image => "Overlays",
    }
}

/// Pick a start for a dragged clip. Either edge may latch onto a nearby
/// snap point; otherwise the start goes to the grid.
fn snapped_start(timeline: &Timeline, clip: &Clip, start: TimeUs, config: &EditorConfig) -> TimeUs {
    let points = collect_snap_points(timeline, Some(clip.id));
    let threshold = config.snap_threshold();
    let end = start + clip.duration();

    let offset = points
        .iter()
        .flat_map(|&p| [p - start, p - end])
        .filter(|d| d.0.unsigned_abs() <= threshold.0.unsigned_abs())
        .min_by_key(|d| d.0.unsigned_abs());
    match offset {
        Some(d) => start + d,
        None => snap(start, config.snap_grid()),
    }
}

// ---------------------------------------------------------------------------
// Timeline and tracks
// ---------------------------------------------------------------------------

pub fn get_timeline(state: &AppState) -> Result<serde_json::Value> {
    tracing::debug!("get_timeline called");
    let session = state.lock()?;
    Ok(serde_json::to_value(&session.timeline)?)
}

/// Give an empty timeline the configured starter tracks. Not undoable.
pub fn init_default_tracks(state: &AppState) -> Result<serde_json::Value> {
    tracing::info!("init_default_tracks called");
    let mut session = state.lock()?;
    if session.timeline.tracks().is_empty() {
        for &kind in &state.config.default_tracks {
            session.timeline.add_track(kind, default_track_name(kind));
        }
        session.history.clear();
    }
    Ok(serde_json::to_value(&session.timeline)?)
}

pub fn add_track(state: &AppState, kind: &str, name: &str) -> Result<serde_json::Value> {
    tracing::info!(kind, name, "add_track called");
    let kind: ClipKind = kind.parse()?;
    run(state, "add_track", Box::new(AddTrackCommand::new(kind, name)))
}

pub fn remove_track(state: &AppState, track_id: &str) -> Result<serde_json::Value> {
    tracing::info!(track_id, "remove_track called");
    let track_id = parse_id(track_id)?;
    run(state, "remove_track", Box::new(RemoveTrackCommand::new(track_id)))
}

pub fn set_track_locked(state: &AppState, track_id: &str, locked: bool) -> Result<serde_json::Value> {
    tracing::info!(track_id, locked, "set_track_locked called");
    let track_id = parse_id(track_id)?;
    run(
        state,
        "set_track_locked",
        Box::new(SetTrackLockedCommand::new(track_id, locked)),
    )
}

pub fn set_track_visible(
    state: &AppState,
    track_id: &str,
    visible: bool,
) -> Result<serde_json::Value> {
    tracing::info!(track_id, visible, "set_track_visible called");
    let track_id = parse_id(track_id)?;
    run(
        state,
        "set_track_visible",
        Box::new(SetTrackVisibleCommand::new(track_id, visible)),
    )
}

pub fn set_track_volume(
    state: &AppState,
    track_id: &str,
    volume: Option<f64>,
) -> Result<serde_json::Value> {
    tracing::info!(track_id, ?volume, "set_track_volume called");
    let track_id = parse_id(track_id)?;
    run(
        state,
        "set_track_volume",
        Box::new(SetTrackVolumeCommand::new(track_id, volume)),
    )
}

pub fn set_track_pan(state: &AppState, track_id: &str, pan: Option<f64>) -> Result<serde_json::Value> {
    tracing::info!(track_id, ?pan, "set_track_pan called");
    let track_id = parse_id(track_id)?;
    run(
        state,
        "set_track_pan",
        Box::new(SetTrackPanCommand::new(track_id, pan)),
    )
}

pub fn add_marker(state: &AppState, time_seconds: f64, label: &str) -> Result<serde_json::Value> {
    tracing::info!(time_seconds, label, "add_marker called");
    let time = seconds(time_seconds, "marker time")?;
    run(state, "add_marker", Box::new(AddMarkerCommand::new(time, label)))
}

pub fn remove_marker(state: &AppState, marker_id: &str) -> Result<serde_json::Value> {
    tracing::info!(marker_id, "remove_marker called");
    let marker_id = parse_id(marker_id)?;
    run(state, "remove_marker", Box::new(RemoveMarkerCommand::new(marker_id)))
}

/// Pin the timeline duration, or pass `None` to follow the content.
pub fn set_duration(state: &AppState, duration_seconds: Option<f64>) -> Result<serde_json::Value> {
    tracing::info!(?duration_seconds, "set_duration called");
    let duration = duration_seconds
        .map(|s| seconds(s, "duration"))
        .transpose()?;
    run(state, "set_duration", Box::new(PinDurationCommand::new(duration)))
}

// ---------------------------------------------------------------------------
// Clips
// ---------------------------------------------------------------------------

pub fn add_clip(
    state: &AppState,
    track_id: &str,
    kind: &str,
    start_seconds: f64,
    duration_seconds: f64,
    display_name: &str,
    source_ref: &str,
) -> Result<serde_json::Value> {
    tracing::info!(track_id, kind, start_seconds, duration_seconds, "add_clip called");
    let track_uuid = parse_id(track_id)?;
    let kind: ClipKind = kind.parse()?;
    let start = seconds(start_seconds, "start")?;
    let duration = seconds(duration_seconds, "duration")?;

    // Track and kind are checked before the span so errors come out in
    // the same order as the engine's own checks.
    let mut session = state.lock()?;
    let expected = session
        .timeline
        .track(track_uuid)
        .map(|t| t.kind)
        .ok_or(CoreError::TrackNotFound(track_uuid))?;
    if kind != expected {
        let err = CoreError::KindMismatch {
            expected,
            found: kind,
        };
        tracing::warn!(command = "add_clip", code = err.code(), error = %err, "rejected");
        return Err(err.into());
    }
    let clip = Clip::new(kind, TimeSpan::new(start, duration)?, display_name, source_ref);
    apply(
        "add_clip",
        &mut session,
        Box::new(AddClipCommand::new(track_uuid, clip)),
    )
}

/// Add a clip whose kind comes from the track and whose duration comes from
/// the media catalog.
pub fn add_clip_from_source(
    state: &AppState,
    track_id: &str,
    source_ref: &str,
    display_name: &str,
    start_seconds: f64,
) -> Result<serde_json::Value> {
    tracing::info!(track_id, source_ref, start_seconds, "add_clip_from_source called");
    let track_uuid = parse_id(track_id)?;
    let start = seconds(start_seconds, "start")?;
    let duration = state
        .catalog
        .duration_of(source_ref)
        .ok_or_else(|| CommandError::UnknownSource(source_ref.to_string()))?;

    let mut session = state.lock()?;
    let kind = session
        .timeline
        .track(track_uuid)
        .map(|t| t.kind)
        .ok_or(CoreError::TrackNotFound(track_uuid))?;
    let clip = Clip::new(kind, TimeSpan::new(start, duration)?, display_name, source_ref);
    apply(
        "add_clip_from_source",
        &mut session,
        Box::new(AddClipCommand::new(track_uuid, clip)),
    )
}

pub fn delete_clip(state: &AppState, clip_id: &str) -> Result<serde_json::Value> {
    tracing::info!(clip_id, "delete_clip called");
    let clip_id = parse_id(clip_id)?;
    run(state, "delete_clip", Box::new(RemoveClipCommand::new(clip_id)))
}

/// Move a clip along its track. With `snap`, the new start latches onto a
/// nearby clip edge, marker or the playhead, falling back to the grid.
pub fn move_clip(
    state: &AppState,
    clip_id: &str,
    new_start_seconds: f64,
    snap: bool,
) -> Result<serde_json::Value> {
    tracing::info!(clip_id, new_start_seconds, snap, "move_clip called");
    let clip_id = parse_id(clip_id)?;
    let mut start = seconds(new_start_seconds, "start")?;

    let mut session = state.lock()?;
    if snap {
        let clip = session
            .timeline
            .clip(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        start = snapped_start(&session.timeline, clip, start, &state.config);
    }
    apply(
        "move_clip",
        &mut session,
        Box::new(MoveClipCommand::new(clip_id, start)),
    )
}

pub fn move_clip_to_track(
    state: &AppState,
    clip_id: &str,
    track_id: &str,
    new_start_seconds: f64,
) -> Result<serde_json::Value> {
    tracing::info!(clip_id, track_id, new_start_seconds, "move_clip_to_track called");
    let clip_id = parse_id(clip_id)?;
    let track_id = parse_id(track_id)?;
    let start = seconds(new_start_seconds, "start")?;
    run(
        state,
        "move_clip_to_track",
        Box::new(MoveClipToTrackCommand::new(clip_id, track_id, start)),
    )
}

pub fn resize_clip(
    state: &AppState,
    clip_id: &str,
    edge: &str,
    new_duration_seconds: f64,
) -> Result<serde_json::Value> {
    tracing::info!(clip_id, edge, new_duration_seconds, "resize_clip called");
    let clip_id = parse_id(clip_id)?;
    let edge: Edge = edge.parse()?;
    let duration = seconds(new_duration_seconds, "duration")?;
    run(
        state,
        "resize_clip",
        Box::new(ResizeClipCommand::new(clip_id, edge, duration)),
    )
}

pub fn split_clip(state: &AppState, clip_id: &str, at_seconds: f64) -> Result<serde_json::Value> {
    tracing::info!(clip_id, at_seconds, "split_clip called");
    let clip_id = parse_id(clip_id)?;
    let at = seconds(at_seconds, "split point")?;
    run(state, "split_clip", Box::new(SplitClipCommand::new(clip_id, at)))
}

pub fn split_at_playhead(state: &AppState, clip_id: &str) -> Result<serde_json::Value> {
    tracing::info!(clip_id, "split_at_playhead called");
    let clip_id = parse_id(clip_id)?;
    let mut session = state.lock()?;
    let at = session.timeline.playhead();
    apply(
        "split_at_playhead",
        &mut session,
        Box::new(SplitClipCommand::new(clip_id, at)),
    )
}

pub fn merge_clips(state: &AppState, clip_ids: &[String]) -> Result<serde_json::Value> {
    tracing::info!(count = clip_ids.len(), "merge_clips called");
    let ids = clip_ids
        .iter()
        .map(|id| parse_id(id))
        .collect::<Result<Vec<_>>>()?;
    run(state, "merge_clips", Box::new(MergeClipsCommand::new(ids)))
}

pub fn auto_arrange(
    state: &AppState,
    track_id: &str,
    padding_seconds: f64,
) -> Result<serde_json::Value> {
    tracing::info!(track_id, padding_seconds, "auto_arrange called");
    let track_id = parse_id(track_id)?;
    let padding = seconds(padding_seconds, "padding")?;
    run(
        state,
        "auto_arrange",
        Box::new(AutoArrangeCommand::new(track_id, padding)),
    )
}

pub fn find_gaps(state: &AppState, track_id: &str) -> Result<serde_json::Value> {
    tracing::info!(track_id, "find_gaps called");
    let track_id = parse_id(track_id)?;
    let session = state.lock()?;
    let gaps = session.timeline.gaps(track_id)?;
    Ok(serde_json::to_value(gaps)?)
}

// ---------------------------------------------------------------------------
// Snapping and zoom
// ---------------------------------------------------------------------------

/// Snap a time in seconds. Magnetic snapping wins when a snap point is
/// within the threshold; otherwise the grid applies.
pub fn snap_time(state: &AppState, time_seconds: f64, magnetic: bool) -> Result<f64> {
    tracing::info!(time_seconds, magnetic, "snap_time called");
    let t = seconds(time_seconds, "time")?;
    let grid = state.config.snap_grid();
    if !magnetic {
        return Ok(snap(t, grid).as_seconds());
    }

    let session = state.lock()?;
    let points = collect_snap_points(&session.timeline, None);
    let threshold = state.config.snap_threshold();
    let snapped = if points
        .iter()
        .any(|p| p.0.abs_diff(t.0) <= threshold.0.unsigned_abs())
    {
        find_snap_point(t, &points, threshold)
    } else {
        snap(t, grid)
    };
    Ok(snapped.as_seconds())
}

/// Clamp `zoom` to the configured range and store it.
fn store_zoom(session: &mut EditSession, config: &EditorConfig, zoom: f64) -> Result<f64> {
    let zoom = config.zoom.clamp(zoom);
    session.timeline.set_zoom(zoom)?;
    tracing::debug!(zoom, "zoom set");
    Ok(zoom)
}

/// Store `zoom` clamped to the configured range. Returns the stored value.
pub fn set_zoom(state: &AppState, zoom: f64) -> Result<f64> {
    tracing::info!(zoom, "set_zoom called");
    let mut session = state.lock()?;
    store_zoom(&mut session, &state.config, zoom)
}

/// Step the zoom in by `zoom_step`. The read and the store share one lock.
pub fn zoom_in(state: &AppState) -> Result<f64> {
    tracing::info!("zoom_in called");
    let mut session = state.lock()?;
    let next = state
        .config
        .zoom
        .zoom_in(session.timeline.zoom(), state.config.zoom_step);
    store_zoom(&mut session, &state.config, next)
}

/// Step the zoom out by `zoom_step`.
pub fn zoom_out(state: &AppState) -> Result<f64> {
    tracing::info!("zoom_out called");
    let mut session = state.lock()?;
    let next = state
        .config
        .zoom
        .zoom_out(session.timeline.zoom(), state.config.zoom_step);
    store_zoom(&mut session, &state.config, next)
}

fn mapper(state: &AppState) -> Result<CoordinateMapper> {
    let session = state.lock()?;
    Ok(CoordinateMapper::for_timeline(
        state.config.pixels_per_second,
        &session.timeline,
    ))
}

pub fn time_to_pixels(state: &AppState, time_seconds: f64) -> Result<f64> {
    tracing::debug!(time_seconds, "time_to_pixels called");
    let t = seconds(time_seconds, "time")?;
    Ok(mapper(state)?.to_pixels(t))
}

pub fn pixels_to_time(state: &AppState, px: f64) -> Result<f64> {
    tracing::debug!(px, "pixels_to_time called");
    if !px.is_finite() {
        return Err(CommandError::BadArgument(format!(
            "pixel offset must be finite, got {px}"
        )));
    }
    Ok(mapper(state)?.to_time(px).as_seconds())
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

pub fn play(state: &AppState) -> Result<serde_json::Value> {
    let mut session = state.lock()?;
    let new_state = session.cursor.play();
    tracing::info!(?new_state, "play");
    playback_view(&session)
}

pub fn pause(state: &AppState) -> Result<serde_json::Value> {
    let mut session = state.lock()?;
    let new_state = session.cursor.pause();
    tracing::info!(?new_state, "pause");
    playback_view(&session)
}

pub fn stop(state: &AppState) -> Result<serde_json::Value> {
    let mut session = state.lock()?;
    let session = &mut *session;
    session.cursor.stop(&mut session.timeline);
    tracing::info!("stop");
    playback_view(session)
}

pub fn seek(state: &AppState, time_seconds: f64) -> Result<serde_json::Value> {
    let t = seconds(time_seconds, "time")?;
    let mut session = state.lock()?;
    let session = &mut *session;
    let playhead = session.cursor.seek(&mut session.timeline, t);
    tracing::info!(playhead = %playhead, "seek");
    playback_view(session)
}

/// Advance the playhead by the host timer's elapsed time.
pub fn tick(state: &AppState, delta_seconds: f64) -> Result<serde_json::Value> {
    let delta = seconds(delta_seconds, "delta")?;
    let mut session = state.lock()?;
    let session = &mut *session;
    let before = session.cursor.state();
    let after = session.cursor.advance(&mut session.timeline, delta);
    tracing::debug!(playhead = %session.timeline.playhead(), ?after, "tick");
    if before == PlaybackState::Playing && after == PlaybackState::Stopped {
        tracing::info!("playback reached the end of the timeline");
    }
    playback_view(session)
}

/// Clips on visible tracks at `at_seconds`, or at the playhead when `None`.
pub fn active_clips(state: &AppState, at_seconds: Option<f64>) -> Result<serde_json::Value> {
    tracing::debug!(?at_seconds, "active_clips called");
    let at = at_seconds.map(|s| seconds(s, "time")).transpose()?;
    let session = state.lock()?;
    let clips = match at {
        Some(t) => session.timeline.active_clips(t),
        None => session.timeline.clips_at_playhead(),
    };
    Ok(serde_json::to_value(clips)?)
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

pub fn undo(state: &AppState) -> Result<serde_json::Value> {
    let mut session = state.lock()?;
    let session = &mut *session;
    let description = session.history.undo_description().map(str::to_owned);
    session.history.undo(&mut session.timeline).map_err(|e| {
        tracing::warn!(code = e.code(), "undo rejected");
        CommandError::from(e)
    })?;
    tracing::info!(?description, "undo");
    history_view(session)
}

pub fn redo(state: &AppState) -> Result<serde_json::Value> {
    let mut session = state.lock()?;
    let session = &mut *session;
    let description = session.history.redo_description().map(str::to_owned);
    session.history.redo(&mut session.timeline).map_err(|e| {
        tracing::warn!(code = e.code(), "redo rejected");
        CommandError::from(e)
    })?;
    tracing::info!(?description, "redo");
    history_view(session)
}
