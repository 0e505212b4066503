use crate::types::*;

/// Round `time` to the nearest multiple of `grid`, halves away from zero.
/// A non-positive grid leaves `time` untouched.
pub fn snap(time: TimeUs, grid: TimeUs) -> TimeUs {
    if grid <= TimeUs::ZERO {
        return time;
    }
    let g = grid.0;
    let quotient = time.0.div_euclid(g);
    let remainder = time.0.rem_euclid(g);
    // remainder is in [0, g), so `g - remainder` cannot overflow
    let upper_half = g - remainder;
    let round_up = if time.0 >= 0 {
        remainder >= upper_half
    } else {
        remainder > upper_half
    };
    let rounded = if round_up {
        quotient.saturating_add(1)
    } else {
        quotient
    };
    TimeUs(rounded.saturating_mul(g))
}

/// Find the nearest snap point within the threshold.
/// Returns the snapped position if within threshold, otherwise the original position.
/// A negative threshold never snaps.
pub fn find_snap_point(position: TimeUs, snap_points: &[TimeUs], threshold: TimeUs) -> TimeUs {
    if threshold < TimeUs::ZERO {
        return position;
    }
    let limit = threshold.0.unsigned_abs();
    let mut best: Option<(TimeUs, u64)> = None;

    for &point in snap_points {
        let dist = position.0.abs_diff(point.0);
        if dist <= limit && best.map_or(true, |(_, d)| dist < d) {
            best = Some((point, dist));
        }
    }

    best.map_or(position, |(point, _)| point)
}

/// Collect all magnetic snap targets: zero, the playhead, clip edges and markers.
pub fn collect_snap_points(timeline: &Timeline, exclude_clip_id: Option<uuid::Uuid>) -> Vec<TimeUs> {
    let mut points = vec![TimeUs::ZERO, timeline.playhead()];

    for clip in timeline.clips() {
        if Some(clip.id) == exclude_clip_id {
            continue;
        }
        points.push(clip.start());
        points.push(clip.end());
    }

    points.extend(timeline.markers().iter().map(|m| m.time));

    points.sort();
    points.dedup();
    points
}
