use crate::error::{CoreError, Result};
use crate::types::TimeUs;
use serde::{Deserialize, Serialize};

/// A placement in time: `[start, start + duration)`.
///
/// The fields are private so a span with a negative start, a non-positive
/// duration or an end past [`TimeUs::MAX`] cannot exist, including one read
/// back from a snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "SpanData")]
pub struct TimeSpan {
    start: TimeUs,
    duration: TimeUs,
}

#[derive(Deserialize)]
struct SpanData {
    start: TimeUs,
    duration: TimeUs,
}

impl TryFrom<SpanData> for TimeSpan {
    type Error = CoreError;

    fn try_from(data: SpanData) -> Result<Self> {
        TimeSpan::new(data.start, data.duration)
    }
}

impl TimeSpan {
    pub fn new(start: TimeUs, duration: TimeUs) -> Result<Self> {
        if start < TimeUs::ZERO {
            return Err(CoreError::InvalidSpan(format!(
                "start must not be negative (got {})",
                start
            )));
        }
        if duration <= TimeUs::ZERO {
            return Err(CoreError::InvalidSpan(format!(
                "duration must be positive (got {}us)",
                duration.0
            )));
        }
        match start.0.checked_add(duration.0) {
            Some(end) if end <= TimeUs::MAX.0 => Ok(Self { start, duration }),
            _ => Err(CoreError::InvalidSpan(format!(
                "span must end by {} (start {}us, duration {}us)",
                TimeUs::MAX,
                start.0,
                duration.0
            ))),
        }
    }

    pub fn from_bounds(start: TimeUs, end: TimeUs) -> Result<Self> {
        Self::new(start, end - start)
    }

    pub fn from_seconds(start: f64, duration: f64) -> Result<Self> {
        Self::new(TimeUs::from_seconds(start), TimeUs::from_seconds(duration))
    }

    pub fn start(&self) -> TimeUs {
        self.start
    }

    pub fn duration(&self) -> TimeUs {
        self.duration
    }

    pub fn end(&self) -> TimeUs {
        self.start + self.duration
    }

    pub fn with_start(&self, start: TimeUs) -> Result<Self> {
        Self::new(start, self.duration)
    }

    pub fn with_duration(&self, duration: TimeUs) -> Result<Self> {
        Self::new(self.start, duration)
    }

    /// Same duration at a start already known to be non-negative.
    pub(crate) fn shifted_to(&self, start: TimeUs) -> Self {
        debug_assert!(start >= TimeUs::ZERO);
        Self { start, ..*self }
    }
}

/// Strict overlap: spans that only touch at an endpoint do not overlap.
pub fn overlaps(a: &TimeSpan, b: &TimeSpan) -> bool {
    a.start() < b.end() && b.start() < a.end()
}

/// Distance between two disjoint spans, in either order.
/// `None` if they overlap or touch.
pub fn gap(a: &TimeSpan, b: &TimeSpan) -> Option<TimeUs> {
    if a.end() < b.start() {
        Some(b.start() - a.end())
    } else if b.end() < a.start() {
        Some(a.start() - b.end())
    } else {
        None
    }
}

/// Half-open containment: a point at `end` is outside the span.
pub fn contains(span: &TimeSpan, t: TimeUs) -> bool {
    span.start() <= t && t < span.end()
}

pub fn intersection(a: &TimeSpan, b: &TimeSpan) -> Option<TimeSpan> {
    if !overlaps(a, b) {
        return None;
    }
    let start = a.start().max(b.start());
    let end = a.end().min(b.end());
    TimeSpan::from_bounds(start, end).ok()
}
