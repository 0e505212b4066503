use crate::types::{TimeUs, Timeline};
use serde::{Deserialize, Serialize};

/// Pixels one second occupies at zoom 1.0.
pub const DEFAULT_PIXELS_PER_SECOND: f64 = 100.0;

/// Converts between timeline time and horizontal pixel offsets.
///
/// The zoom is assumed to be positive; the timeline only ever stores such a
/// zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    pub pixels_per_second: f64,
    pub zoom: f64,
}

impl CoordinateMapper {
    pub fn new(pixels_per_second: f64, zoom: f64) -> Self {
        Self {
            pixels_per_second,
            zoom,
        }
    }

    pub fn for_timeline(pixels_per_second: f64, timeline: &Timeline) -> Self {
        Self::new(pixels_per_second, timeline.zoom())
    }

    fn scale(&self) -> f64 {
        self.pixels_per_second * self.zoom
    }

    pub fn to_pixels(&self, t: TimeUs) -> f64 {
        t.as_seconds() * self.scale()
    }

    pub fn to_time(&self, px: f64) -> TimeUs {
        TimeUs::from_seconds(px / self.scale())
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(DEFAULT_PIXELS_PER_SECOND, 1.0)
    }
}

/// Allowed zoom range. Callers clamp with this before storing a zoom.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    pub fn clamp(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }

    pub fn zoom_in(&self, zoom: f64, step: f64) -> f64 {
        self.clamp(zoom * step)
    }

    pub fn zoom_out(&self, zoom: f64, step: f64) -> f64 {
        self.clamp(zoom / step)
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min: 0.1, max: 10.0 }
    }
}
