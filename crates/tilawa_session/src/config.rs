use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tilawa_core::coords::{ZoomLimits, DEFAULT_PIXELS_PER_SECOND};
use tilawa_core::{ClipKind, TimeUs};

/// Upper bound for the snap grid and snap threshold, in seconds.
pub const MAX_SNAP_SECONDS: f64 = 3600.0;

/// Editor-wide settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub pixels_per_second: f64,
    pub zoom: ZoomLimits,
    /// Multiplier applied by one zoom-in / zoom-out step.
    pub zoom_step: f64,
    pub snap_grid_seconds: f64,
    pub snap_threshold_seconds: f64,
    pub history_size: usize,
    /// Tracks created for a fresh project, in display order.
    pub default_tracks: Vec<ClipKind>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
            zoom: ZoomLimits::default(),
            zoom_step: 1.25,
            snap_grid_seconds: 0.5,
            snap_threshold_seconds: 0.2,
            history_size: 100,
            default_tracks: vec![ClipKind::Video, ClipKind::Audio, ClipKind::Subtitle],
        }
    }
}

impl EditorConfig {
    /// Read a JSON config file and validate it.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading editor config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing editor config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.pixels_per_second.is_finite() && self.pixels_per_second > 0.0,
            "pixels_per_second must be positive, got {}",
            self.pixels_per_second
        );
        ensure!(
            self.zoom.min > 0.0 && self.zoom.min <= self.zoom.max && self.zoom.max.is_finite(),
            "zoom limits must satisfy 0 < min <= max, got {:?}",
            self.zoom
        );
        ensure!(
            self.zoom_step.is_finite() && self.zoom_step > 1.0,
            "zoom_step must be greater than 1, got {}",
            self.zoom_step
        );
        ensure!(
            (0.0..=MAX_SNAP_SECONDS).contains(&self.snap_grid_seconds)
                && (0.0..=MAX_SNAP_SECONDS).contains(&self.snap_threshold_seconds),
            "snap settings must be within [0, {MAX_SNAP_SECONDS}] seconds, got grid {} and threshold {}",
            self.snap_grid_seconds,
            self.snap_threshold_seconds
        );
        ensure!(self.history_size > 0, "history_size must be at least 1");
        Ok(())
    }

    pub fn snap_grid(&self) -> TimeUs {
        TimeUs::from_seconds(self.snap_grid_seconds)
    }

    pub fn snap_threshold(&self) -> TimeUs {
        TimeUs::from_seconds(self.snap_threshold_seconds)
    }
}
