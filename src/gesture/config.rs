//! Tunable thresholds and smoothing factors for gesture estimation.

use serde::Deserialize;
use thiserror::Error;

/// Configuration errors. Rejected when a tracker is constructed; never
/// raised per frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("open threshold {open} must be greater than close threshold {close}")]
    InvalidThresholds { close: f32, open: f32 },
    #[error("{name} smoothing factor {value} is outside [0, 1]")]
    SmoothingOutOfRange { name: &'static str, value: f32 },
    #[error("debounce frame count must be at least 1")]
    ZeroDebounce,
    #[error("minimum pull distance {0} must be a finite, non-negative number")]
    InvalidPullDistance(f32),
}

/// Configuration for pinch and pull detection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    /// Smoothed pinch distance below which an open hand starts grabbing.
    pub close_threshold: f32,
    /// Smoothed pinch distance above which a grabbing hand releases.
    pub open_threshold: f32,
    /// Consecutive agreeing frames required to commit a grab change.
    pub debounce_frames: u32,
    /// Exponential smoothing factor for the anchor position.
    pub position_smoothing: f32,
    /// Exponential smoothing factor for the pinch distance.
    pub distance_smoothing: f32,
    /// Minimum 2D separation for a two-hand pull.
    pub min_pull_distance: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            close_threshold: 0.055,
            open_threshold: 0.16,
            debounce_frames: 2,
            position_smoothing: 0.4,
            distance_smoothing: 0.5,
            min_pull_distance: 0.15,
        }
    }
}

impl GestureConfig {
    /// Check invariants between the tunables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let close = self.close_threshold;
        let open = self.open_threshold;
        if !close.is_finite() || !open.is_finite() || close < 0.0 || open <= close {
            return Err(ConfigError::InvalidThresholds { close, open });
        }
        check_factor("position", self.position_smoothing)?;
        check_factor("distance", self.distance_smoothing)?;
        if self.debounce_frames == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        if !self.min_pull_distance.is_finite() || self.min_pull_distance < 0.0 {
            return Err(ConfigError::InvalidPullDistance(self.min_pull_distance));
        }
        Ok(())
    }

    /// Generate s-expression for status reporting.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:close-threshold {:.3} :open-threshold {:.3} :debounce-frames {} :position-smoothing {:.2} :distance-smoothing {:.2} :min-pull-distance {:.3})",
            self.close_threshold,
            self.open_threshold,
            self.debounce_frames,
            self.position_smoothing,
            self.distance_smoothing,
            self.min_pull_distance,
        )
    }
}

fn check_factor(name: &'static str, value: f32) -> Result<(), ConfigError> {
    // NaN fails the range check too.
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::SmoothingOutOfRange { name, value })
    }
}

// ── Tests ──────────────────────────────────────────────────
