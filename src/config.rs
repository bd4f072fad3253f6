//! Algorithm constants and user-facing configuration.
//!
//! Only the crossing threshold is tunable. Everything else is a fixed
//! constant of the heuristic and is deliberately not part of
//! [`PedometerConfig`].

use serde::{Deserialize, Serialize};

use crate::error::{PedometerError, Result};

/// EMA smoothing coefficient applied to the acceleration magnitude.
pub const EMA_ALPHA: f32 = 0.1;

/// Minimum time between two accepted steps, in milliseconds.
pub const MIN_STEP_INTERVAL_MS: u64 = 300;

/// Number of magnitude values kept for the chart.
pub const HISTORY_CAPACITY: usize = 200;

/// Minimum time between two published UI snapshots (~30 Hz).
pub const UI_THROTTLE_MS: u64 = 33;

/// Lowest threshold the slider allows.
pub const THRESHOLD_MIN: f32 = 0.2;

/// Highest threshold the slider allows.
pub const THRESHOLD_MAX: f32 = 4.0;

/// Slider granularity.
pub const THRESHOLD_STEP: f32 = 0.1;

/// Threshold used when nothing else is configured.
pub const DEFAULT_THRESHOLD: f32 = 1.2;

/// Clamp a requested threshold into the slider range and snap it to the
/// slider granularity.
///
/// Non-finite input falls back to [`DEFAULT_THRESHOLD`].
pub fn normalize_threshold(value: f32) -> f32 {
    if !value.is_finite() {
        return DEFAULT_THRESHOLD;
    }
    let clamped = value.clamp(THRESHOLD_MIN, THRESHOLD_MAX);
    let snapped = (clamped / THRESHOLD_STEP).round() * THRESHOLD_STEP;
    // Rounding 0.1 multiples in f32 can land a hair outside the range.
    snapped.clamp(THRESHOLD_MIN, THRESHOLD_MAX)
}

/// Configuration for a pedometer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PedometerConfig {
    /// Threshold the slider starts at. Range: [0.2, 4.0].
    pub initial_threshold: f32,
}

impl Default for PedometerConfig {
    fn default() -> Self {
        Self {
            initial_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl PedometerConfig {
    /// Parse a config from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PedometerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the slider could never produce.
    pub fn validate(&self) -> Result<()> {
        let t = self.initial_threshold;
        if !t.is_finite() {
            return Err(PedometerError::InvalidConfig {
                field: "initial_threshold",
                reason: format!("must be finite, got {t}"),
            });
        }
        if !(THRESHOLD_MIN..=THRESHOLD_MAX).contains(&t) {
            return Err(PedometerError::InvalidConfig {
                field: "initial_threshold",
                reason: format!("must be within [{THRESHOLD_MIN}, {THRESHOLD_MAX}], got {t}"),
            });
        }
        Ok(())
    }
}
