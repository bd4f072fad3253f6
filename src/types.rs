//! Core data types for the pedometer.
//!
//! Types here cross module boundaries: the raw sample coming in from the
//! motion source, the step event coming out of the detector, and the UI
//! snapshot handed to the rendering layer.
//!
//! Design note: We use f32 for sample values. The heuristic is coarse and
//! mobile sensors do not deliver more precision than that anyway.

use serde::{Deserialize, Serialize};

// ============================================================================
// INPUT TYPES
// ============================================================================

/// A single accelerometer reading.
///
/// This is the whole input contract: three axes and a timestamp. Samples
/// are ephemeral and are never stored after processing (only their
/// magnitude survives, in the history buffer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSample {
    /// Acceleration along x in m/s².
    pub ax: f32,
    /// Acceleration along y in m/s².
    pub ay: f32,
    /// Acceleration along z in m/s².
    pub az: f32,
    /// Device timestamp in milliseconds. Expected to be non-decreasing.
    pub timestamp_ms: u64,
}

impl SensorSample {
    pub fn new(ax: f32, ay: f32, az: f32, timestamp_ms: u64) -> Self {
        Self {
            ax,
            ay,
            az,
            timestamp_ms,
        }
    }

    /// Magnitude of the acceleration vector in m/s².
    pub fn magnitude(&self) -> f32 {
        (self.ax * self.ax + self.ay * self.ay + self.az * self.az).sqrt()
    }
}

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// A step accepted by the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent {
    /// Timestamp of the sample that crossed the threshold.
    pub timestamp_ms: u64,
    /// Raw acceleration magnitude of that sample.
    pub magnitude: f32,
    /// Distance above the smoothed magnitude that triggered the crossing.
    pub diff: f32,
    /// Step count after this step (1-based).
    pub step_index: u64,
}

/// Display state handed to the rendering layer.
///
/// Field names serialize in camelCase to match what a JS or native UI
/// expects: `{x, y, z, m, steps, elapsedSec, running, threshold, history}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Raw x acceleration of the latest sample.
    pub x: f32,
    /// Raw y acceleration of the latest sample.
    pub y: f32,
    /// Raw z acceleration of the latest sample.
    pub z: f32,
    /// Magnitude of the latest sample.
    pub m: f32,
    pub steps: u64,
    /// Whole seconds since the session clock was anchored.
    pub elapsed_sec: u64,
    pub running: bool,
    pub threshold: f32,
    /// Chart values, oldest first.
    pub history: Vec<f32>,
}

impl Snapshot {
    /// Serialize for a UI bridge.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
