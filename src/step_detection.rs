//! Step Detection Module.
//!
//! Counts steps with a threshold-crossing heuristic on the acceleration
//! magnitude:
//! - Exponential smoothing of the magnitude (α = 0.1)
//! - Differencing the raw magnitude against the smoothed one
//! - Rising-edge detection of that difference against a user threshold
//! - A fixed debounce interval between accepted steps
//!
//! The magnitude is orientation independent, so no gravity separation is
//! needed. There is no warm-up: the first sample after a reset compares
//! against an EMA of zero and may register a step on its own.
//!
//! Non-finite input (NaN, ∞) is not filtered and propagates into the
//! smoothing state until the next reset.

use crate::config::{normalize_threshold, EMA_ALPHA, MIN_STEP_INTERVAL_MS};
use crate::types::{SensorSample, StepEvent};

/// Mutable detector state for one session.
///
/// The threshold lives here rather than in a shared setting so that
/// concurrent detectors (tests, multiple sessions) never interfere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorState {
    /// Exponential moving average of the acceleration magnitude.
    pub magnitude_ema: f32,
    /// `magnitude - ema` of the previous sample.
    pub prev_diff: f32,
    /// Timestamp of the last accepted step, 0 if none yet.
    pub last_step_timestamp_ms: u64,
    pub step_count: u64,
    /// Crossing threshold, read on every sample.
    pub threshold: f32,
}

impl DetectorState {
    /// Fresh state with the given threshold (normalized to the slider range).
    pub fn new(threshold: f32) -> Self {
        Self {
            magnitude_ema: 0.0,
            prev_diff: 0.0,
            last_step_timestamp_ms: 0,
            step_count: 0,
            threshold: normalize_threshold(threshold),
        }
    }

    /// Zero all counters and smoothing state. The threshold is kept.
    pub fn reset(&mut self) {
        self.magnitude_ema = 0.0;
        self.prev_diff = 0.0;
        self.last_step_timestamp_ms = 0;
        self.step_count = 0;
    }

    /// Returns the effective threshold after normalization.
    pub fn set_threshold(&mut self, threshold: f32) -> f32 {
        self.threshold = normalize_threshold(threshold);
        self.threshold
    }

    /// Whether this state is indistinguishable from a freshly created one.
    pub fn is_pristine(&self) -> bool {
        self.magnitude_ema == 0.0
            && self.prev_diff == 0.0
            && self.last_step_timestamp_ms == 0
            && self.step_count == 0
    }
}

impl Default for DetectorState {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_THRESHOLD)
    }
}

/// Advance the detector by one sample.
///
/// Returns the next state and whether this sample produced a step. The
/// input state is never mutated, which keeps the heuristic testable without
/// any session or UI around it.
pub fn process_sample(state: DetectorState, sample: &SensorSample) -> (DetectorState, bool) {
    let m = sample.magnitude();
    let ema = (1.0 - EMA_ALPHA) * state.magnitude_ema + EMA_ALPHA * m;
    let diff = m - ema;

    let rising_edge = state.prev_diff <= state.threshold && diff > state.threshold;
    // Saturating: a timestamp going backwards never passes the debounce.
    let debounced =
        sample.timestamp_ms.saturating_sub(state.last_step_timestamp_ms) > MIN_STEP_INTERVAL_MS;
    let step_detected = rising_edge && debounced;

    let mut next = DetectorState {
        magnitude_ema: ema,
        prev_diff: diff,
        ..state
    };
    if step_detected {
        next.step_count += 1;
        next.last_step_timestamp_ms = sample.timestamp_ms;
    }

    (next, step_detected)
}

/// Stateful wrapper around [`process_sample`] for callers that just want
/// step events out of a sample stream.
#[derive(Debug, Clone, Default)]
pub struct StepDetector {
    state: DetectorState,
}

impl StepDetector {
    /// Create a new step detector with the given threshold.
    pub fn new(threshold: f32) -> Self {
        Self {
            state: DetectorState::new(threshold),
        }
    }

    /// Process a single sample.
    /// Returns a StepEvent if a step was detected, None otherwise.
    pub fn process_sample(&mut self, sample: &SensorSample) -> Option<StepEvent> {
        let (next, step_detected) = process_sample(self.state, sample);
        self.state = next;

        if !step_detected {
            return None;
        }

        tracing::trace!(
            timestamp_ms = sample.timestamp_ms,
            steps = next.step_count,
            diff = next.prev_diff,
            "Step detected"
        );
        Some(StepEvent {
            timestamp_ms: sample.timestamp_ms,
            magnitude: sample.magnitude(),
            diff: next.prev_diff,
            step_index: next.step_count,
        })
    }

    /// Process a batch of samples and return all detected steps.
    pub fn process_batch(&mut self, samples: &[SensorSample]) -> Vec<StepEvent> {
        samples
            .iter()
            .filter_map(|sample| self.process_sample(sample))
            .collect()
    }

    /// Get the total number of steps detected.
    pub fn total_steps(&self) -> u64 {
        self.state.step_count
    }

    pub fn threshold(&self) -> f32 {
        self.state.threshold
    }

    /// Change the threshold; applies from the next sample on.
    pub fn set_threshold(&mut self, threshold: f32) -> f32 {
        self.state.set_threshold(threshold)
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// Reset counters and smoothing state (threshold is kept).
    pub fn reset(&mut self) {
        self.state.reset();
    }
}

// ============================================================================
// TESTS
// ============================================================================
