//! Session core: detector, history, clock and throttle behind one entry point.
//!
//! `PedometerCore` is plain owned data with no I/O and no UI handle. The
//! adapter in [`crate::pedometer`] owns it and forwards whatever
//! [`on_sample`](PedometerCore::on_sample) returns to the rendering layer.

use crate::history::HistoryBuffer;
use crate::step_detection::{process_sample, DetectorState};
use crate::throttle::UiThrottle;
use crate::types::{SensorSample, Snapshot};

/// Anchor for the elapsed-seconds readout.
///
/// Sample timestamps are the only time base, so the clock anchors on the
/// first sample seen after a start or reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionClock {
    start_timestamp_ms: Option<u64>,
}

impl SessionClock {
    /// Anchor on `timestamp_ms` unless already anchored.
    pub fn observe(&mut self, timestamp_ms: u64) {
        self.start_timestamp_ms.get_or_insert(timestamp_ms);
    }

    pub fn start_timestamp_ms(&self) -> Option<u64> {
        self.start_timestamp_ms
    }

    /// Whole seconds between the anchor and `now_ms`.
    pub fn elapsed_sec(&self, now_ms: u64) -> u64 {
        self.start_timestamp_ms
            .map_or(0, |start| now_ms.saturating_sub(start) / 1000)
    }

    pub fn clear(&mut self) {
        self.start_timestamp_ms = None;
    }
}

/// What one sample produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    pub step_detected: bool,
    /// Present only when the throttle let a snapshot through.
    pub snapshot: Option<Snapshot>,
}

/// All mutable state of one pedometer session.
#[derive(Debug, Clone)]
pub struct PedometerCore {
    detector: DetectorState,
    history: HistoryBuffer,
    clock: SessionClock,
    throttle: UiThrottle,
    running: bool,
    last_sample: Option<SensorSample>,
}

impl PedometerCore {
    pub fn new(threshold: f32) -> Self {
        Self {
            detector: DetectorState::new(threshold),
            history: HistoryBuffer::new(),
            clock: SessionClock::default(),
            throttle: UiThrottle::new(),
            running: false,
            last_sample: None,
        }
    }

    /// Start a fresh session: clear everything and accept samples.
    pub fn begin(&mut self) {
        self.reset();
        self.running = true;
    }

    /// Stop accepting samples. State is frozen, not cleared.
    pub fn halt(&mut self) {
        self.running = false;
    }

    /// Zero counters and clear the chart, whether running or not.
    pub fn reset(&mut self) {
        self.detector.reset();
        self.history.clear();
        self.clock.clear();
        self.throttle.reset();
        self.last_sample = None;
    }

    /// Feed one sample through detection, history and throttle.
    ///
    /// Returns `None` when the session is not running; the sample is then
    /// ignored entirely.
    pub fn on_sample(&mut self, sample: &SensorSample) -> Option<SampleOutcome> {
        if !self.running {
            return None;
        }

        self.clock.observe(sample.timestamp_ms);

        let (next, step_detected) = process_sample(self.detector, sample);
        self.detector = next;
        if step_detected {
            tracing::trace!(
                timestamp_ms = sample.timestamp_ms,
                steps = next.step_count,
                "Step detected"
            );
        }

        self.history.append(sample.magnitude());
        self.last_sample = Some(*sample);

        let snapshot = self
            .throttle
            .should_publish(sample.timestamp_ms)
            .then(|| self.snapshot());

        Some(SampleOutcome {
            step_detected,
            snapshot,
        })
    }

    /// Returns the effective threshold after clamping to the slider range.
    pub fn set_threshold(&mut self, threshold: f32) -> f32 {
        self.detector.set_threshold(threshold)
    }

    /// Current UI state, regardless of the throttle.
    pub fn snapshot(&self) -> Snapshot {
        let (x, y, z, m, elapsed_sec) = match &self.last_sample {
            Some(s) => (
                s.ax,
                s.ay,
                s.az,
                s.magnitude(),
                self.clock.elapsed_sec(s.timestamp_ms),
            ),
            None => (0.0, 0.0, 0.0, 0.0, 0),
        };

        Snapshot {
            x,
            y,
            z,
            m,
            steps: self.detector.step_count,
            elapsed_sec,
            running: self.running,
            threshold: self.detector.threshold,
            history: self.history.to_vec(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn step_count(&self) -> u64 {
        self.detector.step_count
    }

    pub fn threshold(&self) -> f32 {
        self.detector.threshold
    }

    pub fn detector(&self) -> &DetectorState {
        &self.detector
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }
}

impl Default for PedometerCore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_THRESHOLD)
    }
}
