//! Rate limiter for UI snapshots.
//!
//! Bounds redraw frequency independently of the sensor rate. This only
//! gates snapshot publication: detection and history appends still see
//! every sample.

use crate::config::UI_THROTTLE_MS;

/// Decides per sample whether a new snapshot should be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiThrottle {
    min_interval_ms: u64,
    last_published_ms: Option<u64>,
}

impl UiThrottle {
    /// Throttle at the standard 33ms interval.
    pub fn new() -> Self {
        Self::with_interval(UI_THROTTLE_MS)
    }

    pub fn with_interval(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_published_ms: None,
        }
    }

    /// Returns true and records `now_ms` if enough time has passed since the
    /// last publication. The first call after creation or [`reset`](Self::reset)
    /// always publishes.
    pub fn should_publish(&mut self, now_ms: u64) -> bool {
        let due = match self.last_published_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.min_interval_ms,
        };
        if due {
            self.last_published_ms = Some(now_ms);
        }
        due
    }

    /// Timestamp of the last published snapshot.
    pub fn last_published_ms(&self) -> Option<u64> {
        self.last_published_ms
    }

    pub fn reset(&mut self) {
        self.last_published_ms = None;
    }
}

impl Default for UiThrottle {
    fn default() -> Self {
        Self::new()
    }
}
