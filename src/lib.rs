//! Pedometer Core Library
//!
//! Turns a raw accelerometer stream into a live step count, a rolling
//! magnitude history for charting, and throttled display snapshots.
//!
//! # Design
//!
//! - **Pure detection**: [`step_detection::process_sample`] is a state
//!   transition with no I/O, so the heuristic is testable on its own.
//! - **Every sample counts**: detection and history see every sample; only
//!   the snapshot handed to the UI is rate limited.
//! - **Thin adapter**: [`Pedometer`] owns the mutable state, talks to the
//!   [`MotionSource`] collaborator, and guards the permission race with a
//!   generation counter.
//! - **In-memory only**: nothing is persisted; state resets on restart.
//!
//! # Example
//!
//! ```ignore
//! use pedometer_core::{Pedometer, PedometerConfig, ReplaySource, SensorSample};
//!
//! let pedometer = Pedometer::new(ReplaySource::granted(), PedometerConfig::default())?;
//! pedometer.subscribe(|snapshot| println!("steps: {}", snapshot.steps));
//! pedometer.start().await?;
//! pedometer.source().emit(SensorSample::new(0.1, 0.2, 9.81, 1_000));
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod history;
pub mod pedometer;
pub mod session;
pub mod source;
pub mod step_detection;
pub mod throttle;
pub mod types;


// Re-export commonly used types
pub use config::PedometerConfig;
pub use error::{PedometerError, Result, SourceError};
pub use history::HistoryBuffer;
pub use pedometer::{Pedometer, StartOutcome};
pub use session::{PedometerCore, SampleOutcome};
pub use source::{MotionSource, ReplaySource, SampleHandler};
pub use step_detection::{process_sample, DetectorState, StepDetector};
pub use throttle::UiThrottle;
pub use types::{SensorSample, Snapshot, StepEvent};
