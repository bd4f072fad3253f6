//! Session adapter between a [`MotionSource`] and the UI.
//!
//! Owns the [`PedometerCore`] in a single-threaded shared cell, wires the
//! sample handler into the source, and forwards published snapshots to a
//! registered listener.
//!
//! Starting is two explicit steps: await permission, then register the
//! handler. Every start and stop bumps a generation counter; a permission
//! result or a sample carrying an older generation is discarded, so a late
//! permission dialog can never revive a stopped session.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};

use crate::config::PedometerConfig;
use crate::error::{PedometerError, Result};
use crate::session::PedometerCore;
use crate::source::MotionSource;
use crate::types::{SensorSample, Snapshot};

/// Receives every published snapshot.
pub type SnapshotListener = Box<dyn FnMut(&Snapshot)>;

/// Result of a successful [`Pedometer::start`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Permission granted and the sample handler is registered.
    Started,
    /// The session was already running; nothing changed.
    AlreadyRunning,
    /// Another start is waiting on permission; nothing changed.
    AlreadyStarting,
    /// `stop()` ran while permission was pending; no handler was registered.
    Superseded,
}

struct Shared {
    core: RefCell<PedometerCore>,
    generation: Cell<u64>,
    pending_start: Cell<bool>,
    listener: RefCell<Option<SnapshotListener>>,
    subscription: Cell<u64>,
}

impl Shared {
    fn handle_sample(&self, generation: u64, sample: &SensorSample) {
        if self.generation.get() != generation {
            debug!(
                generation,
                current = self.generation.get(),
                "Dropping sample from stale session"
            );
            return;
        }

        let snapshot = self
            .core
            .borrow_mut()
            .on_sample(sample)
            .and_then(|outcome| outcome.snapshot);
        if let Some(snapshot) = snapshot {
            self.publish(&snapshot);
        }
    }

    fn publish(&self, snapshot: &Snapshot) {
        let subscription = self.subscription.get();
        // Taken out so the listener may call back into the pedometer.
        let Some(mut listener) = self.listener.borrow_mut().take() else {
            return;
        };
        listener(snapshot);

        // Not restored if the listener subscribed or unsubscribed meanwhile.
        let mut slot = self.listener.borrow_mut();
        if slot.is_none() && self.subscription.get() == subscription {
            *slot = Some(listener);
        }
    }

    fn publish_current(&self) {
        let snapshot = self.core.borrow().snapshot();
        self.publish(&snapshot);
    }

    fn bump_subscription(&self) {
        self.subscription.set(self.subscription.get() + 1);
    }

    fn bump_generation(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        next
    }
}

/// A pedometer session bound to one motion source.
pub struct Pedometer<S: MotionSource> {
    shared: Rc<Shared>,
    source: S,
}

impl<S: MotionSource> Pedometer<S> {
    pub fn new(source: S, config: PedometerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Rc::new(Shared {
                core: RefCell::new(PedometerCore::new(config.initial_threshold)),
                generation: Cell::new(0),
                pending_start: Cell::new(false),
                listener: RefCell::new(None),
                subscription: Cell::new(0),
            }),
            source,
        })
    }

    /// Request permission and begin counting.
    ///
    /// Idempotent while running or while another start is pending. On
    /// permission failure the session stays stopped and the error is
    /// returned; there is no retry.
    pub async fn start(&self) -> Result<StartOutcome> {
        if self.shared.core.borrow().is_running() {
            debug!("Start ignored: already running");
            return Ok(StartOutcome::AlreadyRunning);
        }
        if self.shared.pending_start.get() {
            debug!("Start ignored: permission request already pending");
            return Ok(StartOutcome::AlreadyStarting);
        }

        let generation = self.shared.bump_generation();
        self.shared.pending_start.set(true);

        let permission = self.source.request_permission().await;

        if self.shared.generation.get() != generation {
            debug!(generation, "Start superseded while awaiting permission");
            return Ok(StartOutcome::Superseded);
        }
        self.shared.pending_start.set(false);

        if let Err(err) = permission {
            warn!(error = %err, "Motion permission not granted");
            return Err(PedometerError::from(err));
        }

        self.shared.core.borrow_mut().begin();

        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        self.source.start(Box::new(move |sample| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_sample(generation, &sample);
            }
        }));

        info!(
            generation,
            threshold = self.shared.core.borrow().threshold(),
            "Pedometer started"
        );
        self.shared.publish_current();
        Ok(StartOutcome::Started)
    }

    /// Stop counting. Deregisters the handler and cancels a pending start.
    /// State is kept for display until the next start or reset.
    pub fn stop(&self) {
        let generation = self.shared.bump_generation();
        self.shared.pending_start.set(false);
        self.source.stop();

        let was_running = self.shared.core.borrow().is_running();
        self.shared.core.borrow_mut().halt();
        if was_running {
            info!(
                generation,
                steps = self.shared.core.borrow().step_count(),
                "Pedometer stopped"
            );
        }
        self.shared.publish_current();
    }

    /// Zero the step count and clear the chart. Valid while running or stopped.
    pub fn reset(&self) {
        self.shared.core.borrow_mut().reset();
        info!("Pedometer reset");
        self.shared.publish_current();
    }

    /// Apply a new slider value; returns the effective threshold.
    pub fn set_threshold(&self, threshold: f32) -> f32 {
        let effective = self.shared.core.borrow_mut().set_threshold(threshold);
        debug!(requested = threshold, effective, "Threshold changed");
        self.shared.publish_current();
        effective
    }

    /// Register the listener receiving snapshots, replacing any previous one.
    pub fn subscribe(&self, listener: impl FnMut(&Snapshot) + 'static) {
        self.shared.bump_subscription();
        *self.shared.listener.borrow_mut() = Some(Box::new(listener));
    }

    pub fn unsubscribe(&self) {
        self.shared.bump_subscription();
        self.shared.listener.borrow_mut().take();
    }

    /// Current UI state, bypassing the throttle.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.core.borrow().snapshot()
    }

    pub fn step_count(&self) -> u64 {
        self.shared.core.borrow().step_count()
    }

    pub fn threshold(&self) -> f32 {
        self.shared.core.borrow().threshold()
    }

    pub fn is_running(&self) -> bool {
        self.shared.core.borrow().is_running()
    }

    pub fn is_starting(&self) -> bool {
        self.shared.pending_start.get()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: MotionSource> Drop for Pedometer<S> {
    fn drop(&mut self) {
        self.source.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ReplaySource, SampleHandler};

    fn pedometer(source: ReplaySource) -> Pedometer<ReplaySource> {
        Pedometer::new(source, PedometerConfig::default()).unwrap()
    }

    fn collect_snapshots(p: &Pedometer<ReplaySource>) -> Rc<RefCell<Vec<Snapshot>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        p.subscribe(move |s: &Snapshot| sink.borrow_mut().push(s.clone()));
        seen
    }

    #[tokio::test]
    async fn test_start_registers_handler() {
        let p = pedometer(ReplaySource::granted());
        assert_eq!(p.start().await.unwrap(), StartOutcome::Started);
        assert!(p.is_running());
        assert!(p.source().is_registered());

        p.source().emit(SensorSample::new(0.0, 0.0, 9.81, 1000));
        assert_eq!(p.step_count(), 1);
    }

    #[tokio::test]
    async fn test_double_start_is_noop() {
        let p = pedometer(ReplaySource::granted());
        p.start().await.unwrap();
        assert_eq!(p.start().await.unwrap(), StartOutcome::AlreadyRunning);
        assert_eq!(p.source().start_calls(), 1);
        assert_eq!(p.source().permission_requests(), 1);
    }

    #[tokio::test]
    async fn test_permission_denied_keeps_session_stopped() {
        let p = pedometer(ReplaySource::denied("user declined"));
        let err = p.start().await.unwrap_err();

        assert!(matches!(err, PedometerError::PermissionDenied(_)));
        assert!(!p.is_running());
        assert!(!p.is_starting());
        assert!(!p.source().is_registered());
        assert_eq!(p.source().start_calls(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_source() {
        let p = pedometer(ReplaySource::unavailable("no accelerometer"));
        assert!(matches!(
            p.start().await,
            Err(PedometerError::SourceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_stop_during_pending_permission() {
        let (source, gate) = ReplaySource::gated();
        let p = pedometer(source);

        let (outcome, ()) = tokio::join!(p.start(), async {
            assert!(p.is_starting());
            p.stop();
            gate.grant();
        });

        assert_eq!(outcome.unwrap(), StartOutcome::Superseded);
        assert!(!p.is_running());
        assert!(!p.source().is_registered());
        assert_eq!(p.source().start_calls(), 0);
    }

    #[tokio::test]
    async fn test_second_start_while_pending() {
        let (source, gate) = ReplaySource::gated();
        let p = pedometer(source);

        let (first, second) = tokio::join!(p.start(), async {
            let second = p.start().await;
            gate.grant();
            second
        });

        assert_eq!(first.unwrap(), StartOutcome::Started);
        assert_eq!(second.unwrap(), StartOutcome::AlreadyStarting);
        assert_eq!(p.source().start_calls(), 1);
    }

    #[tokio::test]
    async fn test_stop_deregisters_and_freezes() {
        let p = pedometer(ReplaySource::granted());
        p.start().await.unwrap();
        p.source().emit(SensorSample::new(0.0, 0.0, 9.81, 1000));
        p.stop();

        assert!(!p.source().is_registered());
        assert!(!p.source().emit(SensorSample::new(0.0, 0.0, 30.0, 5000)));
        assert_eq!(p.step_count(), 1);
        assert!(!p.snapshot().running);
    }

    #[tokio::test]
    async fn test_restart_clears_previous_session() {
        let p = pedometer(ReplaySource::granted());
        p.start().await.unwrap();
        p.source().emit(SensorSample::new(0.0, 0.0, 9.81, 1000));
        p.stop();

        p.start().await.unwrap();
        assert_eq!(p.step_count(), 0);
        assert!(p.snapshot().history.is_empty());
    }

    #[tokio::test]
    async fn test_listener_receives_throttled_snapshots() {
        let p = pedometer(ReplaySource::granted());
        let seen = collect_snapshots(&p);
        p.start().await.unwrap();
        // One snapshot from start itself.
        assert_eq!(seen.borrow().len(), 1);

        p.source()
            .emit_all((0..20u64).map(|i| SensorSample::new(0.0, 0.0, 9.81, 2000 + i * 5)));

        assert_eq!(seen.borrow().len(), 1 + 3);
        assert_eq!(p.snapshot().history.len(), 20);
    }

    #[tokio::test]
    async fn test_listener_may_call_back_into_pedometer() {
        let p = Rc::new(pedometer(ReplaySource::granted()));
        let weak = Rc::downgrade(&p);
        p.subscribe(move |s: &Snapshot| {
            if s.steps >= 1 {
                if let Some(p) = weak.upgrade() {
                    p.stop();
                }
            }
        });

        p.start().await.unwrap();
        p.source().emit(SensorSample::new(0.0, 0.0, 9.81, 1000));

        assert!(!p.is_running());
        assert!(!p.source().is_registered());
    }

    #[tokio::test]
    async fn test_reset_while_running() {
        let p = pedometer(ReplaySource::granted());
        p.start().await.unwrap();
        p.source().emit(SensorSample::new(0.0, 0.0, 9.81, 1000));
        p.reset();

        assert!(p.is_running());
        assert_eq!(p.step_count(), 0);
        assert!(p.snapshot().history.is_empty());

        p.source().emit(SensorSample::new(0.0, 0.0, 9.81, 2000));
        assert_eq!(p.step_count(), 1, "counting continues after reset");
    }

    #[tokio::test]
    async fn test_set_threshold_clamps() {
        let p = pedometer(ReplaySource::granted());
        assert_eq!(p.set_threshold(9.0), 4.0);
        assert_eq!(p.threshold(), 4.0);
        assert_eq!(p.snapshot().threshold, 4.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PedometerConfig {
            initial_threshold: 0.0,
        };
        assert!(matches!(
            Pedometer::new(ReplaySource::granted(), config),
            Err(PedometerError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn test_listener_may_unsubscribe_itself() {
        let p = Rc::new(pedometer(ReplaySource::granted()));
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        let weak = Rc::downgrade(&p);
        p.subscribe(move |_: &Snapshot| {
            counter.set(counter.get() + 1);
            if let Some(p) = weak.upgrade() {
                p.unsubscribe();
            }
        });

        p.start().await.unwrap();
        p.reset();
        p.reset();

        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_listener_may_replace_itself() {
        let p = Rc::new(pedometer(ReplaySource::granted()));
        let replacement_calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&replacement_calls);
        let weak = Rc::downgrade(&p);
        p.subscribe(move |_: &Snapshot| {
            if let Some(p) = weak.upgrade() {
                let counter = Rc::clone(&counter);
                p.subscribe(move |_: &Snapshot| counter.set(counter.get() + 1));
            }
        });

        p.start().await.unwrap();
        p.reset();

        assert_eq!(replacement_calls.get(), 1);
    }

    /// Source whose `stop()` leaves every handler it was given callable.
    #[derive(Default)]
    struct LingeringSource {
        handlers: RefCell<Vec<SampleHandler>>,
    }

    impl LingeringSource {
        fn emit_to(&self, index: usize, sample: SensorSample) {
            let mut handlers = self.handlers.borrow_mut();
            let handler = &mut handlers[index];
            handler(sample);
        }
    }

    impl MotionSource for LingeringSource {
        async fn request_permission(&self) -> std::result::Result<(), crate::error::SourceError> {
            Ok(())
        }

        fn start(&self, handler: SampleHandler) {
            self.handlers.borrow_mut().push(handler);
        }

        fn stop(&self) {}
    }

    #[tokio::test]
    async fn test_samples_from_previous_session_are_dropped() {
        let p = Pedometer::new(LingeringSource::default(), PedometerConfig::default()).unwrap();

        p.start().await.unwrap();
        p.source().emit_to(0, SensorSample::new(0.0, 0.0, 9.81, 1000));
        assert_eq!(p.step_count(), 1);

        p.stop();
        p.start().await.unwrap();
        p.source().emit_to(1, SensorSample::new(0.0, 0.0, 9.81, 2000));
        let before = p.snapshot();
        assert_eq!(before.steps, 1);
        assert_eq!(before.history.len(), 1);

        // The first session's handler is still reachable but must not count.
        for i in 0..20u64 {
            p.source()
                .emit_to(0, SensorSample::new(0.0, 0.0, 9.81 + (i % 5) as f32 * 3.0, 5000 + i * 400));
        }

        assert_eq!(p.step_count(), 1);
        assert_eq!(p.snapshot().history, before.history);
        assert!(p.is_running());
    }
}
