//! Motion sample source boundary.
//!
//! The native sensor bridge lives outside this crate. It is modeled as a
//! [`MotionSource`]: an async permission request plus a callback-driven
//! start/stop pair. [`ReplaySource`] is an in-process implementation that
//! replays recorded samples, used by the demo and the tests.

use std::cell::{Cell, RefCell};
use std::future::Future;

use tokio::sync::oneshot;

use crate::error::SourceError;
use crate::types::SensorSample;

/// Callback the source invokes once per reading, in delivery order.
pub type SampleHandler = Box<dyn FnMut(SensorSample)>;

/// A device accelerometer as seen by the pedometer.
///
/// Methods take `&self` so that `stop()` can be called while a permission
/// request is still in flight.
pub trait MotionSource {
    /// Ask the platform for motion access. May suspend on a system dialog.
    fn request_permission(&self) -> impl Future<Output = Result<(), SourceError>>;

    /// Begin delivering samples to `handler`, replacing any previous one.
    fn start(&self, handler: SampleHandler);

    /// Stop delivering samples and drop the registered handler.
    fn stop(&self);
}

// ============================================================================
// REPLAY SOURCE
// ============================================================================

enum PermissionMode {
    Granted,
    Denied(String),
    Unavailable(String),
    /// Held until the paired [`PermissionGate`] resolves it.
    Gated(oneshot::Receiver<Result<(), SourceError>>),
}

/// Resolves a pending permission request on a gated [`ReplaySource`].
pub struct PermissionGate {
    tx: oneshot::Sender<Result<(), SourceError>>,
}

impl PermissionGate {
    pub fn grant(self) {
        // The request may already have been dropped; nothing to resolve then.
        let _ = self.tx.send(Ok(()));
    }

    pub fn deny(self, reason: impl Into<String>) {
        let _ = self.tx.send(Err(SourceError::PermissionDenied {
            reason: reason.into(),
        }));
    }
}

/// Motion source that replays samples pushed into it.
pub struct ReplaySource {
    permission: RefCell<Option<PermissionMode>>,
    handler: RefCell<Option<SampleHandler>>,
    registration: Cell<u64>,
    permission_requests: Cell<u32>,
    start_calls: Cell<u32>,
}

impl ReplaySource {
    fn with_mode(mode: PermissionMode) -> Self {
        Self {
            permission: RefCell::new(Some(mode)),
            handler: RefCell::new(None),
            registration: Cell::new(0),
            permission_requests: Cell::new(0),
            start_calls: Cell::new(0),
        }
    }

    /// Source that grants permission immediately, every time.
    pub fn granted() -> Self {
        Self::with_mode(PermissionMode::Granted)
    }

    /// Source whose permission request is always rejected.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::with_mode(PermissionMode::Denied(reason.into()))
    }

    /// Source without an accelerometer.
    pub fn unavailable(details: impl Into<String>) -> Self {
        Self::with_mode(PermissionMode::Unavailable(details.into()))
    }

    /// Source whose next permission request stays pending until the
    /// returned gate is resolved. Later requests are granted.
    pub fn gated() -> (Self, PermissionGate) {
        let (tx, rx) = oneshot::channel();
        (Self::with_mode(PermissionMode::Gated(rx)), PermissionGate { tx })
    }

    /// Deliver one sample to the registered handler.
    ///
    /// Returns false if no handler is registered.
    pub fn emit(&self, sample: SensorSample) -> bool {
        let registration = self.registration.get();
        // Taken out so the handler may call back into start/stop.
        let Some(mut handler) = self.handler.borrow_mut().take() else {
            return false;
        };
        handler(sample);

        let mut slot = self.handler.borrow_mut();
        if slot.is_none() && self.registration.get() == registration {
            *slot = Some(handler);
        }
        true
    }

    /// Deliver a recording in order. Returns how many samples were delivered.
    pub fn emit_all(&self, samples: impl IntoIterator<Item = SensorSample>) -> usize {
        samples
            .into_iter()
            .take_while(|sample| self.emit(*sample))
            .count()
    }

    pub fn is_registered(&self) -> bool {
        self.handler.borrow().is_some()
    }

    /// Number of times `start` was called.
    pub fn start_calls(&self) -> u32 {
        self.start_calls.get()
    }

    pub fn permission_requests(&self) -> u32 {
        self.permission_requests.get()
    }
}

impl MotionSource for ReplaySource {
    async fn request_permission(&self) -> Result<(), SourceError> {
        self.permission_requests.set(self.permission_requests.get() + 1);

        let mode = self.permission.borrow_mut().take();
        match mode {
            None | Some(PermissionMode::Granted) => {
                *self.permission.borrow_mut() = Some(PermissionMode::Granted);
                Ok(())
            }
            Some(PermissionMode::Denied(reason)) => {
                *self.permission.borrow_mut() = Some(PermissionMode::Denied(reason.clone()));
                Err(SourceError::PermissionDenied { reason })
            }
            Some(PermissionMode::Unavailable(details)) => {
                *self.permission.borrow_mut() = Some(PermissionMode::Unavailable(details.clone()));
                Err(SourceError::Unavailable(details))
            }
            Some(PermissionMode::Gated(rx)) => {
                *self.permission.borrow_mut() = Some(PermissionMode::Granted);
                rx.await.unwrap_or_else(|_| {
                    Err(SourceError::Unavailable(
                        "permission request abandoned".to_string(),
                    ))
                })
            }
        }
    }

    fn start(&self, handler: SampleHandler) {
        self.start_calls.set(self.start_calls.get() + 1);
        self.registration.set(self.registration.get() + 1);
        *self.handler.borrow_mut() = Some(handler);
    }

    fn stop(&self) {
        self.registration.set(self.registration.get() + 1);
        self.handler.borrow_mut().take();
    }
}
