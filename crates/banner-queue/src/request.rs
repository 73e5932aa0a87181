//! Notification requests.
//!
//! A request tracks one notification from admission until it is finished or
//! cancelled:
//!
//! ```text
//! idle ──start──▶ running ──finish──▶ finished
//!   │
//!   └──cancel──▶ cancelled
//! ```
//!
//! A request never returns to `idle`, and a running request cannot be
//! cancelled: once presentation has begun it always runs to completion.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::dismiss::DismissTrigger;
use crate::notification::Notification;
use crate::view::ViewFactory;
use crate::{Error, Result};

/// Lifecycle state of a [`NotificationRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Waiting to run.
    Idle,
    /// Currently being presented.
    Running,
    /// Presentation completed.
    Finished,
    /// Cancelled before it was presented.
    Cancelled,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the request has left the queue for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives state changes of a request.
///
/// Called synchronously from the call performing the transition, with no
/// request lock held.
pub(crate) trait RequestListener: Send + Sync {
    fn request_did_change_state(&self, request: &NotificationRequest, state: RequestState);
}

struct RequestInner {
    id: Uuid,
    notification: Notification,
    view_factory: Arc<dyn ViewFactory>,
    dismiss_trigger: Option<Arc<dyn DismissTrigger>>,
    created_at: DateTime<Utc>,
    state: Mutex<RequestState>,
    listener: Weak<dyn RequestListener>,
}

/// A request to present a notification.
///
/// Handles are cheap to clone and compare equal only when they refer to the
/// same request; two requests for equal notifications are still distinct.
#[derive(Clone)]
pub struct NotificationRequest {
    inner: Arc<RequestInner>,
}

impl NotificationRequest {
    pub(crate) fn new(
        notification: Notification,
        listener: Weak<dyn RequestListener>,
        view_factory: Arc<dyn ViewFactory>,
        dismiss_trigger: Option<Arc<dyn DismissTrigger>>,
    ) -> Self {
        Self {
            inner: Arc::new(RequestInner {
                id: Uuid::new_v4(),
                notification,
                view_factory,
                dismiss_trigger,
                created_at: Utc::now(),
                state: Mutex::new(RequestState::Idle),
                listener,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The current state of the request.
    pub fn state(&self) -> RequestState {
        *self.inner.state.lock()
    }

    /// The notification requested for presentation.
    pub fn notification(&self) -> &Notification {
        &self.inner.notification
    }

    /// The factory used to build the view for this request.
    pub fn view_factory(&self) -> &Arc<dyn ViewFactory> {
        &self.inner.view_factory
    }

    /// The dismiss trigger to present with; `None` uses the center's default.
    pub fn dismiss_trigger(&self) -> Option<&Arc<dyn DismissTrigger>> {
        self.inner.dismiss_trigger.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    /// Cancel the request if it is still waiting to run.
    ///
    /// Returns `false` and leaves the state untouched when the request is
    /// already being presented, finished or cancelled.
    pub fn cancel(&self) -> bool {
        match self.transition(RequestState::Idle, RequestState::Cancelled) {
            Ok(()) => true,
            Err(current) => {
                debug!(
                    request_id = %self.id(),
                    state = %current,
                    "Ignoring cancel of a request that is no longer idle"
                );
                false
            }
        }
    }

    /// Move the request from idle to running.
    ///
    /// Returns `false` if the request was cancelled before it could be
    /// started. Any other state means the queue scheduled a request twice.
    pub(crate) fn start(&self) -> bool {
        match self.transition(RequestState::Idle, RequestState::Running) {
            Ok(()) => true,
            Err(RequestState::Cancelled) => false,
            Err(current) => panic!(
                "{}",
                Error::invalid_transition(current, RequestState::Running)
            ),
        }
    }

    /// Move the request from running to finished.
    pub(crate) fn finish(&self) -> Result<()> {
        self.transition(RequestState::Running, RequestState::Finished)
            .map_err(|current| Error::invalid_transition(current, RequestState::Finished))
    }

    /// Atomically move from `from` to `to`, then notify the listener.
    ///
    /// On mismatch the actual state is returned and nothing is notified.
    fn transition(
        &self,
        from: RequestState,
        to: RequestState,
    ) -> std::result::Result<(), RequestState> {
        {
            let mut state = self.inner.state.lock();
            if *state != from {
                return Err(*state);
            }
            *state = to;
        }

        trace!(request_id = %self.id(), from = %from, to = %to, "Request state changed");
        if let Some(listener) = self.inner.listener.upgrade() {
            listener.request_did_change_state(self, to);
        }
        Ok(())
    }
}

impl PartialEq for NotificationRequest {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for NotificationRequest {}

impl Hash for NotificationRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for NotificationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationRequest")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("notification", &self.inner.notification)
            .field("has_dismiss_trigger", &self.inner.dismiss_trigger.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationContent;
    use crate::view::BannerViewFactory;

    #[derive(Default)]
    struct RecordingListener {
        changes: Mutex<Vec<(Uuid, RequestState)>>,
    }

    impl RequestListener for RecordingListener {
        fn request_did_change_state(&self, request: &NotificationRequest, state: RequestState) {
            // Must see the new state already applied.
            assert_eq!(request.state(), state);
            self.changes.lock().push((request.id(), state));
        }
    }

    fn request_with(listener: &Arc<RecordingListener>) -> NotificationRequest {
        let weak: Weak<RecordingListener> = Arc::downgrade(listener);
        NotificationRequest::new(
            Notification::new(NotificationContent::new("Hello")),
            weak,
            Arc::new(BannerViewFactory),
            None,
        )
    }

    #[test]
    fn test_new_request_is_idle() {
        let listener = Arc::new(RecordingListener::default());
        let request = request_with(&listener);
        assert_eq!(request.state(), RequestState::Idle);
        assert!(listener.changes.lock().is_empty());
    }

    #[test]
    fn test_cancel_idle_request_notifies_listener() {
        let listener = Arc::new(RecordingListener::default());
        let request = request_with(&listener);

        assert!(request.cancel());
        assert_eq!(request.state(), RequestState::Cancelled);
        assert_eq!(
            *listener.changes.lock(),
            vec![(request.id(), RequestState::Cancelled)]
        );
    }

    #[test]
    fn test_cancel_running_request_is_noop() {
        let listener = Arc::new(RecordingListener::default());
        let request = request_with(&listener);

        assert!(request.start());
        assert!(!request.cancel());
        assert_eq!(request.state(), RequestState::Running);
        assert_eq!(listener.changes.lock().len(), 1);
    }

    #[test]
    fn test_finish_after_start() {
        let listener = Arc::new(RecordingListener::default());
        let request = request_with(&listener);

        assert!(request.start());
        request.finish().unwrap();
        assert_eq!(request.state(), RequestState::Finished);
        assert!(!request.cancel());

        let states: Vec<_> = listener.changes.lock().iter().map(|c| c.1).collect();
        assert_eq!(states, vec![RequestState::Running, RequestState::Finished]);
    }

    #[test]
    fn test_finish_out_of_sequence_is_error() {
        let listener = Arc::new(RecordingListener::default());
        let request = request_with(&listener);

        let err = request.finish().unwrap_err();
        assert!(matches!(err, Error::InvalidStateTransition { .. }));
        assert_eq!(request.state(), RequestState::Idle);
    }

    #[test]
    fn test_start_cancelled_request_returns_false() {
        let listener = Arc::new(RecordingListener::default());
        let request = request_with(&listener);

        request.cancel();
        assert!(!request.start());
        assert_eq!(request.state(), RequestState::Cancelled);
    }

    #[test]
    #[should_panic(expected = "Invalid state transition")]
    fn test_start_twice_panics() {
        let listener = Arc::new(RecordingListener::default());
        let request = request_with(&listener);

        request.start();
        request.start();
    }

    #[test]
    fn test_equality_is_identity() {
        let listener = Arc::new(RecordingListener::default());
        let first = request_with(&listener);
        let second = request_with(&listener);

        assert_eq!(first, first.clone());
        assert_ne!(first, second);
        assert_eq!(first.notification(), second.notification());
    }

    #[test]
    fn test_dropped_listener_is_ignored() {
        let listener = Arc::new(RecordingListener::default());
        let request = request_with(&listener);
        drop(listener);

        assert!(request.cancel());
        assert_eq!(request.state(), RequestState::Cancelled);
    }
}
