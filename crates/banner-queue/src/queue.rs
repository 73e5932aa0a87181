//! Request queue.
//!
//! The queue admits notification requests, rejects duplicates when asked to,
//! and makes sure only one request is running at any time. Requests are
//! promoted strictly in admission order.
//!
//! The request sequence is guarded by a single mutex. Admission (duplicate
//! check and insert) and promotion (busy check and start) each run as one
//! critical section, so concurrent callers can neither admit two requests
//! with equal content nor start two requests at once. Delegate and listener
//! callbacks always run after the lock is released.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::dismiss::DismissTrigger;
use crate::notification::Notification;
use crate::request::{NotificationRequest, RequestListener, RequestState};
use crate::view::ViewFactory;

/// Broadcast channel capacity for queue events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Receives requests which are ready to be presented.
pub trait QueueDelegate: Send + Sync {
    /// Called once a request has been moved to running.
    ///
    /// Called immediately on admission when nothing else runs, otherwise
    /// when the running request finishes or is removed.
    fn handle(&self, request: NotificationRequest);
}

/// Lifecycle events published by a [`RequestQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A request was appended to the queue.
    Admitted { request_id: Uuid },
    /// A request was refused as a duplicate.
    Rejected { request_id: Uuid },
    /// A request was promoted to running.
    Started { request_id: Uuid },
    /// A running request completed its presentation.
    Finished { request_id: Uuid },
    /// A queued request was cancelled before running.
    Cancelled { request_id: Uuid },
}

impl QueueEvent {
    pub fn request_id(&self) -> Uuid {
        match self {
            Self::Admitted { request_id }
            | Self::Rejected { request_id }
            | Self::Started { request_id }
            | Self::Finished { request_id }
            | Self::Cancelled { request_id } => *request_id,
        }
    }
}

/// Snapshot of queue statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Number of requests currently tracked (idle or running).
    pub queued: usize,
    /// Whether a request is currently running.
    pub running: bool,
    /// Total requests admitted.
    pub admitted: u64,
    /// Total requests rejected as duplicates.
    pub rejected: u64,
    /// Total requests promoted to running.
    pub started: u64,
    /// Total requests finished.
    pub finished: u64,
    /// Total admitted requests cancelled while idle.
    pub cancelled: u64,
}

#[derive(Debug, Default)]
struct Counters {
    admitted: AtomicU64,
    rejected: AtomicU64,
    started: AtomicU64,
    finished: AtomicU64,
    cancelled: AtomicU64,
}

struct QueueShared {
    requests: Mutex<Vec<NotificationRequest>>,
    delegate: Weak<dyn QueueDelegate>,
    event_tx: broadcast::Sender<QueueEvent>,
    counters: Counters,
}

/// A FIFO queue of notification requests with a single running slot.
#[derive(Clone)]
pub struct RequestQueue {
    shared: Arc<QueueShared>,
}

impl RequestQueue {
    /// Create a queue reporting runnable requests to `delegate`.
    ///
    /// The delegate is not kept alive by the queue.
    pub fn new(delegate: Weak<dyn QueueDelegate>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(QueueShared {
                requests: Mutex::new(Vec::new()),
                delegate,
                event_tx,
                counters: Counters::default(),
            }),
        }
    }

    /// Add a notification to the queue.
    ///
    /// Unless `allow_duplicates` is set, a notification whose content equals
    /// that of a queued or running request is refused; the returned request
    /// is then already `cancelled`. An accepted request is appended and, if
    /// nothing else is running, started before this returns.
    pub fn add(
        &self,
        notification: Notification,
        view_factory: Arc<dyn ViewFactory>,
        dismiss_trigger: Option<Arc<dyn DismissTrigger>>,
        allow_duplicates: bool,
    ) -> NotificationRequest {
        let listener: Weak<QueueShared> = Arc::downgrade(&self.shared);
        let request = NotificationRequest::new(notification, listener, view_factory, dismiss_trigger);

        let admitted = {
            let mut requests = self.shared.requests.lock();
            let duplicate = !allow_duplicates
                && requests.iter().any(|queued| {
                    matches!(queued.state(), RequestState::Idle | RequestState::Running)
                        && queued.notification().has_same_content(request.notification())
                });
            if !duplicate {
                requests.push(request.clone());
            }
            !duplicate
        };

        if admitted {
            self.shared.counters.admitted.fetch_add(1, Ordering::Relaxed);
            self.shared.publish(QueueEvent::Admitted {
                request_id: request.id(),
            });
            debug!(
                request_id = %request.id(),
                title = %request.notification().content().title,
                "Notification request admitted"
            );
        } else {
            // Never inserted, so the listener only sees a no-op removal.
            request.cancel();
            self.shared.counters.rejected.fetch_add(1, Ordering::Relaxed);
            self.shared.publish(QueueEvent::Rejected {
                request_id: request.id(),
            });
            debug!(
                request_id = %request.id(),
                title = %request.notification().content().title,
                "Duplicate notification request rejected"
            );
        }

        self.shared.update_running_request();
        request
    }

    /// Remove a request by identity and promote the next idle request.
    pub fn remove(&self, request: &NotificationRequest) {
        self.shared.remove(request);
    }

    /// Start the first idle request unless a request is already running.
    pub fn update_running_request(&self) {
        self.shared.update_running_request();
    }

    /// Whether any tracked request is running.
    pub fn request_is_running(&self) -> bool {
        self.shared
            .requests
            .lock()
            .iter()
            .any(|r| r.state() == RequestState::Running)
    }

    /// The earliest admitted request that is still idle.
    pub fn next_request_to_run(&self) -> Option<NotificationRequest> {
        self.shared
            .requests
            .lock()
            .iter()
            .find(|r| r.state() == RequestState::Idle)
            .cloned()
    }

    /// Snapshot of the tracked requests in admission order.
    pub fn requests(&self) -> Vec<NotificationRequest> {
        self.shared.requests.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.shared.requests.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.requests.lock().is_empty()
    }

    /// Subscribe to queue events.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.shared.event_tx.subscribe()
    }

    pub fn stats(&self) -> QueueStats {
        let (queued, running) = {
            let requests = self.shared.requests.lock();
            let running = requests.iter().any(|r| r.state() == RequestState::Running);
            (requests.len(), running)
        };
        let counters = &self.shared.counters;
        QueueStats {
            queued,
            running,
            admitted: counters.admitted.load(Ordering::Relaxed),
            rejected: counters.rejected.load(Ordering::Relaxed),
            started: counters.started.load(Ordering::Relaxed),
            finished: counters.finished.load(Ordering::Relaxed),
            cancelled: counters.cancelled.load(Ordering::Relaxed),
        }
    }
}

impl QueueShared {
    fn publish(&self, event: QueueEvent) {
        // Ignore errors - just means no subscribers currently
        let _ = self.event_tx.send(event);
    }

    fn remove(&self, request: &NotificationRequest) {
        self.take(request);
        self.update_running_request();
    }

    /// Drop a request from the sequence. Returns whether it was tracked.
    fn take(&self, request: &NotificationRequest) -> bool {
        let removed = {
            let mut requests = self.requests.lock();
            let before = requests.len();
            requests.retain(|r| r != request);
            requests.len() != before
        };
        if removed {
            trace!(request_id = %request.id(), "Notification request removed");
        }
        removed
    }

    fn update_running_request(&self) {
        let started = {
            let requests = self.requests.lock();
            if requests.iter().any(|r| r.state() == RequestState::Running) {
                return;
            }
            // Only a concurrent cancel can move an idle request, in which case
            // `start` refuses and the next idle request is tried.
            requests
                .iter()
                .find(|r| r.state() == RequestState::Idle && r.start())
                .cloned()
        };

        let Some(request) = started else {
            return;
        };

        self.counters.started.fetch_add(1, Ordering::Relaxed);
        self.publish(QueueEvent::Started {
            request_id: request.id(),
        });
        debug!(request_id = %request.id(), "Notification request started");

        match self.delegate.upgrade() {
            Some(delegate) => delegate.handle(request),
            None => warn!(
                request_id = %request.id(),
                "Queue delegate is gone, running request will not be presented"
            ),
        }
    }
}

impl RequestListener for QueueShared {
    fn request_did_change_state(&self, request: &NotificationRequest, state: RequestState) {
        // `running` is reported while the sequence lock is held by
        // `update_running_request`, so it must not touch the lock.
        match state {
            RequestState::Finished => {
                if self.take(request) {
                    self.counters.finished.fetch_add(1, Ordering::Relaxed);
                    self.publish(QueueEvent::Finished {
                        request_id: request.id(),
                    });
                }
                self.update_running_request();
            }
            RequestState::Cancelled => {
                if self.take(request) {
                    self.counters.cancelled.fetch_add(1, Ordering::Relaxed);
                    self.publish(QueueEvent::Cancelled {
                        request_id: request.id(),
                    });
                    debug!(request_id = %request.id(), "Notification request cancelled");
                }
                self.update_running_request();
            }
            RequestState::Idle | RequestState::Running => {}
        }
    }
}
