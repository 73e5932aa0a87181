use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use super::{DismissTrigger, Dismissable, SchedulableDismissTrigger, TargetSlot};

/// A trigger dismissing its target after a fixed duration.
///
/// The timer runs on a tokio runtime: the one given through
/// [`with_handle`](Self::with_handle), otherwise the runtime current at
/// [`schedule`](SchedulableDismissTrigger::schedule) time.
pub struct DurationDismissTrigger {
    duration: Duration,
    target: Arc<TargetSlot>,
    pending: Mutex<Option<CancellationToken>>,
    handle: Option<Handle>,
}

impl DurationDismissTrigger {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            target: Arc::new(TargetSlot::default()),
            pending: Mutex::new(None),
            handle: None,
        }
    }

    /// Run the timer on the given runtime.
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// How long the notification stays presented.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether a dismiss is scheduled and has not fired or been cancelled.
    pub fn is_scheduled(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }
}

impl DismissTrigger for DurationDismissTrigger {
    fn set_target(&self, target: Weak<dyn Dismissable>) {
        self.target.set(target);
    }

    fn target(&self) -> Option<Arc<dyn Dismissable>> {
        self.target.get()
    }

    fn as_schedulable(&self) -> Option<&dyn SchedulableDismissTrigger> {
        Some(self)
    }
}

impl SchedulableDismissTrigger for DurationDismissTrigger {
    fn schedule(&self) {
        let Some(handle) = self.handle.clone().or_else(|| Handle::try_current().ok()) else {
            warn!(
                duration_ms = self.duration.as_millis() as u64,
                "No tokio runtime available, dismiss timer not scheduled"
            );
            return;
        };

        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().replace(token.clone()) {
            previous.cancel();
        }

        let target = self.target.clone();
        let duration = self.duration;
        handle.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!("Dismiss timer cancelled");
                }
                _ = tokio::time::sleep(duration) => {
                    // Mark as fired before dismissing; dismissing may cancel us.
                    token.cancel();
                    if let Some(target) = target.get() {
                        target.dismiss();
                    }
                }
            }
        });
    }

    fn cancel(&self) {
        if let Some(token) = self.pending.lock().take() {
            token.cancel();
        }
    }
}

impl Drop for DurationDismissTrigger {
    fn drop(&mut self) {
        if let Some(token) = self.pending.get_mut().take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Dismissable for Counter {
        fn dismiss(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn trigger_with_target(duration: Duration) -> (DurationDismissTrigger, Arc<Counter>) {
        let trigger = DurationDismissTrigger::new(duration);
        let target = Arc::new(Counter::default());
        let weak: Weak<Counter> = Arc::downgrade(&target);
        trigger.set_target(weak);
        (trigger, target)
    }

    #[tokio::test]
    async fn test_dismisses_after_duration() {
        let (trigger, target) = trigger_with_target(Duration::from_millis(20));
        trigger.schedule();
        assert!(trigger.is_scheduled());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(target.0.load(Ordering::SeqCst), 1);
        assert!(!trigger.is_scheduled());
    }

    #[tokio::test]
    async fn test_cancel_prevents_dismiss() {
        let (trigger, target) = trigger_with_target(Duration::from_millis(50));
        trigger.schedule();
        trigger.cancel();
        assert!(!trigger.is_scheduled());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(target.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reschedule_replaces_pending_timer() {
        let (trigger, target) = trigger_with_target(Duration::from_millis(20));
        trigger.schedule();
        trigger.schedule();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(target.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_schedule_without_runtime_is_noop() {
        let (trigger, target) = trigger_with_target(Duration::from_millis(1));
        trigger.schedule();
        assert!(!trigger.is_scheduled());
        assert_eq!(target.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_is_schedulable() {
        let trigger = DurationDismissTrigger::new(Duration::from_secs(2));
        assert!(trigger.as_schedulable().is_some());
        assert_eq!(trigger.duration(), Duration::from_secs(2));
    }
}
