use std::sync::{Arc, Weak};

use tracing::debug;

use super::{DismissTrigger, Dismissable, TargetSlot};

/// A trigger dismissing its target only when [`trigger`](Self::trigger) is called.
#[derive(Default)]
pub struct ManualDismissTrigger {
    target: TargetSlot,
}

impl ManualDismissTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dismiss the attached notification if it is presented.
    pub fn trigger(&self) {
        match self.target.get() {
            Some(target) => target.dismiss(),
            None => debug!("Manual dismiss triggered without a live target"),
        }
    }
}

impl DismissTrigger for ManualDismissTrigger {
    fn set_target(&self, target: Weak<dyn Dismissable>) {
        self.target.set(target);
    }

    fn target(&self) -> Option<Arc<dyn Dismissable>> {
        self.target.get()
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

    #[test]
    fn test_trigger_dismisses_target() {
        let trigger = ManualDismissTrigger::new();
        let target = Arc::new(Counter::default());
        let weak: Weak<Counter> = Arc::downgrade(&target);
        trigger.set_target(weak);

        trigger.trigger();
        assert_eq!(target.0.load(Ordering::SeqCst), 1);
        assert!(trigger.as_schedulable().is_none());
    }

    #[test]
    fn test_trigger_without_target_is_noop() {
        let trigger = ManualDismissTrigger::new();
        trigger.trigger();

        let target = Arc::new(Counter::default());
        let weak: Weak<Counter> = Arc::downgrade(&target);
        trigger.set_target(weak);
        drop(target);
        assert!(trigger.target().is_none());
        trigger.trigger();
    }
}
