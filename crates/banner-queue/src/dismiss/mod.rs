//! Dismiss triggers.
//!
//! A dismiss trigger decides when a presented notification goes away. The
//! presenter registers itself as the trigger's target once the notification
//! is on screen, and schedules the trigger if it supports scheduling.
//!
//! Two triggers are provided:
//! - [`DurationDismissTrigger`]: dismisses after a fixed duration
//! - [`ManualDismissTrigger`]: dismisses when application code calls `trigger()`

mod duration;
mod manual;

pub use duration::DurationDismissTrigger;
pub use manual::ManualDismissTrigger;

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

/// Something which can be dismissed, usually a presenter.
pub trait Dismissable: Send + Sync {
    fn dismiss(&self);
}

/// Decides when a presented notification is dismissed.
pub trait DismissTrigger: Send + Sync {
    /// Point the trigger at the target to dismiss. The target is not kept alive.
    fn set_target(&self, target: Weak<dyn Dismissable>);

    /// The current target, if it is still alive.
    fn target(&self) -> Option<Arc<dyn Dismissable>>;

    /// Access the trigger as a schedulable trigger, if it is one.
    fn as_schedulable(&self) -> Option<&dyn SchedulableDismissTrigger> {
        None
    }
}

/// A trigger which is scheduled once the notification is presented and can
/// be cancelled, e.g. while the user is dragging the banner.
pub trait SchedulableDismissTrigger: DismissTrigger {
    fn schedule(&self);

    fn cancel(&self);
}

/// Weak target slot shared by the bundled triggers.
#[derive(Default)]
pub(crate) struct TargetSlot {
    target: RwLock<Option<Weak<dyn Dismissable>>>,
}

impl TargetSlot {
    pub(crate) fn set(&self, target: Weak<dyn Dismissable>) {
        *self.target.write() = Some(target);
    }

    pub(crate) fn get(&self) -> Option<Arc<dyn Dismissable>> {
        self.target.read().as_ref().and_then(Weak::upgrade)
    }
}
