use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::{Presenter, PresenterFactory, PresenterState};
use crate::context::PresentationContext;
use crate::dismiss::{DismissTrigger, Dismissable};

/// Default animate-in duration.
pub const DEFAULT_ANIMATE_IN: Duration = Duration::from_millis(200);
/// Default animate-out duration.
pub const DEFAULT_ANIMATE_OUT: Duration = Duration::from_millis(200);

/// Slides the banner in, waits for the dismiss trigger, slides it out.
///
/// Animation phases are timed on the tokio runtime current when the
/// presenter was built. Without a runtime, or with zero durations, the
/// phases complete synchronously.
pub struct SlidePresenter {
    context: Arc<PresentationContext>,
    dismiss_trigger: Arc<dyn DismissTrigger>,
    animate_in: Duration,
    animate_out: Duration,
    state: Mutex<PresenterState>,
    runtime: Option<Handle>,
    this: Weak<SlidePresenter>,
}

impl SlidePresenter {
    pub fn new(
        context: Arc<PresentationContext>,
        dismiss_trigger: Arc<dyn DismissTrigger>,
        animate_in: Duration,
        animate_out: Duration,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            context,
            dismiss_trigger,
            animate_in,
            animate_out,
            state: Mutex::new(PresenterState::Idle),
            runtime: Handle::try_current().ok(),
            this: this.clone(),
        })
    }

    fn swap_state(&self, from: PresenterState, to: PresenterState) -> bool {
        let mut state = self.state.lock();
        if *state != from {
            return false;
        }
        *state = to;
        true
    }

    /// Run `step` once `delay` has passed.
    fn after(&self, delay: Duration, step: fn(&SlidePresenter)) {
        match &self.runtime {
            Some(runtime) if !delay.is_zero() => {
                let this = self.this.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(presenter) = this.upgrade() {
                        step(&presenter);
                    }
                });
            }
            _ => step(self),
        }
    }

    fn did_present(&self) {
        if !self.swap_state(PresenterState::Presenting, PresenterState::Presented) {
            return;
        }
        let target: Weak<SlidePresenter> = self.this.clone();
        self.dismiss_trigger.set_target(target);
        if let Some(schedulable) = self.dismiss_trigger.as_schedulable() {
            schedulable.schedule();
        }
    }

    fn did_dismiss(&self) {
        if !self.swap_state(PresenterState::Dismissing, PresenterState::Idle) {
            return;
        }
        if let Err(e) = self.context.complete_presentation() {
            warn!(
                request_id = %self.context.request_id(),
                error = %e,
                "Failed to complete presentation"
            );
        }
    }
}

impl Dismissable for SlidePresenter {
    fn dismiss(&self) {
        if !self.swap_state(PresenterState::Presented, PresenterState::Dismissing) {
            debug!(
                request_id = %self.context.request_id(),
                state = %self.state(),
                "Ignoring dismiss of a presenter that is not presented"
            );
            return;
        }
        if let Some(schedulable) = self.dismiss_trigger.as_schedulable() {
            schedulable.cancel();
        }
        self.after(self.animate_out, SlidePresenter::did_dismiss);
    }
}

impl Presenter for SlidePresenter {
    fn context(&self) -> &Arc<PresentationContext> {
        &self.context
    }

    fn dismiss_trigger(&self) -> &Arc<dyn DismissTrigger> {
        &self.dismiss_trigger
    }

    fn state(&self) -> PresenterState {
        *self.state.lock()
    }

    fn present(&self) {
        if !self.swap_state(PresenterState::Idle, PresenterState::Presenting) {
            debug!(
                request_id = %self.context.request_id(),
                state = %self.state(),
                "Ignoring present of a presenter that is not idle"
            );
            return;
        }
        self.after(self.animate_in, SlidePresenter::did_present);
    }
}

/// Factory for [`SlidePresenter`].
#[derive(Debug, Clone, Copy)]
pub struct SlidePresenterFactory {
    pub animate_in: Duration,
    pub animate_out: Duration,
}

impl SlidePresenterFactory {
    pub fn new(animate_in: Duration, animate_out: Duration) -> Self {
        Self {
            animate_in,
            animate_out,
        }
    }

    /// A factory whose presenters switch state without any delay.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

impl Default for SlidePresenterFactory {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATE_IN, DEFAULT_ANIMATE_OUT)
    }
}

impl PresenterFactory for SlidePresenterFactory {
    fn make_presenter(
        &self,
        context: Arc<PresentationContext>,
        dismiss_trigger: Arc<dyn DismissTrigger>,
    ) -> Arc<dyn Presenter> {
        SlidePresenter::new(context, dismiss_trigger, self.animate_in, self.animate_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dismiss::{DurationDismissTrigger, ManualDismissTrigger};
    use crate::request::RequestState;
    use crate::test_utils::{MockQueueDelegate, presentation_context, queue_for};

    #[test]
    fn test_immediate_presenter_lifecycle() {
        let delegate = MockQueueDelegate::new();
        let queue = queue_for(&delegate);
        let (request, context) = presentation_context(&queue, "Hello");
        let trigger = Arc::new(ManualDismissTrigger::new());

        let presenter = SlidePresenterFactory::immediate().make_presenter(context, trigger.clone());
        assert_eq!(presenter.state(), PresenterState::Idle);

        presenter.present();
        assert_eq!(presenter.state(), PresenterState::Presented);
        assert!(trigger.target().is_some());

        trigger.trigger();
        assert_eq!(presenter.state(), PresenterState::Idle);
        assert_eq!(request.state(), RequestState::Finished);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dismiss_before_present_is_ignored() {
        let delegate = MockQueueDelegate::new();
        let queue = queue_for(&delegate);
        let (request, context) = presentation_context(&queue, "Hello");

        let presenter = SlidePresenterFactory::immediate()
            .make_presenter(context, Arc::new(ManualDismissTrigger::new()));
        presenter.dismiss();
        assert_eq!(presenter.state(), PresenterState::Idle);
        assert_eq!(request.state(), RequestState::Running);
    }

    #[test]
    fn test_present_twice_is_ignored() {
        let delegate = MockQueueDelegate::new();
        let queue = queue_for(&delegate);
        let (_request, context) = presentation_context(&queue, "Hello");
        let trigger = Arc::new(ManualDismissTrigger::new());

        let presenter = SlidePresenterFactory::immediate().make_presenter(context, trigger.clone());
        presenter.present();
        presenter.present();
        assert_eq!(presenter.state(), PresenterState::Presented);

        trigger.trigger();
        trigger.trigger();
        assert_eq!(presenter.state(), PresenterState::Idle);
    }

    #[tokio::test]
    async fn test_timed_presenter_with_duration_trigger() {
        let delegate = MockQueueDelegate::new();
        let queue = queue_for(&delegate);
        let (request, context) = presentation_context(&queue, "Hello");
        let trigger = Arc::new(DurationDismissTrigger::new(Duration::from_millis(30)));

        let presenter = SlidePresenterFactory::new(
            Duration::from_millis(10),
            Duration::from_millis(10),
        )
        .make_presenter(context, trigger);

        presenter.present();
        assert_eq!(presenter.state(), PresenterState::Presenting);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(presenter.state(), PresenterState::Idle);
        assert_eq!(request.state(), RequestState::Finished);
    }
}
