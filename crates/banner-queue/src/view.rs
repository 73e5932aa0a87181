//! Notification views.
//!
//! Rendering is left to the embedding UI layer. The crate only needs a view
//! to be constructible from a notification, to learn about content updates
//! and to know the presenter driving it so user interaction can reach it.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::notification::{Notification, NotificationContent};
use crate::presenter::Presenter;

/// Phase of a swipe gesture on a presented banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipePhase {
    /// The user started dragging the banner.
    Began,
    /// The user let go; `dismissed` is true when the banner was pushed far
    /// enough out of view.
    Ended { dismissed: bool },
}

/// A view displaying a single notification.
pub trait NotificationView: Send + Sync {
    fn notification(&self) -> &Notification;

    /// The notification content was replaced while this view displays it.
    fn content_did_update(&self, _notification: &Notification) {}

    /// Bind or release the presenter driving this view.
    fn bind_presenter(&self, _presenter: Option<Weak<dyn Presenter>>) {}

    fn presenter(&self) -> Option<Arc<dyn Presenter>> {
        None
    }

    /// Run the notification's action, if the style allows interaction.
    fn tap(&self) {
        let notification = self.notification();
        if !notification.style().interactive {
            return;
        }
        if let Some(action) = notification.action() {
            action.execute();
        }
    }

    /// React to a swipe: hold the dismiss timer while dragging, then either
    /// dismiss or resume the timer.
    fn swipe(&self, phase: SwipePhase) {
        if !self.notification().style().interactive {
            return;
        }
        let Some(presenter) = self.presenter() else {
            return;
        };
        let trigger = presenter.dismiss_trigger().clone();
        match phase {
            SwipePhase::Began => {
                if let Some(schedulable) = trigger.as_schedulable() {
                    schedulable.cancel();
                }
            }
            SwipePhase::Ended { dismissed: true } => presenter.dismiss(),
            SwipePhase::Ended { dismissed: false } => {
                if let Some(schedulable) = trigger.as_schedulable() {
                    schedulable.schedule();
                }
            }
        }
    }
}

/// Builds views for notifications.
pub trait ViewFactory: Send + Sync {
    fn make_view(&self, notification: Notification) -> Arc<dyn NotificationView>;
}

/// The default banner view.
///
/// Keeps the content it last rendered; a UI layer can wrap or replace it.
pub struct BannerView {
    notification: Notification,
    rendered: Mutex<NotificationContent>,
    presenter: RwLock<Option<Weak<dyn Presenter>>>,
}

impl BannerView {
    pub fn new(notification: Notification) -> Self {
        Self {
            rendered: Mutex::new(notification.content()),
            notification,
            presenter: RwLock::new(None),
        }
    }

    /// The content as currently displayed.
    pub fn rendered_content(&self) -> NotificationContent {
        self.rendered.lock().clone()
    }
}

impl NotificationView for BannerView {
    fn notification(&self) -> &Notification {
        &self.notification
    }

    fn content_did_update(&self, notification: &Notification) {
        let content = notification.content();
        trace!(title = %content.title, "Banner content updated");
        *self.rendered.lock() = content;
    }

    fn bind_presenter(&self, presenter: Option<Weak<dyn Presenter>>) {
        *self.presenter.write() = presenter;
    }

    fn presenter(&self) -> Option<Arc<dyn Presenter>> {
        self.presenter.read().as_ref().and_then(Weak::upgrade)
    }
}

/// Factory for [`BannerView`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BannerViewFactory;

impl ViewFactory for BannerViewFactory {
    fn make_view(&self, notification: Notification) -> Arc<dyn NotificationView> {
        Arc::new(BannerView::new(notification))
    }
}
