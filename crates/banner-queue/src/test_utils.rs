//! Shared helpers for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::context::PresentationContext;
use crate::dismiss::DismissTrigger;
use crate::notification::{Notification, NotificationContent};
use crate::presenter::{Presenter, PresenterFactory, SlidePresenterFactory};
use crate::queue::{QueueDelegate, RequestQueue};
use crate::request::NotificationRequest;
use crate::view::{BannerView, BannerViewFactory, NotificationView, ViewFactory};
use crate::window::{HeadlessWindow, WindowLevel};

/// Initialize tracing for tests with appropriate settings
#[inline]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn notification(title: &str) -> Notification {
    Notification::new(NotificationContent::new(title))
}

/// Delegate recording every handled request.
#[derive(Default)]
pub struct MockQueueDelegate {
    handled: Mutex<Vec<NotificationRequest>>,
    finish_on_handle: bool,
}

impl MockQueueDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A delegate completing each request as soon as it is handled.
    pub fn finishing() -> Arc<Self> {
        Arc::new(Self {
            finish_on_handle: true,
            ..Default::default()
        })
    }

    pub fn handled(&self) -> Vec<NotificationRequest> {
        self.handled.lock().clone()
    }
}

impl QueueDelegate for MockQueueDelegate {
    fn handle(&self, request: NotificationRequest) {
        self.handled.lock().push(request.clone());
        if self.finish_on_handle {
            request.finish().unwrap();
        }
    }
}

pub fn queue_for(delegate: &Arc<MockQueueDelegate>) -> RequestQueue {
    let weak: Weak<MockQueueDelegate> = Arc::downgrade(delegate);
    RequestQueue::new(weak)
}

/// Admit a notification and build a context for the resulting running request.
pub fn presentation_context(
    queue: &RequestQueue,
    title: &str,
) -> (NotificationRequest, Arc<PresentationContext>) {
    let request = queue.add(notification(title), Arc::new(BannerViewFactory), None, true);
    let view = BannerViewFactory.make_view(request.notification().clone());
    let context = Arc::new(PresentationContext::new(
        request.clone(),
        Arc::new(HeadlessWindow::new()),
        WindowLevel::StatusBar,
        view,
        None,
    ));
    (request, context)
}

/// View factory counting the views it builds and the content updates they see.
#[derive(Default)]
pub struct RecordingViewFactory {
    made: AtomicUsize,
    updates: Arc<AtomicUsize>,
}

impl RecordingViewFactory {
    pub fn made(&self) -> usize {
        self.made.load(Ordering::SeqCst)
    }

    pub fn content_updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

struct RecordingView {
    banner: BannerView,
    updates: Arc<AtomicUsize>,
}

impl NotificationView for RecordingView {
    fn notification(&self) -> &Notification {
        self.banner.notification()
    }

    fn content_did_update(&self, notification: &Notification) {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.banner.content_did_update(notification);
    }

    fn bind_presenter(&self, presenter: Option<Weak<dyn Presenter>>) {
        self.banner.bind_presenter(presenter);
    }

    fn presenter(&self) -> Option<Arc<dyn Presenter>> {
        self.banner.presenter()
    }
}

impl ViewFactory for RecordingViewFactory {
    fn make_view(&self, notification: Notification) -> Arc<dyn NotificationView> {
        self.made.fetch_add(1, Ordering::SeqCst);
        Arc::new(RecordingView {
            banner: BannerView::new(notification),
            updates: self.updates.clone(),
        })
    }
}

/// Presenter factory recording the requests it builds presenters for.
#[derive(Default)]
pub struct RecordingPresenterFactory {
    made: Mutex<Vec<Uuid>>,
}

impl RecordingPresenterFactory {
    pub fn made(&self) -> Vec<Uuid> {
        self.made.lock().clone()
    }
}

impl PresenterFactory for RecordingPresenterFactory {
    fn make_presenter(
        &self,
        context: Arc<PresentationContext>,
        dismiss_trigger: Arc<dyn DismissTrigger>,
    ) -> Arc<dyn Presenter> {
        self.made.lock().push(context.request_id());
        SlidePresenterFactory::immediate().make_presenter(context, dismiss_trigger)
    }
}
