//! Presentation context.
//!
//! Binds one running request to the window and view it is presented with.
//! Building a context prepares the window; completing it resets the window
//! and finishes the request, which lets the queue move on.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::Result;
use crate::notification::Notification;
use crate::request::NotificationRequest;
use crate::view::NotificationView;
use crate::window::{NotificationWindow, WindowLevel};

type CompletionHook = Box<dyn FnOnce(&NotificationRequest) + Send>;

/// Information about an in-progress notification presentation.
pub struct PresentationContext {
    request: NotificationRequest,
    window: Arc<dyn NotificationWindow>,
    view: Arc<dyn NotificationView>,
    on_complete: Mutex<Option<CompletionHook>>,
}

impl PresentationContext {
    pub(crate) fn new(
        request: NotificationRequest,
        window: Arc<dyn NotificationWindow>,
        window_level: WindowLevel,
        view: Arc<dyn NotificationView>,
        on_complete: Option<CompletionHook>,
    ) -> Self {
        window.set_level(window_level);
        window.attach(view.clone());
        window.set_hidden(false);

        Self {
            request,
            window,
            view,
            on_complete: Mutex::new(on_complete),
        }
    }

    /// The notification being presented.
    pub fn notification(&self) -> &Notification {
        self.request.notification()
    }

    pub fn request_id(&self) -> Uuid {
        self.request.id()
    }

    /// The window the view is presented in.
    pub fn window(&self) -> &Arc<dyn NotificationWindow> {
        &self.window
    }

    pub fn view(&self) -> &Arc<dyn NotificationView> {
        &self.view
    }

    /// Complete the presentation.
    ///
    /// Hides and resets the window, releases the view and finishes the
    /// request. Fails if the request is not running, e.g. when called twice.
    pub fn complete_presentation(&self) -> Result<()> {
        self.window.set_level(WindowLevel::behind_normal());
        self.window.detach();
        self.window.set_hidden(true);

        self.view.bind_presenter(None);
        self.request.notification().clear_observer();

        let hook = self.on_complete.lock().take();
        if let Some(hook) = hook {
            hook(&self.request);
        }

        debug!(request_id = %self.request.id(), "Presentation completed");
        self.request.finish()
    }
}

impl fmt::Debug for PresentationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationContext")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}
