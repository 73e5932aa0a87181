//! Notification center.
//!
//! The center is the entry point for applications. It owns the request queue
//! and acts as its delegate: whenever the queue starts a request, the center
//! builds the view, the presentation context and the presenter for it on
//! its executor, then hands over to the presenter.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::Result;
use crate::config::CenterConfig;
use crate::context::PresentationContext;
use crate::dismiss::{DismissTrigger, DurationDismissTrigger};
use crate::executor::{Executor, InlineExecutor};
use crate::notification::Notification;
use crate::presenter::{Presenter, PresenterFactory, SlidePresenterFactory};
use crate::queue::{QueueDelegate, RequestQueue};
use crate::request::NotificationRequest;
use crate::view::{BannerViewFactory, ViewFactory};
use crate::window::{HeadlessWindow, NotificationWindow};

struct ActivePresentation {
    request_id: Uuid,
    presenter: Arc<dyn Presenter>,
}

/// A runtime owned by a center built outside of tokio, so that default
/// dismiss timers still fire.
struct TimerRuntime {
    runtime: Option<Runtime>,
}

impl TimerRuntime {
    fn start() -> Option<Self> {
        match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("banner-queue-timer")
            .enable_time()
            .build()
        {
            Ok(runtime) => {
                debug!("Started timer runtime for default dismiss triggers");
                Some(Self {
                    runtime: Some(runtime),
                })
            }
            Err(e) => {
                warn!(error = %e, "Failed to start timer runtime, default dismiss timers disabled");
                None
            }
        }
    }

    fn handle(&self) -> Option<Handle> {
        self.runtime.as_ref().map(|runtime| runtime.handle().clone())
    }
}

impl Drop for TimerRuntime {
    fn drop(&mut self) {
        // The last center handle may be released on a runtime thread, where a
        // blocking shutdown would panic.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Resolve where default dismiss timers run: the given runtime, the caller's
/// runtime, or a runtime owned by the center.
fn resolve_timer_runtime(handle: Option<Handle>) -> (Option<Handle>, Option<TimerRuntime>) {
    if let Some(handle) = handle.or_else(|| Handle::try_current().ok()) {
        return (Some(handle), None);
    }
    match TimerRuntime::start() {
        Some(runtime) => (runtime.handle(), Some(runtime)),
        None => (None, None),
    }
}

struct CenterInner {
    this: Weak<CenterInner>,
    config: RwLock<CenterConfig>,
    presenter_factory: RwLock<Arc<dyn PresenterFactory>>,
    default_view_factory: RwLock<Arc<dyn ViewFactory>>,
    window: Arc<dyn NotificationWindow>,
    executor: Arc<dyn Executor>,
    queue: RequestQueue,
    current: Mutex<Option<ActivePresentation>>,
    timer_handle: Option<Handle>,
    _timer_runtime: Option<TimerRuntime>,
}

/// Queues and presents notifications, one at a time.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<CenterInner>,
}

impl NotificationCenter {
    /// Create a center with the default configuration, presenting inline on
    /// a headless window.
    pub fn new() -> Self {
        Self::from_parts(
            CenterConfig::default(),
            Arc::new(SlidePresenterFactory::default()),
            Arc::new(BannerViewFactory),
            Arc::new(HeadlessWindow::new()),
            Arc::new(InlineExecutor),
            None,
        )
    }

    pub fn builder() -> NotificationCenterBuilder {
        NotificationCenterBuilder::default()
    }

    fn from_parts(
        config: CenterConfig,
        presenter_factory: Arc<dyn PresenterFactory>,
        default_view_factory: Arc<dyn ViewFactory>,
        window: Arc<dyn NotificationWindow>,
        executor: Arc<dyn Executor>,
        timer_handle: Option<Handle>,
    ) -> Self {
        let (timer_handle, timer_runtime) = resolve_timer_runtime(timer_handle);
        let inner = Arc::new_cyclic(|this: &Weak<CenterInner>| {
            let delegate: Weak<CenterInner> = this.clone();
            CenterInner {
                this: this.clone(),
                config: RwLock::new(config),
                presenter_factory: RwLock::new(presenter_factory),
                default_view_factory: RwLock::new(default_view_factory),
                window,
                executor,
                queue: RequestQueue::new(delegate),
                current: Mutex::new(None),
                timer_handle,
                _timer_runtime: timer_runtime,
            }
        });
        Self { inner }
    }

    /// Request to present a notification with the default view and dismiss
    /// trigger.
    pub fn show(&self, notification: Notification) -> NotificationRequest {
        self.show_with(notification, None, None)
    }

    /// Request to present a notification.
    ///
    /// `view_factory` overrides the default view factory and
    /// `dismiss_trigger` overrides the default duration trigger. The
    /// returned request can be cancelled as long as it is idle; it is
    /// already cancelled if it was refused as a duplicate.
    pub fn show_with(
        &self,
        notification: Notification,
        view_factory: Option<Arc<dyn ViewFactory>>,
        dismiss_trigger: Option<Arc<dyn DismissTrigger>>,
    ) -> NotificationRequest {
        let view_factory =
            view_factory.unwrap_or_else(|| self.inner.default_view_factory.read().clone());
        let allow_duplicates = self.inner.config.read().allow_duplicates;
        self.inner
            .queue
            .add(notification, view_factory, dismiss_trigger, allow_duplicates)
    }

    pub fn config(&self) -> CenterConfig {
        self.inner.config.read().clone()
    }

    /// Replace the configuration. Applies to requests shown afterwards.
    pub fn set_config(&self, config: CenterConfig) -> Result<()> {
        config.validate()?;
        info!(
            allow_duplicates = config.allow_duplicates,
            window_level = ?config.window_level,
            default_display_duration_ms = config.default_display_duration_ms,
            "Notification center configuration updated"
        );
        *self.inner.config.write() = config;
        Ok(())
    }

    pub fn set_presenter_factory(&self, factory: Arc<dyn PresenterFactory>) {
        *self.inner.presenter_factory.write() = factory;
    }

    pub fn set_default_view_factory(&self, factory: Arc<dyn ViewFactory>) {
        *self.inner.default_view_factory.write() = factory;
    }

    /// The presenter of the notification currently on screen.
    pub fn current_presenter(&self) -> Option<Arc<dyn Presenter>> {
        self.inner
            .current
            .lock()
            .as_ref()
            .map(|active| active.presenter.clone())
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.inner.queue
    }

    pub fn window(&self) -> &Arc<dyn NotificationWindow> {
        &self.inner.window
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl CenterInner {
    fn present(&self, request: NotificationRequest) {
        let view = request
            .view_factory()
            .make_view(request.notification().clone());
        request.notification().set_observer(Arc::downgrade(&view));

        let (window_level, display_duration) = {
            let config = self.config.read();
            (config.window_level, config.default_display_duration())
        };

        let this = self.this.clone();
        let context = Arc::new(PresentationContext::new(
            request.clone(),
            self.window.clone(),
            window_level,
            view.clone(),
            Some(Box::new(move |request: &NotificationRequest| {
                if let Some(center) = this.upgrade() {
                    center.release_presenter(request);
                }
            })),
        ));

        let dismiss_trigger: Arc<dyn DismissTrigger> = match request.dismiss_trigger() {
            Some(trigger) => trigger.clone(),
            None => {
                let trigger = DurationDismissTrigger::new(display_duration);
                match &self.timer_handle {
                    Some(handle) => Arc::new(trigger.with_handle(handle.clone())),
                    None => Arc::new(trigger),
                }
            }
        };

        let factory = self.presenter_factory.read().clone();
        let presenter = factory.make_presenter(context, dismiss_trigger);
        view.bind_presenter(Some(Arc::downgrade(&presenter)));

        *self.current.lock() = Some(ActivePresentation {
            request_id: request.id(),
            presenter: presenter.clone(),
        });

        debug!(request_id = %request.id(), "Presenting notification");
        presenter.present();
    }

    fn release_presenter(&self, request: &NotificationRequest) {
        let released = {
            let mut current = self.current.lock();
            match current.as_ref() {
                Some(active) if active.request_id == request.id() => current.take(),
                _ => None,
            }
        };
        if released.is_some() {
            debug!(request_id = %request.id(), "Released presenter");
        }
    }
}

impl QueueDelegate for CenterInner {
    fn handle(&self, request: NotificationRequest) {
        let this = self.this.clone();
        self.executor.execute(Box::new(move || match this.upgrade() {
            Some(center) => center.present(request),
            None => warn!(
                request_id = %request.id(),
                "Notification center dropped before presenting"
            ),
        }));
    }
}

/// Builder for [`NotificationCenter`].
pub struct NotificationCenterBuilder {
    config: CenterConfig,
    presenter_factory: Arc<dyn PresenterFactory>,
    default_view_factory: Arc<dyn ViewFactory>,
    window: Arc<dyn NotificationWindow>,
    executor: Arc<dyn Executor>,
    timer_handle: Option<Handle>,
}

impl Default for NotificationCenterBuilder {
    fn default() -> Self {
        Self {
            config: CenterConfig::default(),
            presenter_factory: Arc::new(SlidePresenterFactory::default()),
            default_view_factory: Arc::new(BannerViewFactory),
            window: Arc::new(HeadlessWindow::new()),
            executor: Arc::new(InlineExecutor),
            timer_handle: None,
        }
    }
}

impl NotificationCenterBuilder {
    pub fn config(mut self, config: CenterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn presenter_factory(mut self, factory: Arc<dyn PresenterFactory>) -> Self {
        self.presenter_factory = factory;
        self
    }

    pub fn default_view_factory(mut self, factory: Arc<dyn ViewFactory>) -> Self {
        self.default_view_factory = factory;
        self
    }

    pub fn window(mut self, window: Arc<dyn NotificationWindow>) -> Self {
        self.window = window;
        self
    }

    /// The execution context presentations run on.
    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    /// The runtime default dismiss timers run on.
    ///
    /// Defaults to the runtime current at [`build`](Self::build). Without
    /// one, the center starts and owns a single-threaded timer runtime.
    pub fn timer_runtime(mut self, handle: Handle) -> Self {
        self.timer_handle = Some(handle);
        self
    }

    pub fn build(self) -> Result<NotificationCenter> {
        self.config.validate()?;
        Ok(NotificationCenter::from_parts(
            self.config,
            self.presenter_factory,
            self.default_view_factory,
            self.window,
            self.executor,
            self.timer_handle,
        ))
    }
}
