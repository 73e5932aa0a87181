//! # Banner Queue
//!
//! This crate queues transient banner notifications and presents them one at
//! a time on top of an application's UI.
//!
//! ## Features
//!
//! - FIFO request queue with a single running slot
//! - Duplicate suppression based on notification content
//! - Cancellation of requests which are still waiting
//! - Pluggable presenters, dismiss triggers, views and windows
//! - Explicit execution context for the presentation handoff
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use banner_queue::{
//!     ManualDismissTrigger, Notification, NotificationCenter, NotificationContent,
//! };
//!
//! let center = NotificationCenter::new();
//! let trigger = Arc::new(ManualDismissTrigger::new());
//!
//! let request = center.show_with(
//!     Notification::new(NotificationContent::new("Upload finished")),
//!     None,
//!     Some(trigger.clone()),
//! );
//!
//! // Dismiss once the user acknowledged it.
//! trigger.trigger();
//! # let _ = request;
//! ```
//!
//! ## License
//!
//! MIT License
//!

mod center;
mod config;
mod context;
pub mod dismiss;
mod error;
pub mod executor;
mod notification;
pub mod presenter;
mod queue;
mod request;
mod view;
mod window;

#[cfg(test)]
mod test_utils;

pub use center::{NotificationCenter, NotificationCenterBuilder};
pub use config::CenterConfig;
pub use context::PresentationContext;
pub use dismiss::{
    DismissTrigger, Dismissable, DurationDismissTrigger, ManualDismissTrigger,
    SchedulableDismissTrigger,
};
pub use error::{Error, Result};
pub use executor::{Executor, InlineExecutor, Job, MainQueue, MainQueueExecutor, TokioExecutor};
pub use notification::{
    CallbackAction, Color, Notification, NotificationAction, NotificationContent,
    NotificationHeight, NotificationStyle,
};
pub use presenter::{Presenter, PresenterFactory, PresenterState, SlidePresenter, SlidePresenterFactory};
pub use queue::{QueueDelegate, QueueEvent, QueueStats, RequestQueue};
pub use request::{NotificationRequest, RequestState};
pub use view::{BannerView, BannerViewFactory, NotificationView, SwipePhase, ViewFactory};
pub use window::{HeadlessWindow, NotificationWindow, WindowLevel};
