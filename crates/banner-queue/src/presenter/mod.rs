//! Presenters.
//!
//! A presenter shows a notification view and hides it again, driven by a
//! dismiss trigger. It has its own state machine:
//!
//! ```text
//! idle ──present──▶ presenting ──▶ presented ──dismiss──▶ dismissing ──▶ idle
//! ```
//!
//! `present` outside `idle` and `dismiss` outside `presented` are ignored.
//! Once dismissed, the presenter completes the presentation through its
//! [`PresentationContext`], which finishes the request and lets the queue
//! advance.

mod slide;

pub use slide::{SlidePresenter, SlidePresenterFactory};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::PresentationContext;
use crate::dismiss::{DismissTrigger, Dismissable};

/// State of a presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenterState {
    /// Ready to be presented.
    Idle,
    /// Animating in.
    Presenting,
    /// Visible.
    Presented,
    /// Animating out.
    Dismissing,
}

impl fmt::Display for PresenterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Presenting => "presenting",
            Self::Presented => "presented",
            Self::Dismissing => "dismissing",
        };
        f.write_str(name)
    }
}

/// Presents and dismisses a notification view.
///
/// [`Dismissable::dismiss`] starts the dismissal.
pub trait Presenter: Dismissable {
    /// The presentation this presenter drives.
    fn context(&self) -> &Arc<PresentationContext>;

    /// The trigger deciding when to dismiss.
    fn dismiss_trigger(&self) -> &Arc<dyn DismissTrigger>;

    fn state(&self) -> PresenterState;

    /// Show the notification view.
    fn present(&self);
}

/// Builds a presenter for each presentation.
pub trait PresenterFactory: Send + Sync {
    fn make_presenter(
        &self,
        context: Arc<PresentationContext>,
        dismiss_trigger: Arc<dyn DismissTrigger>,
    ) -> Arc<dyn Presenter>;
}
