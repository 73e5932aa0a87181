//! Notification payloads.
//!
//! A [`Notification`] is a cheap, clonable handle around shared state: the
//! content (which can be replaced while the notification is on screen), the
//! style and an optional tap action. Clones refer to the same notification.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::view::NotificationView;

/// The displayed content of a notification.
///
/// This is the only part of a notification taken into account when
/// detecting duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    /// The title shown inside the banner.
    pub title: String,
    /// Optional secondary line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Optional image asset name, e.g. a chevron shown for actionable banners.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl NotificationContent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            image: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Height of the notification banner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationHeight {
    /// Covers the status bar.
    StatusBar,
    /// Covers the status bar and navigation bar.
    NavigationBar,
    /// A custom height in points.
    Custom(f32),
}

impl NotificationHeight {
    /// Height in points.
    pub fn value(self) -> f32 {
        match self {
            Self::StatusBar => 20.0,
            Self::NavigationBar => 64.0,
            Self::Custom(height) => height,
        }
    }
}

/// An RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const WHITE: Color = Color(255, 255, 255);
    pub const BLACK: Color = Color(0, 0, 0);
}

/// Visual style of a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationStyle {
    pub font_size: f32,
    pub background_color: Color,
    pub text_color: Color,
    pub height: NotificationHeight,
    /// Maximum banner width; the banner is centered when set.
    pub max_width: Option<f32>,
    /// When `true`, the notification can be tapped and swiped away.
    pub interactive: bool,
}

impl Default for NotificationStyle {
    fn default() -> Self {
        Self {
            font_size: 13.0,
            background_color: Color::WHITE,
            text_color: Color::BLACK,
            height: NotificationHeight::NavigationBar,
            max_width: None,
            interactive: true,
        }
    }
}

/// An action executed when a notification is tapped.
pub trait NotificationAction: Send + Sync {
    fn execute(&self);
}

/// A [`NotificationAction`] backed by a closure.
pub struct CallbackAction {
    callback: Box<dyn Fn() + Send + Sync>,
}

impl CallbackAction {
    pub fn new(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl NotificationAction for CallbackAction {
    fn execute(&self) {
        (self.callback)();
    }
}

impl fmt::Debug for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackAction").finish_non_exhaustive()
    }
}

struct NotificationInner {
    content: RwLock<NotificationContent>,
    style: NotificationStyle,
    action: Option<Arc<dyn NotificationAction>>,
    observer: RwLock<Option<Weak<dyn NotificationView>>>,
}

/// A banner notification which can be shown through a
/// [`NotificationCenter`](crate::NotificationCenter).
#[derive(Clone)]
pub struct Notification {
    inner: Arc<NotificationInner>,
}

impl Notification {
    /// Create a notification with the default style and no action.
    pub fn new(content: NotificationContent) -> Self {
        Self::with_style(content, NotificationStyle::default(), None)
    }

    pub fn with_style(
        content: NotificationContent,
        style: NotificationStyle,
        action: Option<Arc<dyn NotificationAction>>,
    ) -> Self {
        Self {
            inner: Arc::new(NotificationInner {
                content: RwLock::new(content),
                style,
                action,
                observer: RwLock::new(None),
            }),
        }
    }

    /// Snapshot of the current content.
    pub fn content(&self) -> NotificationContent {
        self.inner.content.read().clone()
    }

    pub fn style(&self) -> &NotificationStyle {
        &self.inner.style
    }

    pub fn action(&self) -> Option<&Arc<dyn NotificationAction>> {
        self.inner.action.as_ref()
    }

    /// Replace the content and notify the view currently displaying it.
    ///
    /// This is independent of the queue state; a queued notification simply
    /// shows the new content once it is presented.
    pub fn update(&self, content: NotificationContent) {
        *self.inner.content.write() = content;

        let observer = self.inner.observer.read().as_ref().and_then(Weak::upgrade);
        if let Some(view) = observer {
            trace!("Forwarding content update to the active view");
            view.content_did_update(self);
        }
    }

    /// Whether both notifications display equal content.
    ///
    /// Style and action are ignored.
    pub fn has_same_content(&self, other: &Notification) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        *self.inner.content.read() == *other.inner.content.read()
    }

    pub(crate) fn set_observer(&self, view: Weak<dyn NotificationView>) {
        *self.inner.observer.write() = Some(view);
    }

    pub(crate) fn clear_observer(&self) {
        *self.inner.observer.write() = None;
    }
}

impl PartialEq for Notification {
    fn eq(&self, other: &Self) -> bool {
        self.has_same_content(other)
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("content", &*self.inner.content.read())
            .field("style", &self.inner.style)
            .field("has_action", &self.inner.action.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_height_values() {
        assert_eq!(NotificationHeight::StatusBar.value(), 20.0);
        assert_eq!(NotificationHeight::NavigationBar.value(), 64.0);
        assert_eq!(NotificationHeight::Custom(42.0).value(), 42.0);
    }

    #[test]
    fn test_equality_ignores_style_and_action() {
        let plain = Notification::new(NotificationContent::new("Saved"));
        let styled = Notification::with_style(
            NotificationContent::new("Saved"),
            NotificationStyle {
                height: NotificationHeight::StatusBar,
                interactive: false,
                ..Default::default()
            },
            Some(Arc::new(CallbackAction::new(|| {}))),
        );
        assert_eq!(plain, styled);

        let other = Notification::new(NotificationContent::new("Saved").with_subtitle("2 files"));
        assert_ne!(plain, other);
    }

    #[test]
    fn test_update_replaces_content_on_all_clones() {
        let notification = Notification::new(NotificationContent::new("Uploading"));
        let clone = notification.clone();
        notification.update(NotificationContent::new("Uploaded"));
        assert_eq!(clone.content().title, "Uploaded");
    }

    #[test]
    fn test_callback_action_executes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let action = CallbackAction::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        action.execute();
        action.execute();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_style_deserializes_with_defaults() {
        let style: NotificationStyle =
            serde_json::from_str(r#"{"height":"status_bar","interactive":false}"#).unwrap();
        assert_eq!(style.height, NotificationHeight::StatusBar);
        assert!(!style.interactive);
        assert_eq!(style.font_size, 13.0);
    }
}
