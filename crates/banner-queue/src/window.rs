//! Presentation windows.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::view::NotificationView;

/// Z-level a notification window is placed at while presenting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowLevel {
    Normal,
    /// Above the status bar.
    #[default]
    StatusBar,
    Alert,
    Custom(i32),
}

impl WindowLevel {
    pub fn value(self) -> i32 {
        match self {
            Self::Normal => 0,
            Self::StatusBar => 1000,
            Self::Alert => 2000,
            Self::Custom(level) => level,
        }
    }

    /// Just behind the application's key window; used when idle.
    pub fn behind_normal() -> Self {
        Self::Custom(Self::Normal.value() - 1)
    }
}

/// The window notifications are presented in.
///
/// Implemented by the embedding UI layer.
pub trait NotificationWindow: Send + Sync {
    fn set_level(&self, level: WindowLevel);

    fn set_hidden(&self, hidden: bool);

    /// Install the view as the window's only content.
    fn attach(&self, view: Arc<dyn NotificationView>);

    fn detach(&self);
}

struct WindowState {
    level: WindowLevel,
    hidden: bool,
    view: Option<Arc<dyn NotificationView>>,
}

/// A window without any rendering which only records its state.
pub struct HeadlessWindow {
    state: Mutex<WindowState>,
}

impl HeadlessWindow {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WindowState {
                level: WindowLevel::behind_normal(),
                hidden: true,
                view: None,
            }),
        }
    }

    pub fn level(&self) -> WindowLevel {
        self.state.lock().level
    }

    pub fn is_hidden(&self) -> bool {
        self.state.lock().hidden
    }

    pub fn attached_view(&self) -> Option<Arc<dyn NotificationView>> {
        self.state.lock().view.clone()
    }
}

impl Default for HeadlessWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationWindow for HeadlessWindow {
    fn set_level(&self, level: WindowLevel) {
        self.state.lock().level = level;
    }

    fn set_hidden(&self, hidden: bool) {
        self.state.lock().hidden = hidden;
    }

    fn attach(&self, view: Arc<dyn NotificationView>) {
        self.state.lock().view = Some(view);
    }

    fn detach(&self) {
        self.state.lock().view = None;
    }
}
