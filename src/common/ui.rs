// src/common/ui.rs
//! Effects the dashboard controllers push towards the browser

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A toast-style message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Receiver of view-level side effects. Implementations must not call back
/// into the controllers that drive them.
pub trait UiSink: Send + Sync {
    fn set_dialog_visible(&self, visible: bool);
    fn notify(&self, notice: Notice);
    fn navigate(&self, path: &str);
}
