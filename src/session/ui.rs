// src/session/ui.rs

use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

use crate::common::ui::{Notice, UiSink};

#[derive(Debug, Default)]
struct UiState {
    dialog_visible: bool,
    notices: Vec<Notice>,
    navigate_to: Option<String>,
}

/// What the browser should render or do next
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSnapshot {
    pub dialog_visible: bool,
    pub notices: Vec<Notice>,
    pub navigate_to: Option<String>,
}

/// Buffers view effects until the browser polls for them
#[derive(Debug, Default)]
pub struct SessionUi {
    state: Mutex<UiState>,
}

impl SessionUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, UiState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Hand over pending notices and navigation; dialog visibility persists
    pub fn drain(&self) -> UiSnapshot {
        let mut state = self.lock();
        UiSnapshot {
            dialog_visible: state.dialog_visible,
            notices: std::mem::take(&mut state.notices),
            navigate_to: state.navigate_to.take(),
        }
    }
}

impl UiSink for SessionUi {
    fn set_dialog_visible(&self, visible: bool) {
        self.lock().dialog_visible = visible;
    }

    fn notify(&self, notice: Notice) {
        self.lock().notices.push(notice);
    }

    fn navigate(&self, path: &str) {
        self.lock().navigate_to = Some(path.to_string());
    }
}
