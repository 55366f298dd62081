//! The surface the orchestrator draws on. Implemented by the presentation
//! layer (the terminal in `buddy-cli`, a recorder in tests).

use std::time::Duration;

use crate::render::Dashboard;

/// Which of the mutually exclusive result panes is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Empty,
    Loading,
    Results,
}

/// Short-lived message that dismisses itself after `duration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub duration: Duration,
}

impl Notice {
    pub fn new(message: impl Into<String>, duration: Duration) -> Self {
        Self { message: message.into(), duration }
    }
}

pub trait ViewSurface: Send + Sync {
    fn set_visibility(&self, visibility: Visibility);

    fn notice(&self, notice: Notice);

    /// Replace the results pane contents. Does not change visibility.
    fn show_dashboard(&self, dashboard: &Dashboard);
}
