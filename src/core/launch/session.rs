use std::time::Duration;

use serde::Serialize;
use tracing::warn;

/// How long a finished progress bar stays on screen.
pub const PROGRESS_DISMISS_DELAY: Duration = Duration::from_secs(1);

/// Lifecycle of the single launch session.
///
/// `Closed` and `Failed` are only passed through on the way back to `Idle`.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Preparing,
    Launching,
    Running,
    Closed,
    Failed,
}

impl SessionState {
    /// A session currently owns the game directory.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            SessionState::Preparing | SessionState::Launching | SessionState::Running
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    pub status: String,
    pub percent: u8,
    /// Set once the bar is full: hide it after this delay rather than at once.
    pub dismiss_after: Option<Duration>,
}

impl ProgressUpdate {
    pub fn new(status: impl Into<String>, percent: u8) -> Self {
        Self {
            status: status.into(),
            percent,
            dismiss_after: (percent >= 100).then_some(PROGRESS_DISMISS_DELAY),
        }
    }
}

/// Requests for the window, honoured by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowRequest {
    Minimize,
    Close,
}

/// Everything the orchestrator tells the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum LauncherSignal {
    StateChanged(SessionState),
    Progress(ProgressUpdate),
    ProgressHidden,
    /// User-visible failure message.
    Error(String),
    Window(WindowRequest),
    ForgeFallback { requested: String, build: String },
}

/// How a session that reached the backend ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SessionEnd {
    Closed { code: Option<i32> },
    Failed { message: String },
    Killed,
}

/// `round(current / total * 100)`, capped at 100. A zero total reads as 0%.
pub fn progress_percent(current: u64, total: u64) -> u8 {
    if total == 0 {
        warn!("Progress event with zero total (current={current}), reporting 0%");
        return 0;
    }
    let percent = (current as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}
