pub mod backend;
pub mod orchestrator;
pub mod session;

pub use backend::{BackendEvent, EventSink, GameProcess, LaunchBackend, LaunchOptions};
pub use orchestrator::{LaunchOrchestrator, LaunchOutcome, LaunchRequest};
pub use session::{
    progress_percent, LauncherSignal, ProgressUpdate, SessionEnd, SessionId, SessionState,
    WindowRequest,
};
