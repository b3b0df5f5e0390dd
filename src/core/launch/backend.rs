// ─── Launch Backend ───
// The download/install/spawn machinery lives behind this trait. The
// orchestrator hands it a fully resolved option set and an event sink,
// and gets back a handle to the spawned game process.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::auth::OfflineAccount;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::loaders::LoaderSpec;
use crate::core::profile::Profile;
use crate::core::settings::{GameSettings, MemoryLimits};

pub const LAUNCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Events a backend reports while installing and running the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Generic task progress; `kind` is e.g. `assets`, `classes`, `natives`.
    Progress { kind: String, task: u64, total: u64 },
    Download {
        name: Option<String>,
        current: u64,
        total: u64,
    },
    Extract { current: u64, total: u64 },
    Debug(String),
    /// A line of game output.
    Data(String),
    Arguments(Vec<String>),
    Close(Option<i32>),
    Error(String),
}

/// Per-session event channel. A fresh one is created for every launch.
pub type EventSink = mpsc::UnboundedSender<BackendEvent>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSpec {
    pub number: String,
    #[serde(rename = "type")]
    pub release_type: String,
}

/// Option set handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    pub authorization: OfflineAccount,
    pub root: PathBuf,
    pub version: VersionSpec,
    pub memory: MemoryLimits,
    pub java_path: Option<PathBuf>,
    pub loader: LoaderSpec,
    pub detached: bool,
    pub game_directory: PathBuf,
    pub versions_directory: PathBuf,
    pub assets_directory: PathBuf,
    pub timeout_ms: u64,
}

impl LaunchOptions {
    pub fn build(profile: &Profile, game: &GameSettings, loader: LoaderSpec) -> Self {
        Self {
            authorization: OfflineAccount::new(&profile.username),
            root: game.game_dir.clone(),
            version: VersionSpec {
                number: profile.version.clone(),
                release_type: "release".into(),
            },
            memory: game.memory.clone(),
            java_path: game.java_override(),
            loader,
            detached: true,
            game_directory: game.game_dir.clone(),
            versions_directory: game.versions_dir(),
            assets_directory: game.assets_dir(),
            timeout_ms: LAUNCH_TIMEOUT.as_millis() as u64,
        }
    }
}

/// Handle to the spawned game. Exclusively owned by the orchestrator while running.
pub trait GameProcess: Send {
    fn pid(&self) -> Option<u32>;

    /// Ask the process to stop. Does not wait for it to exit.
    fn kill(&mut self) -> LauncherResult<()>;
}

impl GameProcess for tokio::process::Child {
    fn pid(&self) -> Option<u32> {
        self.id()
    }

    fn kill(&mut self) -> LauncherResult<()> {
        self.start_kill()
            .map_err(|e| LauncherError::Other(format!("Cannot kill game process: {e}")))
    }
}

#[async_trait]
pub trait LaunchBackend: Send + Sync {
    /// Install whatever is missing and start the game.
    ///
    /// Progress and, later, `Close`/`Error` are reported through `events`.
    async fn launch(
        &self,
        options: LaunchOptions,
        events: EventSink,
    ) -> LauncherResult<Box<dyn GameProcess>>;
}
