use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;
use crate::core::launch::{LaunchBackend, LaunchOrchestrator, LaunchRequest, LauncherSignal};
use crate::core::maintenance;
use crate::core::profile::ProfileStore;
use crate::core::settings::{LauncherSettings, SettingsStore};
use crate::core::skin::SkinStore;

const APP_DIR_NAME: &str = "NovaLauncher";
const DATA_DIR_ENV: &str = "NOVA_LAUNCHER_DATA_DIR";
const SETTINGS_FILE: &str = "launcher_settings.json";
const PROFILES_FILE: &str = "profiles.json";

/// Everything the launcher owns, created once by `load` and handed around by reference.
pub struct AppState {
    pub data_dir: PathBuf,
    pub settings_store: SettingsStore,
    pub launcher_settings: LauncherSettings,
    pub profiles: ProfileStore,
    pub orchestrator: Arc<LaunchOrchestrator>,
    pub http_client: Client,
    signals: Option<mpsc::UnboundedReceiver<LauncherSignal>>,
}

impl AppState {
    /// Read persisted state from `data_dir` and make sure the working directories exist.
    pub fn load(data_dir: PathBuf, backend: Arc<dyn LaunchBackend>) -> LauncherResult<Self> {
        std::fs::create_dir_all(&data_dir).map_err(|e| LauncherError::io(&data_dir, e))?;

        let settings_store =
            SettingsStore::new(data_dir.join(SETTINGS_FILE), data_dir.join("minecraft"));
        let launcher_settings = settings_store.load();

        let skins = SkinStore::new(data_dir.join("skins"));
        skins.ensure_dir()?;
        let profiles = ProfileStore::load(data_dir.join(PROFILES_FILE), skins);

        if let Err(e) = maintenance::ensure_mods_dir(launcher_settings.game_dir()) {
            warn!("Cannot prepare game directory: {}", e);
        }

        let (orchestrator, signals) = LaunchOrchestrator::new(backend);

        info!(
            "Loaded {} profiles from {:?}, settings from {:?}",
            profiles.len(),
            profiles.path(),
            settings_store.path()
        );

        Ok(Self {
            data_dir,
            settings_store,
            launcher_settings,
            profiles,
            orchestrator: Arc::new(orchestrator),
            http_client: build_http_client()?,
            signals: Some(signals),
        })
    }

    /// Hand the signal stream to the presentation layer. Only the first call gets it.
    pub fn take_signals(&mut self) -> Option<mpsc::UnboundedReceiver<LauncherSignal>> {
        self.signals.take()
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    /// Validate, persist and adopt new launcher settings.
    pub fn apply_settings(&mut self, settings: LauncherSettings) -> LauncherResult<()> {
        let settings = settings.normalized();
        settings.minecraft.memory.validate()?;

        if settings.game_dir() != self.launcher_settings.game_dir() {
            maintenance::ensure_mods_dir(settings.game_dir())?;
            info!("Game directory moved to {:?}", settings.game_dir());
        }

        self.settings_store.save(&settings)?;
        self.launcher_settings = settings;
        Ok(())
    }

    /// Snapshot of what a launch needs right now.
    pub fn launch_request(&self, replace_running: bool) -> LaunchRequest {
        LaunchRequest {
            profile: self.profiles.get_selected().cloned(),
            profile_count: self.profiles.len(),
            settings: self.launcher_settings.clone(),
            replace_running,
        }
    }
}

/// `$NOVA_LAUNCHER_DATA_DIR`, or the platform data directory.
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
