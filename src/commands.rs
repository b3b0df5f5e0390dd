// ─── Commands ───
// The operations the presentation layer calls. Each takes the shared state,
// locks it only for as long as it touches the stores, and never holds the
// lock across a launch or a network request.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::launch::{LaunchOutcome, SessionEnd, SessionState};
use crate::core::maintenance::{self, CleanupReport};
use crate::core::profile::{LoaderType, Profile, ProfileDraft, SkinSelection};
use crate::core::settings::LauncherSettings;
use crate::core::state::{AppState, SharedState};
use crate::core::version::{VersionEntry, VersionManifest};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileListResponse {
    pub profiles: Vec<Profile>,
    pub selected_index: usize,
}

/// Fields of the add/edit profile dialog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub username: String,
    pub version: String,
    #[serde(default)]
    pub loader_type: LoaderType,
    /// A newly picked skin file, copied into the skin store on save.
    #[serde(default)]
    pub skin_file: Option<PathBuf>,
    #[serde(default)]
    pub clear_skin: bool,
}

impl ProfilePayload {
    fn into_draft(self) -> ProfileDraft {
        let skin = match (self.skin_file, self.clear_skin) {
            (Some(file), _) => SkinSelection::Replace(file),
            (None, true) => SkinSelection::Clear,
            (None, false) => SkinSelection::Keep,
        };
        ProfileDraft::new(self.username, self.version)
            .with_loader(self.loader_type)
            .with_skin(skin)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub processed: bool,
    pub removed: Vec<PathBuf>,
    pub failed: Vec<String>,
}

impl From<CleanupReport> for CleanupResponse {
    fn from(report: CleanupReport) -> Self {
        Self {
            processed: report.processed,
            removed: report.removed,
            failed: report
                .failures
                .into_iter()
                .map(|f| format!("{}: {}", f.path.display(), f.error))
                .collect(),
        }
    }
}

// ── Profiles ────────────────────────────────────────

pub async fn list_profiles(state: &SharedState) -> LauncherResult<ProfileListResponse> {
    let state = state.lock().await;
    Ok(ProfileListResponse {
        profiles: state.profiles.list().to_vec(),
        selected_index: state.profiles.selected_index(),
    })
}

pub async fn add_profile(
    state: &SharedState,
    payload: ProfilePayload,
) -> LauncherResult<ProfileListResponse> {
    {
        let mut state = state.lock().await;
        state.profiles.add(payload.into_draft())?;
    }
    list_profiles(state).await
}

pub async fn update_profile(
    state: &SharedState,
    index: usize,
    payload: ProfilePayload,
) -> LauncherResult<Profile> {
    let mut state = state.lock().await;
    let profile = state.profiles.update(index, payload.into_draft())?;
    Ok(profile.clone())
}

pub async fn remove_profile(
    state: &SharedState,
    index: usize,
) -> LauncherResult<ProfileListResponse> {
    {
        let mut state = state.lock().await;
        if state.profiles.remove(index)?.is_none() {
            warn!("remove_profile: no profile at index {}", index);
        }
    }
    list_profiles(state).await
}

pub async fn select_profile(state: &SharedState, index: usize) -> LauncherResult<()> {
    let mut state = state.lock().await;
    state.profiles.select(index)
}

// ── Settings ────────────────────────────────────────

pub async fn get_launcher_settings(state: &SharedState) -> LauncherResult<LauncherSettings> {
    let state = state.lock().await;
    Ok(state.launcher_settings.clone())
}

pub async fn update_launcher_settings(
    state: &SharedState,
    settings: LauncherSettings,
) -> LauncherResult<LauncherSettings> {
    let mut state = state.lock().await;
    state.apply_settings(settings)?;
    Ok(state.launcher_settings.clone())
}

/// Release versions from the Mojang manifest, newest first.
pub async fn list_release_versions(state: &SharedState) -> LauncherResult<Vec<VersionEntry>> {
    let client = state.lock().await.http_client.clone();
    let manifest = VersionManifest::fetch(&client).await?;
    Ok(manifest.releases().into_iter().cloned().collect())
}

// ── Session ─────────────────────────────────────────

/// Launch the selected profile. `replace_running` is the user's answer to
/// "a game is already running, start another?". Follow a `Running` outcome
/// with [`watch_session`].
pub async fn launch_selected_profile(
    state: &SharedState,
    replace_running: bool,
) -> LauncherResult<LaunchOutcome> {
    let (orchestrator, request) = {
        let state = state.lock().await;
        (
            state.orchestrator.clone(),
            state.launch_request(replace_running),
        )
    };
    orchestrator.launch(request).await
}

/// Wait for the running game to end. `None` when nothing is running.
///
/// Call this right after a launch reaches `Running` and keep it pending:
/// until it is polled, game output accumulates and an exit goes unnoticed.
pub async fn watch_session(state: &SharedState) -> Option<SessionEnd> {
    let orchestrator = state.lock().await.orchestrator.clone();
    orchestrator.supervise().await
}

pub async fn force_close(state: &SharedState) -> LauncherResult<()> {
    let orchestrator = state.lock().await.orchestrator.clone();
    if orchestrator.force_close() {
        Ok(())
    } else {
        Err(LauncherError::Other("No game is running".into()))
    }
}

pub async fn session_state(state: &SharedState) -> SessionState {
    state.lock().await.orchestrator.state()
}

/// Startup hook: launch the selected profile when auto-launch is on.
///
/// Returns `Ok(None)` when auto-launch is off or there is nothing to launch.
pub async fn auto_launch_if_enabled(state: &SharedState) -> LauncherResult<Option<LaunchOutcome>> {
    let (orchestrator, request) = {
        let state = state.lock().await;
        if !state.launcher_settings.launch.auto_launch {
            return Ok(None);
        }
        let request = state.launch_request(false);
        if !request.profile.as_ref().is_some_and(Profile::is_launchable) {
            info!("Auto-launch is on but no launchable profile is selected");
            return Ok(None);
        }
        (state.orchestrator.clone(), request)
    };

    info!("Auto-launching selected profile");
    orchestrator.launch(request).await.map(Some)
}

// ── Maintenance ─────────────────────────────────────
// The game directory is only touched while no session owns it.

fn idle_game_dir(state: &AppState) -> LauncherResult<PathBuf> {
    let session = state.orchestrator.state();
    if !session.is_active() {
        return Ok(state.launcher_settings.game_dir().to_path_buf());
    }
    if session == SessionState::Running {
        Err(LauncherError::SessionRunning)
    } else {
        Err(LauncherError::LaunchInProgress)
    }
}

pub async fn clear_temp(state: &SharedState) -> LauncherResult<CleanupResponse> {
    let state = state.lock().await;
    let game_dir = idle_game_dir(&state)?;
    Ok(maintenance::clear_temp(&game_dir).into())
}

/// Wipe downloaded game files. Irreversible; the UI confirms first.
pub async fn reset_installation(state: &SharedState) -> LauncherResult<CleanupResponse> {
    let state = state.lock().await;
    let game_dir = idle_game_dir(&state)?;

    warn!("Resetting installation at {:?}", game_dir);
    Ok(maintenance::reset_installation(&game_dir).into())
}

pub async fn clear_cache(state: &SharedState) -> LauncherResult<CleanupResponse> {
    let state = state.lock().await;
    Ok(maintenance::clear_cache(&state.cache_dir()).into())
}
