// ─── Launch Orchestrator ───
// Runs at most one launch session: validates the request, cleans the game
// directory, drives the backend, and turns its events into signals for the
// presentation layer.
//
//   Idle → Preparing → Launching → Running → Closed → Idle
//                 ↘          ↘          ↘
//                   Failed ──────────────→ Idle

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tracing::{debug, error, info, warn};

use super::backend::{BackendEvent, GameProcess, LaunchBackend, LaunchOptions, LAUNCH_TIMEOUT};
use super::session::{
    progress_percent, LauncherSignal, ProgressUpdate, SessionEnd, SessionId, SessionState,
    WindowRequest,
};
use crate::core::error::{LauncherError, LauncherResult, ValidationError};
use crate::core::loaders;
use crate::core::maintenance::{self, CleanupReport};
use crate::core::profile::Profile;
use crate::core::settings::{GameSettings, LauncherSettings};

type EventReceiver = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<BackendEvent>>>;

/// One launch attempt as requested by the user.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// The selected profile, if any.
    pub profile: Option<Profile>,
    /// Size of the profile list the selection came from.
    pub profile_count: usize,
    pub settings: LauncherSettings,
    /// The user confirmed that a running game may be killed.
    pub replace_running: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Running { session: SessionId, pid: Option<u32> },
    /// The game exited before the backend handed over its process.
    Exited { session: SessionId, code: Option<i32> },
}

struct ActiveSession {
    id: SessionId,
    profile: Profile,
    process: Option<Box<dyn GameProcess>>,
    events: Option<EventReceiver>,
    /// Signalled when the session is torn down by someone other than `supervise`.
    ended: Arc<Notify>,
}

#[derive(Default)]
struct Inner {
    state: SessionState,
    session: Option<ActiveSession>,
}

enum EventOutcome {
    Continue,
    Closed(Option<i32>),
    Failed(String),
}

enum Acquired {
    Process(Box<dyn GameProcess>),
    Exited(Option<i32>),
}

pub struct LaunchOrchestrator {
    backend: Arc<dyn LaunchBackend>,
    signals: mpsc::UnboundedSender<LauncherSignal>,
    inner: Mutex<Inner>,
    next_session: AtomicU64,
    launch_timeout: Duration,
}

impl LaunchOrchestrator {
    pub fn new(
        backend: Arc<dyn LaunchBackend>,
    ) -> (Self, mpsc::UnboundedReceiver<LauncherSignal>) {
        let (signals, receiver) = mpsc::unbounded_channel();
        let orchestrator = Self {
            backend,
            signals,
            inner: Mutex::new(Inner::default()),
            next_session: AtomicU64::new(1),
            launch_timeout: LAUNCH_TIMEOUT,
        };
        (orchestrator, receiver)
    }

    /// Upper bound on the backend's launch call.
    pub fn with_launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Profile the current session was started with.
    pub fn session_profile(&self) -> Option<Profile> {
        self.lock().session.as_ref().map(|s| s.profile.clone())
    }

    pub fn running_pid(&self) -> Option<u32> {
        let inner = self.lock();
        inner.session.as_ref()?.process.as_ref()?.pid()
    }

    /// Start a session. Returns once the game process is up (or failed to come up).
    ///
    /// After `Running` the session's events are only read by [`supervise`]:
    /// the caller must keep a `supervise` call going for the whole session,
    /// otherwise game output piles up in the channel and the session stays
    /// `Running` after the game has exited.
    ///
    /// [`supervise`]: LaunchOrchestrator::supervise
    pub async fn launch(&self, request: LaunchRequest) -> LauncherResult<LaunchOutcome> {
        let (id, profile) = self.begin(
            request.profile,
            request.profile_count,
            request.replace_running,
        )?;

        let mut pending = PendingLaunch {
            orchestrator: self,
            id,
            armed: true,
        };
        let result = self.run(id, &profile, &request.settings).await;
        pending.armed = false;

        match result {
            Ok(Acquired::Process(process)) => {
                Ok(self.enter_running(id, process, &request.settings))
            }
            Ok(Acquired::Exited(code)) => {
                info!("Game exited during launch of {} (code {:?})", id, code);
                self.finish(id, SessionEnd::Closed { code });
                Ok(LaunchOutcome::Exited { session: id, code })
            }
            Err(err) => {
                error!("Launch of {} failed: {}", id, err);
                self.finish(
                    id,
                    SessionEnd::Failed {
                        message: err.to_string(),
                    },
                );
                Err(err)
            }
        }
    }

    /// Follow the running session until the game closes or errors.
    ///
    /// Returns `None` when nothing is running. Safe to drop and call again.
    /// This is the only consumer of a running session's events; see `launch`.
    pub async fn supervise(&self) -> Option<SessionEnd> {
        let (id, events, ended) = {
            let inner = self.lock();
            if inner.state != SessionState::Running {
                return None;
            }
            let session = inner.session.as_ref()?;
            (session.id, session.events.clone()?, session.ended.clone())
        };

        let mut events = events.lock().await;
        let end = loop {
            let event = tokio::select! {
                _ = ended.notified() => return Some(SessionEnd::Killed),
                event = events.recv() => event,
            };
            let Some(event) = event else {
                warn!("Backend dropped the event channel of {}", id);
                break SessionEnd::Closed { code: None };
            };
            match self.translate(event) {
                EventOutcome::Continue => {}
                EventOutcome::Closed(code) => break SessionEnd::Closed { code },
                EventOutcome::Failed(message) => break SessionEnd::Failed { message },
            }
        };

        if self.finish(id, end.clone()) {
            Some(end)
        } else {
            None
        }
    }

    /// Kill the running game, if any. Kill failures are logged, not returned.
    pub fn force_close(&self) -> bool {
        let mut inner = self.lock();
        if inner.state != SessionState::Running {
            return false;
        }
        self.end_running(&mut inner);
        true
    }

    // ── Session steps ───────────────────────────────────

    fn begin(
        &self,
        profile: Option<Profile>,
        profile_count: usize,
        replace_running: bool,
    ) -> LauncherResult<(SessionId, Profile)> {
        let mut inner = self.lock();

        if inner.state.is_active() {
            if inner.state != SessionState::Running {
                return Err(LauncherError::LaunchInProgress);
            }
            if !replace_running {
                return Err(LauncherError::SessionRunning);
            }
        }

        let profile = validate(profile, profile_count)?;

        if inner.state == SessionState::Running {
            info!("Replacing running session at the user's request");
            self.end_running(&mut inner);
        }

        let id = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
        inner.session = Some(ActiveSession {
            id,
            profile: profile.clone(),
            process: None,
            events: None,
            ended: Arc::new(Notify::new()),
        });
        self.transition(&mut inner, SessionState::Preparing);

        info!(
            "Starting {} for {} ({} {})",
            id, profile.username, profile.loader_type, profile.version
        );
        Ok((id, profile))
    }

    async fn run(
        &self,
        id: SessionId,
        profile: &Profile,
        settings: &LauncherSettings,
    ) -> LauncherResult<Acquired> {
        self.emit(LauncherSignal::Progress(ProgressUpdate::new(
            "Preparing launch...",
            0,
        )));

        let resolved = loaders::resolve(profile);
        if let Some(forge) = resolved.forge.as_ref().filter(|f| f.is_fallback()) {
            self.emit(LauncherSignal::ForgeFallback {
                requested: profile.version.clone(),
                build: forge.build().to_string(),
            });
        }

        let report = prepare_game_dir(settings.game(), &profile.version);
        if !report.is_clean() {
            warn!(
                "Pre-launch cleanup left {} entries behind, launching anyway",
                report.failures.len()
            );
        }

        let options = LaunchOptions::build(profile, settings.game(), resolved.spec);
        match serde_json::to_string_pretty(&options) {
            Ok(json) => debug!("Launching {} with options: {}", id, json),
            Err(e) => debug!("Launching {} (options not printable: {})", id, e),
        }

        // Fresh channel per session: nothing from an earlier attempt can reach it.
        let (sink, events) = mpsc::unbounded_channel();
        let events: EventReceiver = Arc::new(tokio::sync::Mutex::new(events));
        {
            let mut inner = self.lock();
            if let Some(session) = inner.session.as_mut().filter(|s| s.id == id) {
                session.events = Some(events.clone());
            }
            self.transition(&mut inner, SessionState::Launching);
        }

        let mut events = events.lock().await;
        let launch = self.backend.launch(options, sink);
        tokio::pin!(launch);

        let drive = async {
            loop {
                tokio::select! {
                    biased;
                    Some(event) = events.recv() => {
                        if let Some(done) = self.launch_phase_step(event) {
                            return done;
                        }
                    }
                    result = &mut launch => {
                        // events sent before the backend returned still belong to this phase
                        while let Ok(event) = events.try_recv() {
                            if let Some(done) = self.launch_phase_step(event) {
                                return done;
                            }
                        }
                        return result.map(Acquired::Process);
                    }
                }
            }
        };

        match tokio::time::timeout(self.launch_timeout, drive).await {
            Ok(result) => result,
            Err(_) => Err(LauncherError::LaunchTimeout(self.launch_timeout)),
        }
    }

    fn enter_running(
        &self,
        id: SessionId,
        process: Box<dyn GameProcess>,
        settings: &LauncherSettings,
    ) -> LaunchOutcome {
        let pid = process.pid();
        {
            let mut inner = self.lock();
            if let Some(session) = inner.session.as_mut().filter(|s| s.id == id) {
                session.process = Some(process);
            }
            self.transition(&mut inner, SessionState::Running);
        }

        info!("{} running (pid {:?})", id, pid);
        self.emit(LauncherSignal::Progress(ProgressUpdate::new(
            "Minecraft launched successfully!",
            100,
        )));

        // read once, at the moment the game comes up
        if settings.launch.minimize_on_launch {
            self.emit(LauncherSignal::Window(WindowRequest::Minimize));
        }
        if settings.launch.close_on_launch {
            self.emit(LauncherSignal::Window(WindowRequest::Close));
        }

        LaunchOutcome::Running { session: id, pid }
    }

    /// Tear down session `id` and return to `Idle`. Stale ids are ignored.
    fn finish(&self, id: SessionId, end: SessionEnd) -> bool {
        let mut inner = self.lock();
        if inner.session.as_ref().map(|s| s.id) != Some(id) {
            debug!("Ignoring end of superseded {}", id);
            return false;
        }
        self.teardown(&mut inner, end);
        true
    }

    fn end_running(&self, inner: &mut Inner) {
        let Some(session) = inner.session.as_mut() else {
            return;
        };

        if let Some(process) = session.process.as_mut() {
            match process.kill() {
                Ok(()) => info!("Sent kill to {} (pid {:?})", session.id, process.pid()),
                Err(e) => warn!("Could not kill {}: {}", session.id, e),
            }
        }
        session.ended.notify_one();
        self.teardown(inner, SessionEnd::Killed);
    }

    /// Drop the session (and with it the process handle and event channel).
    fn teardown(&self, inner: &mut Inner, end: SessionEnd) {
        let Some(session) = inner.session.take() else {
            return;
        };
        let id = session.id;
        drop(session);

        self.emit(LauncherSignal::ProgressHidden);
        match end {
            SessionEnd::Closed { code } => {
                info!("{} closed with code {:?}", id, code);
                self.transition(inner, SessionState::Closed);
            }
            SessionEnd::Killed => {
                info!("{} killed", id);
                self.transition(inner, SessionState::Closed);
            }
            SessionEnd::Failed { message } => {
                self.emit(LauncherSignal::Error(message));
                self.transition(inner, SessionState::Failed);
            }
        }
        self.transition(inner, SessionState::Idle);
    }

    fn launch_phase_step(&self, event: BackendEvent) -> Option<LauncherResult<Acquired>> {
        match self.translate(event) {
            EventOutcome::Continue => None,
            EventOutcome::Closed(code) => Some(Ok(Acquired::Exited(code))),
            EventOutcome::Failed(message) => Some(Err(LauncherError::LaunchFailed(message))),
        }
    }

    fn translate(&self, event: BackendEvent) -> EventOutcome {
        let update = match event {
            BackendEvent::Progress { kind, task, total } => {
                let status = if kind == "assets" {
                    "Downloading assets...".to_string()
                } else {
                    "Downloading files...".to_string()
                };
                ProgressUpdate::new(status, progress_percent(task, total))
            }
            BackendEvent::Download {
                name,
                current,
                total,
            } => ProgressUpdate::new(
                format!("Downloading: {}", name.as_deref().unwrap_or("game files")),
                progress_percent(current, total),
            ),
            BackendEvent::Extract { current, total } => {
                ProgressUpdate::new("Extracting files...", progress_percent(current, total))
            }
            BackendEvent::Debug(line) => {
                debug!("[backend] {}", line);
                return EventOutcome::Continue;
            }
            BackendEvent::Data(line) => {
                debug!("[game] {}", line);
                return EventOutcome::Continue;
            }
            BackendEvent::Arguments(args) => {
                debug!("Launch arguments: {:?}", args);
                return EventOutcome::Continue;
            }
            BackendEvent::Close(code) => return EventOutcome::Closed(code),
            BackendEvent::Error(message) => return EventOutcome::Failed(message),
        };

        self.emit(LauncherSignal::Progress(update));
        EventOutcome::Continue
    }

    fn transition(&self, inner: &mut Inner, state: SessionState) {
        debug!("Session state {:?} -> {:?}", inner.state, state);
        inner.state = state;
        self.emit(LauncherSignal::StateChanged(state));
    }

    fn emit(&self, signal: LauncherSignal) {
        if self.signals.send(signal).is_err() {
            debug!("No listener for launcher signals");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Returns the orchestrator to `Idle` if a launch future is dropped midway.
struct PendingLaunch<'a> {
    orchestrator: &'a LaunchOrchestrator,
    id: SessionId,
    armed: bool,
}

impl Drop for PendingLaunch<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Launch of {} was abandoned", self.id);
            self.orchestrator.finish(
                self.id,
                SessionEnd::Failed {
                    message: "Launch was cancelled".into(),
                },
            );
        }
    }
}

fn validate(profile: Option<Profile>, profile_count: usize) -> Result<Profile, ValidationError> {
    if profile_count == 0 {
        return Err(ValidationError::NoProfiles);
    }
    let profile = profile.ok_or(ValidationError::NoProfileSelected)?;
    if profile.version.trim().is_empty() {
        return Err(ValidationError::EmptyVersion);
    }
    if profile.username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    Ok(profile)
}

/// Best-effort cleanup before handing the game directory to the backend.
fn prepare_game_dir(game: &GameSettings, version: &str) -> CleanupReport {
    if let Err(e) = maintenance::ensure_mods_dir(&game.game_dir) {
        warn!("Cannot create mods directory: {}", e);
    }

    let mut report = maintenance::clear_temp(&game.game_dir);
    report.merge(maintenance::clear_natives(&game.game_dir, version));
    report
}
