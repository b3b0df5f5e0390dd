// ─── Filesystem Maintenance ───
// Best-effort cleanup of the game directory: temp files, natives, full reset.
// Batch operations never stop at the first failure; they collect what went
// wrong into a `CleanupReport` and keep going.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::error::{LauncherError, LauncherResult};

/// Directories under the game root wiped by a full reset.
const RESET_DIRS: [&str; 4] = ["assets", "libraries", "versions", "tmp"];
/// Launcher files under the game root wiped by a full reset.
const RESET_FILES: [&str; 2] = ["launcher_profiles.json", "launcher_settings.json"];

#[derive(Debug)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub error: LauncherError,
}

/// Outcome of a best-effort batch operation.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// The target existed and was worked on.
    pub processed: bool,
    pub removed: Vec<PathBuf>,
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    /// At least one entry was removed.
    pub fn succeeded(&self) -> bool {
        !self.removed.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, path: PathBuf, result: LauncherResult<()>) {
        match result {
            Ok(()) => self.removed.push(path),
            Err(error) => {
                warn!("Cleanup failed for {:?}: {}", path, error);
                self.failures.push(CleanupFailure { path, error });
            }
        }
    }

    pub fn merge(&mut self, other: CleanupReport) {
        self.processed |= other.processed;
        self.removed.extend(other.removed);
        self.failures.extend(other.failures);
    }
}

/// Remove `path` and everything under it, children before parents.
///
/// A missing path is a no-op. Symlinks are removed, never followed.
pub fn delete_recursive(path: &Path) -> LauncherResult<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(LauncherError::io(path, e)),
    };

    if !metadata.is_dir() {
        return std::fs::remove_file(path).map_err(|e| LauncherError::io(path, e));
    }

    for entry in WalkDir::new(path).follow_links(false).contents_first(true) {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(path).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            LauncherError::io(at, source)
        })?;

        let entry_path = entry.path();
        let removed = if entry.file_type().is_dir() {
            std::fs::remove_dir(entry_path)
        } else {
            std::fs::remove_file(entry_path)
        };
        removed.map_err(|e| LauncherError::io(entry_path, e))?;
    }

    debug!("Deleted {:?}", path);
    Ok(())
}

/// Empty `<game_dir>/tmp`, keeping the directory itself.
pub fn clear_temp(game_dir: &Path) -> CleanupReport {
    clear_temp_with(game_dir, delete_recursive)
}

fn clear_temp_with(game_dir: &Path, delete: impl Fn(&Path) -> LauncherResult<()>) -> CleanupReport {
    let tmp_dir = game_dir.join("tmp");
    let mut report = CleanupReport::default();

    let entries = match std::fs::read_dir(&tmp_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return report,
        Err(e) => {
            report.record(tmp_dir.clone(), Err(LauncherError::io(&tmp_dir, e)));
            return report;
        }
    };

    report.processed = true;
    for entry in entries {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                let result = delete(&path);
                report.record(path, result);
            }
            Err(e) => report.record(tmp_dir.clone(), Err(LauncherError::io(&tmp_dir, e))),
        }
    }

    info!(
        "Cleared {} temp entries in {:?} ({} failed)",
        report.removed.len(),
        tmp_dir,
        report.failures.len()
    );
    report
}

/// Wipe downloaded game files and launcher configs so the next launch reinstalls.
///
/// Irreversible; callers must confirm with the user first.
pub fn reset_installation(game_dir: &Path) -> CleanupReport {
    reset_installation_with(game_dir, delete_recursive)
}

fn reset_installation_with(
    game_dir: &Path,
    delete: impl Fn(&Path) -> LauncherResult<()>,
) -> CleanupReport {
    let mut report = CleanupReport {
        processed: true,
        ..CleanupReport::default()
    };

    let targets = RESET_DIRS.iter().chain(RESET_FILES.iter());
    for name in targets {
        let target = game_dir.join(name);
        if target.symlink_metadata().is_err() {
            continue;
        }
        info!("Removing {:?}", target);
        let result = delete(&target);
        report.record(target, result);
    }

    report
}

/// Remove the extracted natives of `version`, if any.
pub fn clear_natives(game_dir: &Path, version: &str) -> CleanupReport {
    let natives = game_dir.join("versions").join(version).join("natives");
    let mut report = CleanupReport::default();
    if natives.symlink_metadata().is_err() {
        return report;
    }

    debug!("Clearing natives at {:?}", natives);
    report.processed = true;
    let result = delete_recursive(&natives);
    report.record(natives, result);
    report
}

/// Remove the launcher's own cache directory.
pub fn clear_cache(cache_dir: &Path) -> CleanupReport {
    let mut report = CleanupReport::default();
    if !cache_dir.exists() {
        return report;
    }

    report.processed = true;
    let result = delete_recursive(cache_dir);
    report.record(cache_dir.to_path_buf(), result);
    report
}

/// Create `<game_dir>/mods` if it does not exist yet.
pub fn ensure_mods_dir(game_dir: &Path) -> LauncherResult<PathBuf> {
    let mods_dir = game_dir.join("mods");
    std::fs::create_dir_all(&mods_dir).map_err(|e| LauncherError::io(&mods_dir, e))?;
    Ok(mods_dir)
}
