// ─── Skin Assets ───
// Copies user-picked skin images into the launcher's own directory and
// deletes them again when the owning profile lets go of them.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{LauncherError, LauncherResult};

const SKIN_EXTENSION: &str = "png";

/// Owner of every image under its directory. Profiles only hold paths into it.
#[derive(Debug, Clone)]
pub struct SkinStore {
    dir: PathBuf,
}

impl SkinStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> LauncherResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| LauncherError::io(&self.dir, e))
    }

    /// Whether `path` lives directly inside the managed directory.
    pub fn owns(&self, path: &Path) -> bool {
        path.parent() == Some(self.dir.as_path())
    }

    /// Copy `source` into the store under a name derived from `owner_key`.
    pub fn store(&self, source: &Path, owner_key: &str) -> LauncherResult<PathBuf> {
        self.ensure_dir()?;

        let destination = self.unique_destination(owner_key);
        std::fs::copy(source, &destination).map_err(|e| LauncherError::io(source, e))?;

        info!("Stored skin {:?} as {:?}", source, destination);
        Ok(destination)
    }

    /// Delete a stored skin. Missing files and foreign paths are not errors.
    ///
    /// Returns `true` only if a file was actually removed.
    pub fn release(&self, asset: &Path) -> bool {
        if !self.owns(asset) {
            warn!("Refusing to delete skin outside {:?}: {:?}", self.dir, asset);
            return false;
        }

        match std::fs::remove_file(asset) {
            Ok(()) => {
                info!("Released skin {:?}", asset);
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Skin {:?} already gone", asset);
                false
            }
            Err(e) => {
                warn!("Cannot delete skin {:?}: {}", asset, e);
                false
            }
        }
    }

    fn unique_destination(&self, owner_key: &str) -> PathBuf {
        let token = Uuid::new_v4().simple().to_string();
        let stem = format!(
            "{}_{}_{}",
            file_safe(owner_key),
            Utc::now().timestamp_millis(),
            &token[..8]
        );

        let mut candidate = self.dir.join(format!("{stem}.{SKIN_EXTENSION}"));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.dir.join(format!("{stem}-{n}.{SKIN_EXTENSION}"));
            n += 1;
        }
        candidate
    }
}

fn file_safe(owner_key: &str) -> String {
    let cleaned: String = owner_key
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "skin".into()
    } else {
        cleaned
    }
}
