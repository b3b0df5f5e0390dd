use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::model::LauncherSettings;
use crate::core::error::{LauncherError, LauncherResult};

/// Keys of the narrow settings shape that older launchers wrote at top level.
const LEGACY_GAME_KEYS: [&str; 3] = ["memory", "javaPath", "gameDir"];

/// Reads and writes `launcher_settings.json`.
pub struct SettingsStore {
    path: PathBuf,
    default_game_dir: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf, default_game_dir: PathBuf) -> Self {
        Self {
            path,
            default_game_dir,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn defaults(&self) -> LauncherSettings {
        LauncherSettings::with_game_dir(self.default_game_dir.clone())
    }

    /// Persisted values laid over the defaults, field by field.
    pub fn load(&self) -> LauncherSettings {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Cannot read {:?}: {}", self.path, e);
                }
                return self.defaults();
            }
        };

        match self.merge_with_defaults(&raw) {
            Ok(settings) => settings.normalized(),
            Err(e) => {
                warn!("Ignoring unreadable settings at {:?}: {}", self.path, e);
                self.defaults()
            }
        }
    }

    /// Persist the full structure. Creating `<gameDir>/mods` is up to the caller.
    pub fn save(&self, settings: &LauncherSettings) -> LauncherResult<()> {
        let json = serde_json::to_string_pretty(settings)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| LauncherError::io(&self.path, e))?;

        info!("Saved launcher settings to {:?}", self.path);
        Ok(())
    }

    fn merge_with_defaults(&self, raw: &str) -> LauncherResult<LauncherSettings> {
        let mut persisted: Value = serde_json::from_str(raw)?;
        lift_legacy_layout(&mut persisted);

        let mut merged = serde_json::to_value(self.defaults())?;
        let mut whole = merged.clone();
        overlay(&mut whole, persisted.clone());
        if let Ok(settings) = serde_json::from_value(whole) {
            return Ok(settings);
        }

        // Some leaf is unusable: take the persisted leaves one at a time and
        // leave the default in place for each one that does not fit.
        let mut leaves = Vec::new();
        collect_leaves(&persisted, &mut Vec::new(), &mut leaves);
        for (path, value) in leaves {
            let mut candidate = merged.clone();
            set_leaf(&mut candidate, &path, value);
            match serde_json::from_value::<LauncherSettings>(candidate.clone()) {
                Ok(_) => merged = candidate,
                Err(e) => warn!(
                    "Ignoring settings field {} in {:?}: {}",
                    path.join("."),
                    self.path,
                    e
                ),
            }
        }

        Ok(serde_json::from_value(merged)?)
    }
}

/// Every non-object, non-null value in `value` with its key path.
fn collect_leaves(value: &Value, path: &mut Vec<String>, out: &mut Vec<(Vec<String>, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key.clone());
                collect_leaves(child, path, out);
                path.pop();
            }
        }
        Value::Null => {}
        leaf => out.push((path.clone(), leaf.clone())),
    }
}

fn set_leaf(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return;
    };

    let mut node = root;
    for key in parents {
        let Value::Object(map) = node else {
            return;
        };
        node = map
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if let Value::Object(map) = node {
        map.insert(last.clone(), value);
    }
}

/// Move a flat `{memory, javaPath, gameDir}` blob under `minecraft`.
fn lift_legacy_layout(persisted: &mut Value) {
    let Value::Object(root) = persisted else {
        return;
    };
    if root.contains_key("minecraft") {
        return;
    }

    let mut game = Map::new();
    for key in LEGACY_GAME_KEYS {
        if let Some(value) = root.remove(key) {
            game.insert(key.to_string(), value);
        }
    }
    if !game.is_empty() {
        root.insert("minecraft".into(), Value::Object(game));
    }
}

/// Recursively copy `patch` onto `base`. Objects merge key by key; nulls are skipped.
fn overlay(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (slot, value) => *slot = value,
    }
}
