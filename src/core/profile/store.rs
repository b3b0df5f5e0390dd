use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::model::{Profile, ProfileDraft, SkinSelection};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::skin::SkinStore;

/// On-disk shape of `profiles.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfilesFile {
    #[serde(default)]
    profiles: Vec<Profile>,
    #[serde(default)]
    selected_index: usize,
}

/// Ordered profile list plus the selected index, written through on every change.
pub struct ProfileStore {
    path: PathBuf,
    skins: SkinStore,
    profiles: Vec<Profile>,
    selected: usize,
}

impl ProfileStore {
    /// Read `path`, falling back to an empty list if it is missing or corrupt.
    pub fn load(path: PathBuf, skins: SkinStore) -> Self {
        let file = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<ProfilesFile>(&json) {
                Ok(file) => file,
                Err(e) => {
                    warn!("Corrupt profiles file at {:?}: {}", path, e);
                    ProfilesFile::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ProfilesFile::default(),
            Err(e) => {
                warn!("Cannot read {:?}: {}", path, e);
                ProfilesFile::default()
            }
        };

        let mut store = Self {
            path,
            skins,
            profiles: file.profiles,
            selected: file.selected_index,
        };
        store.clamp_selection();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn skins(&self) -> &SkinStore {
        &self.skins
    }

    pub fn list(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn get_selected(&self) -> Option<&Profile> {
        self.profiles.get(self.selected)
    }

    /// Append a profile and make it the selected one. Returns its index.
    pub fn add(&mut self, draft: ProfileDraft) -> LauncherResult<usize> {
        let draft = draft.validate()?;

        let skin_path = match &draft.skin {
            SkinSelection::Replace(source) => self.store_skin(source, &draft.username),
            SkinSelection::Keep | SkinSelection::Clear => None,
        };

        self.profiles.push(Profile {
            username: draft.username,
            version: draft.version,
            loader_type: draft.loader_type,
            skin_path,
            created: Utc::now(),
        });
        self.selected = self.profiles.len() - 1;
        self.save()?;

        info!("Added profile #{}", self.selected);
        Ok(self.selected)
    }

    /// Replace the editable fields of the profile at `index`.
    pub fn update(&mut self, index: usize, draft: ProfileDraft) -> LauncherResult<&Profile> {
        let draft = draft.validate()?;
        if index >= self.profiles.len() {
            return Err(LauncherError::Other(format!("No profile at index {index}")));
        }

        let old_skin = self.profiles[index].skin_path.clone();
        let skin_path = match &draft.skin {
            SkinSelection::Keep => old_skin,
            SkinSelection::Clear => {
                if let Some(old) = &old_skin {
                    self.skins.release(old);
                }
                None
            }
            // copy first: a failed copy keeps the old skin, and the new
            // name can never reuse the path being released
            SkinSelection::Replace(source) => match self.store_skin(source, &draft.username) {
                Some(stored) => {
                    if let Some(old) = &old_skin {
                        self.skins.release(old);
                    }
                    Some(stored)
                }
                None => old_skin,
            },
        };

        let profile = &mut self.profiles[index];
        profile.username = draft.username;
        profile.version = draft.version;
        profile.loader_type = draft.loader_type;
        profile.skin_path = skin_path;
        self.save()?;

        Ok(&self.profiles[index])
    }

    /// Delete the profile at `index` and its skin. Out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> LauncherResult<Option<Profile>> {
        if index >= self.profiles.len() {
            return Ok(None);
        }

        let removed = self.profiles.remove(index);
        if let Some(skin) = &removed.skin_path {
            self.skins.release(skin);
        }

        self.clamp_selection();
        self.save()?;

        info!("Removed profile #{index}");
        Ok(Some(removed))
    }

    pub fn select(&mut self, index: usize) -> LauncherResult<()> {
        if index >= self.profiles.len() {
            return Err(LauncherError::Other(format!("No profile at index {index}")));
        }
        self.selected = index;
        self.save()
    }

    pub fn save(&self) -> LauncherResult<()> {
        let file = ProfilesFile {
            profiles: self.profiles.clone(),
            selected_index: self.selected,
        };
        let json = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| LauncherError::io(&self.path, e))
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.profiles.len() {
            self.selected = self.profiles.len().saturating_sub(1);
        }
    }

    fn store_skin(&self, source: &Path, owner: &str) -> Option<PathBuf> {
        match self.skins.store(source, owner) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skin copy failed, saving profile without skin: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::LoaderType;

    fn store_in(dir: &Path) -> ProfileStore {
        ProfileStore::load(
            dir.join("profiles.json"),
            SkinStore::new(dir.join("skins")),
        )
    }

    fn skin_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"png").unwrap();
        path
    }

    #[test]
    fn removing_selected_last_profile_clamps_selection() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(tmp.path());
        for name in ["A", "B", "C"] {
            store.add(ProfileDraft::new(name, "1.20.4")).unwrap();
        }
        assert_eq!(store.selected_index(), 2);

        let removed = store.remove(2).unwrap().unwrap();
        assert_eq!(removed.username, "C");

        let names: Vec<&str> = store.list().iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(store.selected_index(), 1);
    }

    #[test]
    fn removing_earlier_profile_keeps_selected_index() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(tmp.path());
        for name in ["A", "B", "C"] {
            store.add(ProfileDraft::new(name, "1.20.4")).unwrap();
        }
        store.select(1).unwrap();

        store.remove(0).unwrap();
        assert_eq!(store.selected_index(), 1);
        assert_eq!(store.get_selected().unwrap().username, "C");
    }

    #[test]
    fn remove_out_of_bounds_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(tmp.path());
        store.add(ProfileDraft::new("A", "1.20.4")).unwrap();

        assert!(store.remove(5).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn removing_only_profile_leaves_empty_selection() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(tmp.path());
        store.add(ProfileDraft::new("A", "1.20.4")).unwrap();
        store.remove(0).unwrap();

        assert!(store.is_empty());
        assert_eq!(store.selected_index(), 0);
        assert!(store.get_selected().is_none());
    }

    #[test]
    fn mutations_are_written_through() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let mut store = store_in(tmp.path());
            store
                .add(ProfileDraft::new("A", "1.19.2").with_loader(LoaderType::Forge))
                .unwrap();
            store.add(ProfileDraft::new("B", "1.20.4")).unwrap();
            store.select(0).unwrap();
        }

        let reloaded = store_in(tmp.path());
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.selected_index(), 0);
        assert_eq!(reloaded.get_selected().unwrap().loader_type, LoaderType::Forge);
    }

    #[test]
    fn add_rejects_blank_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(tmp.path());
        let err = store.add(ProfileDraft::new("A", " ")).unwrap_err();
        assert!(matches!(err, LauncherError::Validation(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn skin_follows_profile_edits_and_removal() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(tmp.path());
        let first = skin_file(tmp.path(), "first.png");
        let second = skin_file(tmp.path(), "second.png");

        store
            .add(ProfileDraft::new("A", "1.20.4").with_skin(SkinSelection::Replace(first)))
            .unwrap();
        let original = store.list()[0].skin_path.clone().unwrap();
        assert!(original.exists());

        store
            .update(0, ProfileDraft::new("A", "1.20.4"))
            .unwrap();
        assert_eq!(store.list()[0].skin_path.as_ref(), Some(&original));

        let replaced = store
            .update(
                0,
                ProfileDraft::new("A", "1.20.4").with_skin(SkinSelection::Replace(second)),
            )
            .unwrap()
            .skin_path
            .clone()
            .unwrap();
        assert!(!original.exists());
        assert!(replaced.exists());

        store.remove(0).unwrap();
        assert!(!replaced.exists());
    }

    #[test]
    fn replacing_skin_never_reuses_released_path() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(tmp.path());
        let src = skin_file(tmp.path(), "s.png");
        store
            .add(ProfileDraft::new("A", "1.20.4").with_skin(SkinSelection::Replace(src.clone())))
            .unwrap();

        // back-to-back replaces land within the same millisecond
        for _ in 0..20 {
            let before = store.list()[0].skin_path.clone().unwrap();
            let after = store
                .update(
                    0,
                    ProfileDraft::new("A", "1.20.4").with_skin(SkinSelection::Replace(src.clone())),
                )
                .unwrap()
                .skin_path
                .clone()
                .unwrap();
            assert_ne!(before, after);
            assert!(!before.exists());
            assert!(after.exists());
        }
        assert_eq!(std::fs::read_dir(tmp.path().join("skins")).unwrap().count(), 1);
    }

    #[test]
    fn failed_skin_replace_keeps_old_skin() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(tmp.path());
        let src = skin_file(tmp.path(), "s.png");
        store
            .add(ProfileDraft::new("A", "1.20.4").with_skin(SkinSelection::Replace(src)))
            .unwrap();
        let asset = store.list()[0].skin_path.clone().unwrap();

        let missing = tmp.path().join("missing.png");
        store
            .update(0, ProfileDraft::new("A", "1.20.4").with_skin(SkinSelection::Replace(missing)))
            .unwrap();
        assert_eq!(store.list()[0].skin_path.as_ref(), Some(&asset));
        assert!(asset.exists());
    }

    #[test]
    fn clearing_skin_releases_asset() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(tmp.path());
        let src = skin_file(tmp.path(), "s.png");
        store
            .add(ProfileDraft::new("A", "1.20.4").with_skin(SkinSelection::Replace(src)))
            .unwrap();
        let asset = store.list()[0].skin_path.clone().unwrap();

        store
            .update(0, ProfileDraft::new("A", "1.20.4").with_skin(SkinSelection::Clear))
            .unwrap();
        assert!(store.list()[0].skin_path.is_none());
        assert!(!asset.exists());
    }

    #[test]
    fn failed_skin_copy_still_saves_profile() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(tmp.path());
        let missing = tmp.path().join("missing.png");

        store
            .add(ProfileDraft::new("A", "1.20.4").with_skin(SkinSelection::Replace(missing)))
            .unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.list()[0].skin_path.is_none());
    }

    #[test]
    fn corrupt_file_and_stale_index_are_tolerated() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("profiles.json");

        std::fs::write(&path, "{ not json").unwrap();
        assert!(store_in(tmp.path()).is_empty());

        std::fs::write(
            &path,
            r#"{ "profiles": [ { "username": "A", "version": "1.20.4" } ], "selectedIndex": 7 }"#,
        )
        .unwrap();
        let store = store_in(tmp.path());
        assert_eq!(store.selected_index(), 0);
        assert_eq!(store.get_selected().unwrap().username, "A");
    }
}
