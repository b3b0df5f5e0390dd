use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use crate::core::error::ValidationError;

/// Supported mod loaders.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoaderType {
    #[default]
    Vanilla,
    Fabric,
    Forge,
}

impl std::fmt::Display for LoaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderType::Vanilla => write!(f, "vanilla"),
            LoaderType::Fabric => write!(f, "fabric"),
            LoaderType::Forge => write!(f, "forge"),
        }
    }
}

/// A saved launch configuration, persisted inside `profiles.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Also the in-game display name.
    pub username: String,
    pub version: String,
    #[serde(default)]
    pub loader_type: LoaderType,
    /// Points into the skin store; `None` means the default skin.
    #[serde(default, deserialize_with = "empty_path_as_none")]
    pub skin_path: Option<PathBuf>,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
}

impl Profile {
    pub fn is_launchable(&self) -> bool {
        !self.username.trim().is_empty() && !self.version.trim().is_empty()
    }
}

/// What to do with a profile's skin when saving the profile dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SkinSelection {
    #[default]
    Keep,
    Clear,
    /// Copy this user-picked file into the skin store.
    Replace(PathBuf),
}

/// User input from the add/edit profile dialog.
#[derive(Debug, Clone, Default)]
pub struct ProfileDraft {
    pub username: String,
    pub version: String,
    pub loader_type: LoaderType,
    pub skin: SkinSelection,
}

impl ProfileDraft {
    pub fn new(username: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_loader(mut self, loader_type: LoaderType) -> Self {
        self.loader_type = loader_type;
        self
    }

    pub fn with_skin(mut self, skin: SkinSelection) -> Self {
        self.skin = skin;
        self
    }

    /// Trim the text fields and reject empty ones.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.username = self.username.trim().to_string();
        self.version = self.version.trim().to_string();

        if self.username.is_empty() {
            return Err(ValidationError::EmptyUsername);
        }
        if self.version.is_empty() {
            return Err(ValidationError::EmptyVersion);
        }
        Ok(self)
    }
}

// Older blobs store "no skin" as an empty string.
fn empty_path_as_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from))
}
