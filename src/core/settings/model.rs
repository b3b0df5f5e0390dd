use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::ValidationError;

pub const DEFAULT_THEME: &str = "winter";
pub const KNOWN_THEMES: [&str; 3] = ["winter", "blossom", "swap"];

/// JVM heap limits, kept as the `-Xms`/`-Xmx` strings the user typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryLimits {
    pub min: String,
    pub max: String,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self {
            min: "2G".into(),
            max: "4G".into(),
        }
    }
}

impl MemoryLimits {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let min = parse_heap_size(&self.min)
            .ok_or_else(|| ValidationError::InvalidMemory(format!("min {:?}", self.min)))?;
        let max = parse_heap_size(&self.max)
            .ok_or_else(|| ValidationError::InvalidMemory(format!("max {:?}", self.max)))?;

        if min > max {
            return Err(ValidationError::InvalidMemory(format!(
                "min {} is larger than max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Parse `<n>[K|M|G]` (case-insensitive) into bytes. A bare number is bytes.
pub fn parse_heap_size(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (digits, multiplier) = match raw.chars().last()? {
        'k' | 'K' => (&raw[..raw.len() - 1], 1024),
        'm' | 'M' => (&raw[..raw.len() - 1], 1024 * 1024),
        'g' | 'G' => (&raw[..raw.len() - 1], 1024 * 1024 * 1024),
        _ => (raw, 1),
    };

    let value: u64 = digits.parse().ok()?;
    if value == 0 {
        return None;
    }
    value.checked_mul(multiplier)
}

/// What the launch needs from the settings: memory, Java and the game root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub memory: MemoryLimits,
    /// Empty means "use the system Java".
    pub java_path: String,
    pub game_dir: PathBuf,
}

impl GameSettings {
    pub fn with_game_dir(game_dir: PathBuf) -> Self {
        Self {
            memory: MemoryLimits::default(),
            java_path: String::new(),
            game_dir,
        }
    }

    pub fn java_override(&self) -> Option<PathBuf> {
        let trimmed = self.java_path.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.game_dir.join("versions")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.game_dir.join("assets")
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn px(self) -> u8 {
        match self {
            FontSize::Small => 14,
            FontSize::Medium => 16,
            FontSize::Large => 18,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceSettings {
    pub theme: String,
    /// Percent, 0–100.
    pub ui_opacity: u8,
    pub font_size: FontSize,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.into(),
            ui_opacity: 70,
            font_size: FontSize::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchBehavior {
    pub auto_launch: bool,
    pub minimize_on_launch: bool,
    pub close_on_launch: bool,
}

impl Default for LaunchBehavior {
    fn default() -> Self {
        Self {
            auto_launch: false,
            minimize_on_launch: true,
            close_on_launch: false,
        }
    }
}

/// Everything persisted in `launcher_settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LauncherSettings {
    pub appearance: AppearanceSettings,
    pub launch: LaunchBehavior,
    pub minecraft: GameSettings,
}

impl LauncherSettings {
    pub fn with_game_dir(game_dir: PathBuf) -> Self {
        Self {
            appearance: AppearanceSettings::default(),
            launch: LaunchBehavior::default(),
            minecraft: GameSettings::with_game_dir(game_dir),
        }
    }

    /// The narrower view the launch flow reads.
    pub fn game(&self) -> &GameSettings {
        &self.minecraft
    }

    pub fn game_dir(&self) -> &Path {
        &self.minecraft.game_dir
    }

    /// Clamp out-of-range values and drop unknown theme ids.
    pub fn normalized(mut self) -> Self {
        self.appearance.ui_opacity = self.appearance.ui_opacity.min(100);
        if !KNOWN_THEMES.contains(&self.appearance.theme.as_str()) {
            self.appearance.theme = DEFAULT_THEME.into();
        }
        self
    }
}
