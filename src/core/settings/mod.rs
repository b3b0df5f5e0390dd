pub mod model;
pub mod store;

pub use model::{
    AppearanceSettings, FontSize, GameSettings, LaunchBehavior, LauncherSettings, MemoryLimits,
};
pub use store::SettingsStore;
