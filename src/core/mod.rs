// ─── NovaLauncher Core ───
// Offline Minecraft launcher backend.
//
// Architecture:
//   core/
//     auth/        Offline account (name → UUID)
//     settings/    launcher_settings.json with defaults merge
//     profile/     Profile list + selection, profiles.json
//     skin/        Skin files owned by profiles
//     maintenance/ Temp/natives cleanup, full reset
//     loaders/     Vanilla / Fabric / Forge selection
//     launch/      Backend seam + session state machine
//     version/     Mojang version manifest
//     state/       Global application state

pub mod auth;
pub mod error;
pub mod http;
pub mod launch;
pub mod loaders;
pub mod maintenance;
pub mod profile;
pub mod settings;
pub mod skin;
pub mod state;
pub mod version;
