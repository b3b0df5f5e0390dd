// ─── Loader Resolution ───
// Turns a profile's loader choice into the descriptor handed to the
// launch backend. This is the only place loader types are matched on.

use serde::Serialize;
use tracing::warn;

use crate::core::profile::{LoaderType, Profile};

pub const DEFAULT_FABRIC_LOADER: &str = "0.14.22";
pub const FALLBACK_FORGE_BUILD: &str = "1.19.2-43.2.14";

/// Known Forge builds per game version.
const FORGE_BUILDS: [(&str, &str); 3] = [
    ("1.19.2", "1.19.2-43.2.14"),
    ("1.18.2", "1.18.2-40.2.0"),
    ("1.16.5", "1.16.5-36.2.39"),
];

/// Loader descriptor as the backend consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum LoaderSpec {
    Vanilla,
    Fabric {
        #[serde(rename = "loaderVersion")]
        loader_version: String,
        minecraft: String,
    },
    Forge {
        build: String,
    },
}

/// Result of looking a game version up in the Forge table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgeBuild {
    Mapped(String),
    /// Not in the table; the fixed default build is used and may not match the game version.
    Fallback(String),
}

impl ForgeBuild {
    pub fn build(&self) -> &str {
        match self {
            ForgeBuild::Mapped(build) | ForgeBuild::Fallback(build) => build,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ForgeBuild::Fallback(_))
    }
}

pub fn resolve_forge_build(game_version: &str) -> ForgeBuild {
    match FORGE_BUILDS
        .iter()
        .find(|(version, _)| *version == game_version)
    {
        Some((_, build)) => ForgeBuild::Mapped((*build).to_string()),
        None => {
            warn!(
                "No Forge build known for {}, falling back to {}",
                game_version, FALLBACK_FORGE_BUILD
            );
            ForgeBuild::Fallback(FALLBACK_FORGE_BUILD.to_string())
        }
    }
}

/// Resolved loader plus the Forge lookup outcome, when there was one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLoader {
    pub spec: LoaderSpec,
    pub forge: Option<ForgeBuild>,
}

pub fn resolve(profile: &Profile) -> ResolvedLoader {
    match profile.loader_type {
        LoaderType::Vanilla => ResolvedLoader {
            spec: LoaderSpec::Vanilla,
            forge: None,
        },
        LoaderType::Fabric => ResolvedLoader {
            spec: LoaderSpec::Fabric {
                loader_version: DEFAULT_FABRIC_LOADER.to_string(),
                minecraft: profile.version.clone(),
            },
            forge: None,
        },
        LoaderType::Forge => {
            let build = resolve_forge_build(&profile.version);
            ResolvedLoader {
                spec: LoaderSpec::Forge {
                    build: build.build().to_string(),
                },
                forge: Some(build),
            }
        }
    }
}
