// ─── Version Manifest ───
// Fetches the Mojang version manifest and lists the release builds.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::LauncherResult;

const VERSION_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";

const RELEASE_TYPE: &str = "release";

#[derive(Debug, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionEntry>,
}

/// One game version as offered in the profile dialog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    #[serde(rename = "releaseTime", default)]
    pub release_time: Option<String>,
}

impl VersionManifest {
    pub async fn fetch(client: &reqwest::Client) -> LauncherResult<Self> {
        debug!("GET {}", VERSION_MANIFEST_URL);
        let response = client.get(VERSION_MANIFEST_URL).send().await?;
        let manifest: VersionManifest = response.error_for_status()?.json().await?;

        info!(
            "Version manifest: {} entries, {} releases",
            manifest.versions.len(),
            manifest.releases().len()
        );
        Ok(manifest)
    }

    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Stable versions only, in manifest order (newest first).
    pub fn releases(&self) -> Vec<&VersionEntry> {
        self.versions
            .iter()
            .filter(|v| v.version_type == RELEASE_TYPE)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "latest": { "release": "1.20.4", "snapshot": "24w03a" },
        "versions": [
            { "id": "24w03a", "type": "snapshot", "releaseTime": "2024-01-17T12:00:00+00:00" },
            { "id": "1.20.4", "type": "release", "releaseTime": "2023-12-07T12:00:00+00:00" },
            { "id": "1.19.2", "type": "release" },
            { "id": "b1.7.3", "type": "old_beta" }
        ]
    }"#;

    #[test]
    fn releases_skip_snapshots_and_betas() {
        let manifest: VersionManifest = serde_json::from_str(SAMPLE).unwrap();
        let ids: Vec<&str> = manifest.releases().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["1.20.4", "1.19.2"]);
    }

    #[test]
    fn find_version_by_id() {
        let manifest: VersionManifest = serde_json::from_str(SAMPLE).unwrap();
        let entry = manifest.find_version("24w03a").unwrap();
        assert_eq!(entry.version_type, "snapshot");
        assert!(manifest.find_version("1.99.0").is_none());
    }
}
