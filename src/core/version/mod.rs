pub mod manifest;

pub use manifest::{VersionEntry, VersionManifest};
