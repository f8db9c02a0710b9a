pub mod manifest;
pub mod platform;
pub mod version_file;

pub use manifest::{VersionEntry, VersionManifest, VERSION_MANIFEST_URL};
pub use platform::{rules_allow, OsFamily, Platform, Rule, RuleAction};
pub use version_file::{
    ArgumentValue, Arguments, AssetIndexInfo, Library, LibraryArtifact, LoggingConfig,
    VersionJson, VersionType,
};
