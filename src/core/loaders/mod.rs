pub mod fabric;
pub mod overlay;

pub use fabric::{fabric_profile_url, fetch_fabric_overlay};
pub use overlay::{transform_manifest, OverlayManifest};
