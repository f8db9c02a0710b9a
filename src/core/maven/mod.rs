mod artifact;

pub use artifact::MavenArtifact;

/// Default repository for libraries that carry only a coordinate.
pub const MOJANG_LIBRARIES: &str = "https://libraries.minecraft.net/";
pub const FABRIC_MAVEN: &str = "https://maven.fabricmc.net/";
