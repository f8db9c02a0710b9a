use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;

/// Content-addressed object store base.
pub const RESOURCES_URL: &str = "https://resources.download.minecraft.net";

/// Top-level asset index JSON structure.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetIndex {
    #[serde(default)]
    pub objects: HashMap<String, AssetObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
}

impl AssetObject {
    /// The two-character shard directory (`ab` for `ab12...`).
    ///
    /// Hashes shorter than two characters shard under themselves.
    pub fn shard(&self) -> &str {
        self.hash.get(..2).unwrap_or(&self.hash)
    }

    /// `<shard>/<hash>`, shared by the remote URL and the on-disk path.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.shard(), self.hash)
    }

    pub fn url(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.relative_path())
    }
}

impl AssetIndex {
    /// Distinct shard directories referenced by the index.
    pub fn shards(&self) -> BTreeSet<&str> {
        self.objects.values().map(AssetObject::shard).collect()
    }

    /// Objects in a stable (name-sorted) order.
    pub fn sorted_objects(&self) -> Vec<(&str, &AssetObject)> {
        let mut objects: Vec<_> = self
            .objects
            .iter()
            .map(|(name, obj)| (name.as_str(), obj))
            .collect();
        objects.sort_by(|a, b| a.0.cmp(b.0));
        objects
    }
}
