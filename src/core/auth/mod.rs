use serde::{Deserialize, Serialize};

use crate::core::config::LauncherConfig;

/// The identity values handed to the game. Tokens and UUIDs come from an
/// external authentication client and are never validated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub username: String,
    pub uuid: String,
    pub access_token: Option<String>,
    pub user_type: String,
}

impl AccountProfile {
    /// Profile with no token and the deterministic offline UUID.
    pub fn offline(username: &str) -> Self {
        let username = username.trim().to_string();
        Self {
            uuid: offline_uuid(&username),
            username,
            access_token: None,
            user_type: "mojang".into(),
        }
    }

    pub fn from_config(config: &LauncherConfig) -> Self {
        let username = config.username.trim().to_string();
        let uuid = config
            .uuid
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| offline_uuid(&username));
        let access_token = config
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Self {
            username,
            uuid,
            access_token,
            user_type: config.user_type.clone(),
        }
    }
}

/// Fallback UUID: the name padded with fourteen spaces, hex-encoded, cut to
/// 32 characters.
pub fn offline_uuid(username: &str) -> String {
    let padded = format!("{username}{}", " ".repeat(14));
    let mut encoded = hex::encode(padded.as_bytes());
    encoded.truncate(32);
    encoded
}
