// ─── Platform ───
// Host OS/arch as manifests spell them, plus the download-rule evaluator
// shared by libraries and conditional arguments.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Windows,
    Osx,
    Linux,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(target_os = "macos") {
            OsFamily::Osx
        } else {
            OsFamily::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::Osx => "osx",
            OsFamily::Linux => "linux",
        }
    }
}

/// The platform libraries and rules are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: OsFamily,
    /// Rust arch name (`x86_64`, `x86`, `aarch64`, ...).
    pub arch: String,
}

impl Platform {
    pub fn new(os: OsFamily, arch: impl Into<String>) -> Self {
        Self {
            os,
            arch: arch.into(),
        }
    }

    pub fn current() -> Self {
        Self::new(OsFamily::current(), std::env::consts::ARCH)
    }

    /// `64` or `32`, the value substituted for `${arch}` in natives keys.
    pub fn arch_bits(&self) -> &'static str {
        if self.arch.contains("64") {
            "64"
        } else {
            "32"
        }
    }

    /// Windows arch suffix used by the alternate classifier spelling.
    fn windows_arch_suffix(&self) -> &'static str {
        match self.arch.as_str() {
            "aarch64" => "arm64",
            _ => self.arch_bits(),
        }
    }

    /// Manifest spelling of the architecture for `os.arch` rule matching.
    fn rule_arch(&self) -> &str {
        match self.arch.as_str() {
            "x86_64" => "x64",
            "aarch64" => "arm64",
            other => other,
        }
    }

    /// Classifier keys to probe for a native component, highest priority
    /// first:
    ///
    /// 1. the library's own `natives` entry for this OS, `${arch}` expanded;
    /// 2. `natives-<os>`;
    /// 3. on Windows only, `natives-windows-<64|32|arm64>`.
    pub fn native_classifier_candidates(
        &self,
        natives: Option<&HashMap<String, String>>,
    ) -> Vec<String> {
        let mut candidates = Vec::new();

        if let Some(key) = natives.and_then(|n| n.get(self.os.as_str())) {
            candidates.push(key.replace("${arch}", self.arch_bits()));
        }
        candidates.push(format!("natives-{}", self.os.as_str()));
        if self.os == OsFamily::Windows {
            candidates.push(format!("natives-windows-{}", self.windows_arch_suffix()));
        }

        let mut seen = std::collections::HashSet::new();
        candidates.retain(|key| seen.insert(key.clone()));
        candidates
    }
}

// ─── Download Rules ───

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,
    /// Feature-gated rules (demo user, custom resolution, ...). The launcher
    /// enables no features, so any rule carrying them never matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

impl Rule {
    fn matches(&self, platform: &Platform) -> bool {
        if self.features.as_ref().is_some_and(|f| !f.is_empty()) {
            return false;
        }
        match &self.os {
            None => true,
            Some(os) => {
                let name_ok = os
                    .name
                    .as_deref()
                    .map_or(true, |name| name == platform.os.as_str());
                let arch_ok = os
                    .arch
                    .as_deref()
                    .map_or(true, |arch| arch == platform.rule_arch());
                name_ok && arch_ok
            }
        }
    }
}

/// Evaluate a rule list for `platform`.
///
/// - No rules → allowed.
/// - Otherwise start disallowed and walk the list in order; every matching
///   rule sets the state to its action, so a later disallow overrides an
///   earlier allow for the same platform.
pub fn rules_allow(rules: &[Rule], platform: &Platform) -> bool {
    if rules.is_empty() {
        return true;
    }

    let mut allowed = false;
    for rule in rules {
        if rule.matches(platform) {
            allowed = rule.action == RuleAction::Allow;
        }
    }
    allowed
}
