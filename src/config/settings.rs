//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::selection::ReplacePolicy;

use super::AppPaths;

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

/// Settings for the remote transcription / proofreading service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API endpoint (no trailing slash).
    pub base_url: String,
    /// Bearer credential.  `None` leaves remote calls failing with a
    /// configuration error until the user supplies one.
    pub api_key: Option<String>,
    /// Maximum seconds to wait for an API response.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://transcription-api-omega.vercel.app".into(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// ReplaceConfig
// ---------------------------------------------------------------------------

/// Settings for the in-place text replacement.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReplaceConfig {
    /// Where the selection lands after a replacement.
    pub policy: ReplacePolicy,
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Global hotkey bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Key that opens (or stops) the transcription surface (e.g. `"F9"`).
    pub toggle_transcription_key: String,
    /// Key that triggers proofreading of the current selection (e.g. `"F10"`).
    pub proofread_key: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            toggle_transcription_key: "F9".into(),
            proofread_key: "F10".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use proofscribe::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Remote API settings.
    pub api: ApiConfig,
    /// Replacement caret policy.
    pub replace: ReplaceConfig,
    /// Global hotkey bindings.
    pub hotkey: HotkeyConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.api.base_url, loaded.api.base_url);
        assert_eq!(original.api.api_key, loaded.api.api_key);
        assert_eq!(original.api.timeout_secs, loaded.api.timeout_secs);
        assert_eq!(original.replace.policy, loaded.replace.policy);
        assert_eq!(
            original.hotkey.toggle_transcription_key,
            loaded.hotkey.toggle_transcription_key
        );
        assert_eq!(original.hotkey.proofread_key, loaded.hotkey.proofread_key);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.api.base_url, AppConfig::default().api.base_url);
        assert!(config.api.api_key.is_none());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api.base_url, "https://transcription-api-omega.vercel.app");
        assert!(cfg.api.api_key.is_none());
        assert_eq!(cfg.api.timeout_secs, 30);
        assert_eq!(cfg.replace.policy, ReplacePolicy::CaretAfter);
        assert_eq!(cfg.hotkey.toggle_transcription_key, "F9");
        assert_eq!(cfg.hotkey.proofread_key, "F10");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.api.base_url = "http://localhost:3000".into();
        cfg.api.api_key = Some("sk-test".into());
        cfg.api.timeout_secs = 5;
        cfg.replace.policy = ReplacePolicy::KeepSelected;
        cfg.hotkey.proofread_key = "F8".into();

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.api.base_url, "http://localhost:3000");
        assert_eq!(loaded.api.api_key, Some("sk-test".into()));
        assert_eq!(loaded.api.timeout_secs, 5);
        assert_eq!(loaded.replace.policy, ReplacePolicy::KeepSelected);
        assert_eq!(loaded.hotkey.proofread_key, "F8");
    }
}
