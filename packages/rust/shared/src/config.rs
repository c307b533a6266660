//! Application configuration for SiteForge.
//!
//! User config lives at `~/.siteforge/siteforge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteForgeError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "siteforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".siteforge";

// ---------------------------------------------------------------------------
// Config structs (matching siteforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Discovery settings.
    #[serde(default)]
    pub discovery: DiscoverySettings,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Root directory for project run directories.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "output".into()
}

/// `[discovery]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySettings {
    /// Hard per-request deadline for GET fetches, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Deadline for HEAD existence probes, in seconds.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_probe_timeout_secs() -> u64 {
    3
}

// ---------------------------------------------------------------------------
// Discovery config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime discovery configuration handed to the Discovery Engine.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Hard per-request deadline for GET fetches.
    pub timeout_secs: u64,
    /// Deadline for HEAD existence probes.
    pub probe_timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for DiscoveryConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.discovery.timeout_secs,
            probe_timeout_secs: config.discovery.probe_timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.siteforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SiteForgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.siteforge/siteforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SiteForgeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SiteForgeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SiteForgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SiteForgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SiteForgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("timeout_secs"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.discovery.timeout_secs, 10);
        assert_eq!(parsed.defaults.output_dir, "output");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[discovery]
timeout_secs = 5
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.discovery.timeout_secs, 5);
        assert_eq!(config.discovery.probe_timeout_secs, 3);
        assert_eq!(config.defaults.output_dir, "output");
    }

    #[test]
    fn discovery_config_from_app_config() {
        let app = AppConfig::default();
        let discovery = DiscoveryConfig::from(&app);
        assert_eq!(discovery.timeout_secs, 10);
        assert_eq!(discovery.probe_timeout_secs, 3);
    }
}
