//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.cookbot/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CookbotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Where session history is stored. Defaults to `~/.cookbot/sessions`.
    pub session_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub session_dir: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.cookbot/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".cookbot").join("config.toml"))
}

/// Load config from `~/.cookbot/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `CookbotConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<CookbotConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(CookbotConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(CookbotConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: CookbotConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Cookbot Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# session_dir = "/home/me/.cookbot/sessions"

# [server]
# base_url = "http://localhost:5000"   # Or set COOKBOT_SERVER_URL env var
# timeout_secs = 30                    # Or set COOKBOT_TIMEOUT_SECS env var
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_server` is from the `--server` flag (None = not specified).
pub fn resolve(config: &CookbotConfig, cli_server: Option<&str>) -> ResolvedConfig {
    // Server URL: CLI → env → config → default
    let base_url = cli_server
        .map(|s| s.to_string())
        .or_else(|| std::env::var("COOKBOT_SERVER_URL").ok())
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Timeout: env → config → default
    let timeout_secs = std::env::var("COOKBOT_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .or(config.server.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    ResolvedConfig {
        base_url,
        timeout: Duration::from_secs(timeout_secs),
        session_dir: config.general.session_dir.clone().map(PathBuf::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = CookbotConfig::default();
        assert!(config.server.base_url.is_none());
        assert!(config.general.session_dir.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = CookbotConfig::default();
        let resolved = resolve(&config, None);
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(resolved.session_dir.is_none());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = CookbotConfig {
            general: GeneralConfig {
                session_dir: Some("/tmp/cookbot".to_string()),
            },
            server: ServerConfig {
                base_url: Some("https://chefbyte.onrender.com".to_string()),
                timeout_secs: Some(10),
            },
        };
        let resolved = resolve(&config, None);
        assert_eq!(resolved.base_url, "https://chefbyte.onrender.com");
        assert_eq!(resolved.timeout, Duration::from_secs(10));
        assert_eq!(resolved.session_dir, Some(PathBuf::from("/tmp/cookbot")));
    }

    #[test]
    fn test_resolve_cli_server_wins() {
        let config = CookbotConfig {
            server: ServerConfig {
                base_url: Some("http://from-config:5000".to_string()),
                timeout_secs: None,
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some("http://from-cli:5000"));
        assert_eq!(resolved.base_url, "http://from-cli:5000");
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
session_dir = "/data/cookbot"

[server]
base_url = "http://localhost:9000"
timeout_secs = 15
"#;
        let config: CookbotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.server.base_url.as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(config.server.timeout_secs, Some(15));
        assert_eq!(config.general.session_dir.as_deref(), Some("/data/cookbot"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing - everything else stays default
        let toml_str = r#"
[server]
timeout_secs = 5
"#;
        let config: CookbotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.timeout_secs, Some(5));
        assert!(config.server.base_url.is_none());
        assert!(config.general.session_dir.is_none());
    }
}
