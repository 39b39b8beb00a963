//! Configuration management for reaper-mcp

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::bridge::DEFAULT_BRIDGE_ADDR;
use crate::paths::Paths;

/// Environment variable overriding `bridge_addr`
pub const BRIDGE_ENV: &str = "REAPER_MCP_BRIDGE";
/// Environment variable overriding `resource_path`
pub const RESOURCE_PATH_ENV: &str = "REAPER_RESOURCE_PATH";

/// reaper-mcp configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the ReaScript bridge inside REAPER
    #[serde(default = "default_bridge_addr")]
    pub bridge_addr: String,

    /// REAPER resource directory, when not in the platform default place
    #[serde(default)]
    pub resource_path: Option<PathBuf>,

    /// Name reported to MCP clients
    #[serde(default = "default_server_name")]
    pub server_name: String,
}

fn default_bridge_addr() -> String {
    DEFAULT_BRIDGE_ADDR.to_string()
}

fn default_server_name() -> String {
    "reaper-mcp".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge_addr: default_bridge_addr(),
            resource_path: None,
            server_name: default_server_name(),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config at {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Load from `path` or the default location, then apply environment overrides
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::load(&Paths::new().config_file())?,
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup(BRIDGE_ENV).filter(|v| !v.is_empty()) {
            self.bridge_addr = addr;
        }
        if let Some(path) = lookup(RESOURCE_PATH_ENV).filter(|v| !v.is_empty()) {
            self.resource_path = Some(PathBuf::from(path));
        }
    }

    /// REAPER resource directory to configure
    pub fn reaper_resources(&self) -> PathBuf {
        self.resource_path
            .clone()
            .unwrap_or_else(|| Paths::new().reaper_resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bridge_addr, "127.0.0.1:2306");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"bridge_addr": "10.0.0.5:9000"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.bridge_addr, "10.0.0.5:9000");
        assert_eq!(config.server_name, "reaper-mcp");
        assert!(config.resource_path.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            BRIDGE_ENV => Some("127.0.0.1:4000".to_string()),
            RESOURCE_PATH_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.bridge_addr, "127.0.0.1:4000");
        assert!(config.resource_path.is_none());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
