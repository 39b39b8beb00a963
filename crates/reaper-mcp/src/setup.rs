//! REAPER auto-configuration
//!
//! Points REAPER at the ReaScript bridge: writes the bridge settings into the
//! resource directory and hooks the bridge script into `__startup.lua` so it
//! starts with REAPER. Takes effect after REAPER restarts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use reaper_core::Config;
use thiserror::Error;
use tracing::{info, warn};

use crate::client::Configure;

/// Settings file read by the bridge script
pub const BRIDGE_SETTINGS_FILE: &str = "reaper-mcp-bridge.ini";

/// Bridge script expected in REAPER's `Scripts` directory
pub const BRIDGE_SCRIPT: &str = "reaper-mcp-bridge.lua";

/// Line added to `Scripts/__startup.lua`
pub const STARTUP_LINE: &str =
    "local bridge = reaper.GetResourcePath() .. \"/Scripts/reaper-mcp-bridge.lua\"; \
     if reaper.file_exists(bridge) then dofile(bridge) end -- reaper-mcp";

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("REAPER resource directory not found at {0} (set REAPER_RESOURCE_PATH or resource_path)")]
    ResourceDirMissing(PathBuf),

    #[error("Invalid bridge address '{0}', expected host:port")]
    InvalidBridgeAddr(String),
}

/// What a successful run changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub settings_file: PathBuf,
    pub startup_script: PathBuf,
    /// False when the startup hook was already present
    pub hook_added: bool,
    /// Whether the bridge script itself is installed
    pub bridge_script_found: bool,
}

/// The auto-configure step
#[derive(Debug, Clone)]
pub struct ReaperSetup {
    resource_dir: PathBuf,
    bridge_addr: String,
}

impl ReaperSetup {
    pub fn new(resource_dir: impl Into<PathBuf>, bridge_addr: impl Into<String>) -> Self {
        Self {
            resource_dir: resource_dir.into(),
            bridge_addr: bridge_addr.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.reaper_resources(), config.bridge_addr.clone())
    }

    pub fn resource_dir(&self) -> &Path {
        &self.resource_dir
    }

    /// Configure REAPER, idempotently
    pub fn run(&self) -> Result<SetupReport> {
        if !self.resource_dir.is_dir() {
            bail!(SetupError::ResourceDirMissing(self.resource_dir.clone()));
        }
        let (host, port) = split_addr(&self.bridge_addr)?;

        let settings_file = self.resource_dir.join(BRIDGE_SETTINGS_FILE);
        let settings = format!("[reaper-mcp]\nhost={}\nport={}\n", host, port);
        fs::write(&settings_file, settings)
            .with_context(|| format!("Failed to write {}", settings_file.display()))?;

        let scripts = self.resource_dir.join("Scripts");
        fs::create_dir_all(&scripts)
            .with_context(|| format!("Failed to create {}", scripts.display()))?;

        let startup_script = scripts.join("__startup.lua");
        let hook_added = ensure_line(&startup_script, STARTUP_LINE)?;

        let bridge_script_found = scripts.join(BRIDGE_SCRIPT).is_file();
        if !bridge_script_found {
            warn!(
                "{} is not installed in {}; REAPER will start without the bridge",
                BRIDGE_SCRIPT,
                scripts.display()
            );
        }

        info!("Configured REAPER at {}", self.resource_dir.display());
        Ok(SetupReport {
            settings_file,
            startup_script,
            hook_added,
            bridge_script_found,
        })
    }
}

impl Configure for ReaperSetup {
    /// Only a run that leaves REAPER able to load the bridge counts
    fn configure(&self) -> bool {
        match self.run() {
            Ok(report) => report.bridge_script_found,
            Err(e) => {
                warn!("Auto-configuration failed: {:#}", e);
                false
            }
        }
    }
}

fn split_addr(addr: &str) -> Result<(&str, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| SetupError::InvalidBridgeAddr(addr.to_string()))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| SetupError::InvalidBridgeAddr(addr.to_string()))?;
    if host.is_empty() {
        bail!(SetupError::InvalidBridgeAddr(addr.to_string()));
    }
    Ok((host, port))
}

/// Append `line` to `path` unless some line already matches it; returns whether it was added
fn ensure_line(path: &Path, line: &str) -> Result<bool> {
    let mut content = if path.exists() {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    } else {
        String::new()
    };

    if content.lines().any(|l| l.trim() == line) {
        return Ok(false);
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(line);
    content.push('\n');
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_configures_fresh_install() {
        let dir = TempDir::new().unwrap();
        let setup = ReaperSetup::new(dir.path(), "127.0.0.1:2306");

        let report = setup.run().unwrap();
        assert!(report.hook_added);
        assert!(!report.bridge_script_found);

        let settings = fs::read_to_string(dir.path().join(BRIDGE_SETTINGS_FILE)).unwrap();
        assert_eq!(settings, "[reaper-mcp]\nhost=127.0.0.1\nport=2306\n");

        let startup = fs::read_to_string(dir.path().join("Scripts/__startup.lua")).unwrap();
        assert_eq!(startup, format!("{}\n", STARTUP_LINE));
    }

    #[test]
    fn test_hook_is_added_once() {
        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("Scripts");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join("__startup.lua"), "reaper.ShowConsoleMsg(\"hi\")").unwrap();
        fs::write(scripts.join(BRIDGE_SCRIPT), "-- bridge").unwrap();

        let setup = ReaperSetup::new(dir.path(), "localhost:4000");
        assert!(setup.run().unwrap().hook_added);
        let second = setup.run().unwrap();
        assert!(!second.hook_added);
        assert!(second.bridge_script_found);

        let startup = fs::read_to_string(scripts.join("__startup.lua")).unwrap();
        assert!(startup.starts_with("reaper.ShowConsoleMsg(\"hi\")\n"));
        assert_eq!(startup.matches(STARTUP_LINE).count(), 1);
    }

    #[test]
    fn test_missing_resource_dir_fails() {
        let dir = TempDir::new().unwrap();
        let setup = ReaperSetup::new(dir.path().join("REAPER"), "127.0.0.1:2306");
        let err = setup.run().unwrap_err();
        assert!(err.to_string().contains("REAPER resource directory not found"));
        assert!(!setup.configure());
    }

    #[test]
    fn test_bad_bridge_address() {
        let dir = TempDir::new().unwrap();
        assert!(ReaperSetup::new(dir.path(), "2306").run().is_err());
        assert!(ReaperSetup::new(dir.path(), "host:port").run().is_err());
        assert!(ReaperSetup::new(dir.path(), ":2306").run().is_err());
    }

    #[test]
    fn test_configure_needs_bridge_script() {
        let dir = TempDir::new().unwrap();
        let setup = ReaperSetup::new(dir.path(), "127.0.0.1:2306");

        // Settings and hook get written, but REAPER would have nothing to load
        assert!(!setup.configure());
        assert!(dir.path().join(BRIDGE_SETTINGS_FILE).is_file());
        assert!(!dir.path().join("Scripts").join(BRIDGE_SCRIPT).exists());

        fs::write(dir.path().join("Scripts").join(BRIDGE_SCRIPT), "-- bridge").unwrap();
        assert!(setup.configure());
    }
}
