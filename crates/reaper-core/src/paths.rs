//! Standard paths used by reaper-mcp

use std::path::PathBuf;

/// Standard reaper-mcp paths
pub struct Paths {
    /// Config directory (~/.config/reaper-mcp)
    pub config: PathBuf,
    /// REAPER's resource directory
    /// (~/.config/REAPER, ~/Library/Application Support/REAPER, %APPDATA%\REAPER)
    pub reaper_resources: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("~/.config"));

        Self {
            config: base.join("reaper-mcp"),
            reaper_resources: base.join("REAPER"),
        }
    }

    /// Default config file location
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }
}
