//! Workspace discovery and configuration
//!
//! A workspace is a directory containing `.sheetstock/`. Configuration is read
//! from, in order: an explicit path (`--config` / `SHEETSTOCK_CONFIG`), the
//! workspace's `.sheetstock/config.yaml`, the user config directory, and finally
//! built-in defaults. Relative paths resolve against the workspace root.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{Result, StockError};
use crate::core::store::StoreOptions;

/// Workspace marker directory
pub const WORKSPACE_DIR: &str = ".sheetstock";

/// Config file name inside the workspace and user config directories
pub const CONFIG_FILE: &str = "config.yaml";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database path
    pub database: PathBuf,

    /// JSON-lines audit log; events are dropped when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_log: Option<PathBuf>,

    /// Milliseconds a writer waits for another writer's lock
    pub busy_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(WORKSPACE_DIR).join("stock.db"),
            event_log: Some(PathBuf::from(WORKSPACE_DIR).join("events.jsonl")),
            busy_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Load a config file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| StockError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(content).map_err(|e| StockError::Config {
            message: format!("invalid {}: {}", path.display(), e),
        })
    }

    /// Per-user config file location, if the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "sheetstock").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Store options derived from this config
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }

    /// Serialize for writing a fresh config file
    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).map_err(|e| StockError::Config {
            message: e.to_string(),
        })
    }
}

/// A workspace root together with its effective config
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Build a workspace from parts
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Create `.sheetstock/` with a default config under `root`
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(WORKSPACE_DIR);
        fs::create_dir_all(&dir)?;
        let config_path = dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            Config::load_file(&config_path)?
        } else {
            let config = Config::default();
            fs::write(&config_path, config.to_yaml()?)?;
            config
        };
        Ok(Self::new(root, config))
    }

    /// Find the workspace containing `start`, walking up the directory tree
    pub fn discover_from(start: &Path) -> Result<Self> {
        let mut current = Some(start);
        while let Some(dir) = current {
            let marker = dir.join(WORKSPACE_DIR);
            if marker.is_dir() {
                let config_path = marker.join(CONFIG_FILE);
                let config = if config_path.exists() {
                    Config::load_file(&config_path)?
                } else {
                    Self::user_or_default_config()?
                };
                return Ok(Self::new(dir, config));
            }
            current = dir.parent();
        }
        Err(StockError::Config {
            message: format!(
                "not inside a sheetstock workspace ({}). Run 'sheetstock init' first",
                start.display()
            ),
        })
    }

    /// Resolve the workspace for the CLI: explicit config wins, otherwise discover from cwd
    pub fn load(explicit_config: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        match explicit_config {
            Some(path) => Ok(Self::new(cwd, Config::load_file(path)?)),
            None => Self::discover_from(&cwd),
        }
    }

    fn user_or_default_config() -> Result<Config> {
        match Config::user_config_path() {
            Some(path) if path.exists() => Config::load_file(&path),
            _ => Ok(Config::default()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.config.database)
    }

    pub fn event_log_path(&self) -> Option<PathBuf> {
        self.config.event_log.as_deref().map(|p| self.resolve(p))
    }
}
