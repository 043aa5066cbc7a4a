//! Configuration: where checkpoint state lives and which backend stores it.
//!
//! Sources, later ones winning:
//! 1. Built-in defaults (`$HOME/.checkpointstate`, directory backend)
//! 2. `config.toml` at `$CHECKPOINT_CONFIG`, or `<config dir>/checkpoint/config.toml`
//! 3. `CHECKPOINT_ROOT` environment variable

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{DirectoryManager, Manager};

pub const CONFIG_ENV_VAR: &str = "CHECKPOINT_CONFIG";
pub const ROOT_ENV_VAR: &str = "CHECKPOINT_ROOT";

const DEFAULT_STATE_DIR: &str = ".checkpointstate";

/// Storage backend for checkpoint state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One directory per session on the local filesystem.
    #[default]
    Directory,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    root: Option<PathBuf>,
    #[serde(default)]
    backend: Backend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub root: PathBuf,
    pub backend: Backend,
}

impl Config {
    /// Load configuration from the config file and environment.
    pub fn load() -> Result<Self> {
        let file = match config_file_path() {
            Some(path) => read_config_file(&path)?,
            None => ConfigFile::default(),
        };

        let root = match std::env::var_os(ROOT_ENV_VAR).filter(|v| !v.is_empty()) {
            Some(root) => PathBuf::from(root),
            None => match file.root {
                Some(root) => root,
                None => default_root()?,
            },
        };

        Ok(Self {
            root,
            backend: file.backend,
        })
    }

    /// Construct the manager for the configured backend.
    pub fn manager(&self) -> Result<Box<dyn Manager>> {
        match self.backend {
            Backend::Directory => {
                let mgr = DirectoryManager::new(&self.root).with_context(|| {
                    format!("Failed to open checkpoint state at {}", self.root.display())
                })?;
                Ok(Box::new(mgr))
            }
        }
    }
}

fn default_root() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home.join(DEFAULT_STATE_DIR))
}

/// The config file to read, if any.
///
/// An explicit `$CHECKPOINT_CONFIG` must exist; the default location is
/// optional.
fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join("checkpoint").join("config.toml"))
        .filter(|path| path.is_file())
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.is_file() {
        bail!("Config file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(file)
}
