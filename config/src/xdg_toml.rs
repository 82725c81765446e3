//! Load `$XDG_CONFIG_HOME/<app>/config.toml`: the `[env]` table and the `[graph]` table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LoadError;

/// `$XDG_CONFIG_HOME` when set and non-empty, else the platform config directory.
pub(crate) fn config_home() -> Result<PathBuf, LoadError> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => dirs::config_dir()
            .ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into())),
    }
}

/// `[graph]` table. Every key is optional; environment variables override them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GraphTable {
    pub recursion_limit: Option<usize>,
    pub checkpoint_db: Option<PathBuf>,
    pub log: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub graph: GraphTable,
}

/// Reads `<config_home>/<app_name>/config.toml`. Missing file yields an empty config.
pub(crate) fn load_from(config_home: &Path, app_name: &str) -> Result<ConfigFile, LoadError> {
    let path = config_home.join(app_name).join("config.toml");
    if !path.is_file() {
        return Ok(ConfigFile::default());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    Ok(toml::from_str(&content)?)
}
