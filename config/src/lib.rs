//! Load configuration from XDG `config.toml` and project `.env`, then apply to the process
//! environment with priority: **existing env > .env > XDG**.
//!
//! `config.toml` may also carry a `[graph]` table read by [`GraphSettings::resolve`]:
//!
//! ```toml
//! [env]
//! WEFT_LOG = "weft=debug"
//!
//! [graph]
//! recursion_limit = 40
//! checkpoint_db = "/var/lib/weft/checkpoints.db"
//! ```

mod env_file;
mod settings;
mod xdg_toml;

pub use settings::{GraphSettings, CHECKPOINT_DB_VAR, LOG_VAR, RECURSION_LIMIT_VAR};
pub use xdg_toml::GraphTable;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    Dotenv(#[from] dotenv::Error),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Loads config from XDG `config.toml` and optional project `.env`, then sets environment
/// variables only for keys that are **not** already set.
///
/// * `app_name`: e.g. `"weft"`; the XDG path is `$XDG_CONFIG_HOME/<app_name>/config.toml`.
/// * `override_dir`: if `Some`, look for `.env` there instead of the current directory.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let config_home = xdg_toml::config_home()?;
    apply_from(&config_home, app_name, override_dir)
}

fn apply_from(
    config_home: &Path,
    app_name: &str,
    override_dir: Option<&Path>,
) -> Result<(), LoadError> {
    let xdg_map = xdg_toml::load_from(config_home, app_name)?.env;
    let dotenv_map = env_file::load_env_map(override_dir)?;

    for (key, value) in merge_sources(&dotenv_map, &xdg_map) {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
        }
    }
    Ok(())
}

/// Union of both maps; `.env` wins over the XDG table.
fn merge_sources(
    dotenv_map: &HashMap<String, String>,
    xdg_map: &HashMap<String, String>,
) -> HashMap<String, String> {
    let keys: HashSet<&String> = dotenv_map.keys().chain(xdg_map.keys()).collect();
    keys.into_iter()
        .filter_map(|k| {
            dotenv_map
                .get(k)
                .or_else(|| xdg_map.get(k))
                .map(|v| (k.clone(), v.clone()))
        })
        .collect()
}
