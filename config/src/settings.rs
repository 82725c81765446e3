//! Graph settings for the console harness: recursion limit, checkpoint
//! database and log filter.
//!
//! Resolution per key: `WEFT_*` environment variable, then the `[graph]`
//! table of the XDG `config.toml`, then the default.

use std::path::PathBuf;

use crate::xdg_toml::{self, GraphTable};
use crate::LoadError;

pub const RECURSION_LIMIT_VAR: &str = "WEFT_RECURSION_LIMIT";
pub const CHECKPOINT_DB_VAR: &str = "WEFT_CHECKPOINT_DB";
pub const LOG_VAR: &str = "WEFT_LOG";

/// Resolved settings.
///
/// `recursion_limit` and `log_filter` stay `None` when nothing sets them so
/// callers can fall back to their own defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSettings {
    pub recursion_limit: Option<usize>,
    pub checkpoint_db: PathBuf,
    pub log_filter: Option<String>,
}

impl GraphSettings {
    /// Reads the `[graph]` table of `$XDG_CONFIG_HOME/<app_name>/config.toml`
    /// and applies environment overrides.
    ///
    /// Call after [`crate::load_and_apply`] so `.env` values are visible.
    pub fn resolve(app_name: &str) -> Result<Self, LoadError> {
        let file = xdg_toml::load_from(&xdg_toml::config_home()?, app_name)?;
        Self::from_sources(app_name, file.graph, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_sources<F>(app_name: &str, table: GraphTable, env: F) -> Result<Self, LoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let recursion_limit = match env(RECURSION_LIMIT_VAR) {
            Some(raw) => Some(raw.trim().parse().map_err(|_| LoadError::InvalidValue {
                key: RECURSION_LIMIT_VAR.to_string(),
                value: raw.clone(),
            })?),
            None => table.recursion_limit,
        };
        if recursion_limit == Some(0) {
            return Err(LoadError::InvalidValue {
                key: RECURSION_LIMIT_VAR.to_string(),
                value: "0".to_string(),
            });
        }
        let checkpoint_db = env(CHECKPOINT_DB_VAR)
            .map(PathBuf::from)
            .or(table.checkpoint_db)
            .unwrap_or_else(|| default_db(app_name));
        let log_filter = env(LOG_VAR).or(table.log);
        Ok(Self {
            recursion_limit,
            checkpoint_db,
            log_filter,
        })
    }
}

/// `<data dir>/<app>/checkpoints.db`, or `<app>.db` in the working directory.
fn default_db(app_name: &str) -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(app_name).join("checkpoints.db"))
        .unwrap_or_else(|| PathBuf::from(format!("{}.db", app_name)))
}
