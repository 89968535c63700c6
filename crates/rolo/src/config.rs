//! CLI configuration: a small TOML file merged with `ROLO_` environment
//! variables and flag overrides, resolved into a `DirectoryConfig`.

use std::path::PathBuf;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};

use rolo_core::DirectoryConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// On-disk configuration (`config.toml` in the platform config dir).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API root, e.g. `https://host/api`.
    pub server: Option<String>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Default page size for list and search.
    pub page_size: Option<u32>,
}

/// Path of the config file.
pub fn config_path() -> PathBuf {
    directories::ProjectDirs::from("dev", "rolo", "rolo").map_or_else(
        || PathBuf::from("rolo.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Load config from file and environment. A missing file is fine; a
/// malformed one is not.
pub fn load_config() -> Result<Config, CliError> {
    let config = Figment::new()
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("ROLO_"))
        .extract()?;
    Ok(config)
}

/// Resolve everything into the `DirectoryConfig` the core layer needs.
/// Flags beat environment, environment beats file.
pub fn resolve(global: &GlobalOpts) -> Result<DirectoryConfig, CliError> {
    let file = load_config()?;

    let server = global
        .server
        .clone()
        .or(file.server)
        .ok_or_else(|| CliError::NoServer {
            path: config_path().display().to_string(),
        })?;
    let base_url: url::Url = server.parse().map_err(|_| CliError::Config {
        field: "server".into(),
        reason: format!("invalid URL: {server}"),
    })?;

    let mut config = DirectoryConfig::new(base_url);
    if let Some(seconds) = global.timeout.or(file.timeout) {
        config.timeout = Duration::from_secs(seconds);
    }
    if let Some(size) = file.page_size {
        config.page_size = size;
    }
    Ok(config)
}
