//! Core-owned configuration.
//!
//! Outer surfaces (the CLI, a future GUI) own their file/env config
//! layers and hand a pre-built `DirectoryConfig` across this boundary;
//! core never sees their config types.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Default page size for list and search views.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Quiet period before a raw search input is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Everything the [`crate::Directory`](crate::directory::Directory)
/// facade needs to come up.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// API root, e.g. `https://host/api`.
    pub base_url: Url,

    /// Transport timeout for every request.
    pub timeout: Duration,

    /// Initial page size for list/search views.
    pub page_size: u32,

    /// Search debounce quiet period.
    pub debounce: Duration,

    /// Override for the session vault directory. `None` resolves the
    /// platform state directory (and is what production uses); tests
    /// point this at a tempdir.
    pub state_dir: Option<PathBuf>,
}

impl DirectoryConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
            state_dir: None,
        }
    }

    /// The directory holding the two session vault entries.
    pub(crate) fn resolve_state_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.state_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("dev", "rolo", "rolo").map_or_else(
            || {
                let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
                p.push(".local");
                p.push("state");
                p.push("rolo");
                p
            },
            // Platforms without a state dir fall back to local data.
            |dirs| {
                dirs.state_dir()
                    .unwrap_or_else(|| dirs.data_local_dir())
                    .to_path_buf()
            },
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn explicit_state_dir_override_wins() {
        let mut config = DirectoryConfig::new(Url::parse("http://localhost/api").unwrap());
        config.state_dir = Some(PathBuf::from("/tmp/rolo-vault"));
        assert_eq!(config.resolve_state_dir(), PathBuf::from("/tmp/rolo-vault"));
    }

    #[test]
    fn default_state_dir_is_app_scoped() {
        let config = DirectoryConfig::new(Url::parse("http://localhost/api").unwrap());
        assert!(config.resolve_state_dir().ends_with("rolo"));
    }
}
