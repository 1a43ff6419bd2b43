//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default endpoint of the link-only profile API.
pub const DEFAULT_PROFILE_API_URL: &str = "http://localhost:8000/api/v1/profiles/create";

/// Default HTTP port for the backend.
pub const DEFAULT_PORT: u16 = 3003;

/// Paths to FindMyStage data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the root if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            llm_config_file: root.join("llm-config.json"),
            root,
        })
    }
}

/// Top-level FindMyStage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Where link-only submissions are posted.
    pub profile_api_url: String,
}

impl AppConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let profile_api_url = std::env::var("FINDMYSTAGE_PROFILE_API_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROFILE_API_URL.to_string());

        let data_paths = DataPaths::new(data_dir)?;
        debug!("Profile API endpoint: {}", profile_api_url);

        Ok(Self {
            port,
            data_paths,
            profile_api_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_paths_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("data");
        let paths = DataPaths::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(paths.llm_config_file, root.join("llm-config.json"));
    }

    #[test]
    fn test_from_env_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_env(dir.path()).unwrap();
        assert!(!config.profile_api_url.is_empty());
        assert_eq!(config.data_paths.root, dir.path());
    }
}
