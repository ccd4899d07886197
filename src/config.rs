use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::downloader::models::NetworkConfig;
use crate::downloader::strategy::default_cookies_path;
use crate::downloader::DownloadError;

const APP_DIR: &str = "smart-video-dl";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// yt-dlp binary, otherwise YTDLP_PATH / common paths / PATH
    pub ytdlp_path: Option<String>,
    /// cookies.txt, otherwise the one next to the install
    pub cookies_path: Option<PathBuf>,
    /// Subtitle languages in preference order; empty keeps the defaults
    pub subtitle_languages: Vec<String>,
    pub network: NetworkConfig,
}

impl AppConfig {
    /// Load from the user config dir. A missing file means defaults.
    pub fn load() -> Result<Self, DownloadError> {
        match Self::get_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self, DownloadError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DownloadError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| DownloadError::Config(format!("Invalid {}: {}", path.display(), e)))
    }

    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn resolved_cookies_path(&self) -> PathBuf {
        self.cookies_path.clone().unwrap_or_else(default_cookies_path)
    }
}
