// Common data models for downloader

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One invocation of the downloader
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    /// Quality tag: best, 1080p, 720p, 480p or audio
    pub quality: String,
    pub output_dir: PathBuf,
    pub download_subs: bool,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            quality: "best".to_string(),
            output_dir: output_dir.into(),
            download_subs: false,
        }
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn with_subtitles(mut self, enabled: bool) -> Self {
        self.download_subs = enabled;
        self
    }
}

/// Result of the one strategy that succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResult {
    pub video_path: PathBuf,
    pub title: String,
    /// Seconds
    pub duration: u64,
    /// Bytes, 0 when the file is not on disk
    pub file_size: u64,
    pub subtitle_files: Vec<PathBuf>,
    /// "WIDTHxHEIGHT", 0 for unknown dimensions
    pub resolution: String,
    pub uploader: String,
}

/// What happened to one strategy attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub strategy: String,
    pub success: bool,
    pub error: Option<String>,
}

impl AttemptOutcome {
    pub fn failed(strategy: &str, error: String) -> Self {
        Self {
            strategy: strategy.to_string(),
            success: false,
            error: Some(error),
        }
    }
}

/// Metadata the engine reports for a URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: String,
    pub uploader: String,
    pub duration: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub ext: Option<String>,
    /// Output path the engine prepared for this media
    pub filename: Option<String>,
}

impl MediaInfo {
    pub fn from_json(json: &serde_json::Value) -> Self {
        Self {
            title: json["title"].as_str().unwrap_or("Unknown").to_string(),
            uploader: json["uploader"].as_str().unwrap_or("Unknown").to_string(),
            duration: json["duration"].as_f64().unwrap_or(0.0) as u64,
            width: json["width"].as_u64().map(|w| w as u32),
            height: json["height"].as_u64().map(|h| h as u32),
            ext: json["ext"].as_str().map(|s| s.to_string()),
            filename: json["_filename"]
                .as_str()
                .or_else(|| json["filename"].as_str())
                .map(|s| s.to_string()),
        }
    }

    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width.unwrap_or(0), self.height.unwrap_or(0))
    }
}

/// Download progress information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub percent: f32,
    pub status: String,
}

/// Network configuration handed to the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// SOCKS5/HTTP proxy URL (e.g., "socks5://127.0.0.1:1080")
    pub proxy: Option<String>,

    /// Socket timeout in seconds, unset leaves it to yt-dlp
    pub timeout: Option<u32>,
}
