// Engine trait definition and the configuration handed to it

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::models::{DownloadProgress, DownloadRequest, MediaInfo, NetworkConfig};

/// Subtitle languages requested when subtitles are enabled, in preference order
pub const DEFAULT_SUBTITLE_LANGUAGES: [&str; 5] = ["zh-Hans", "zh-Hant", "en", "ja", "ko"];

/// Trait for the external video-retrieval engine
#[async_trait]
pub trait VideoEngine: Send + Sync {
    /// Name of the engine (for logging)
    fn name(&self) -> &'static str;

    /// Fetch metadata only, no files are written
    async fn probe(&self, url: &str, config: &EngineConfig) -> Result<MediaInfo, DownloadError>;

    /// Download the media (and subtitles if configured) into the output template
    async fn fetch(&self, url: &str, config: &EngineConfig) -> Result<MediaInfo, DownloadError>;

    /// Output path the engine uses for this media
    fn prepare_filename(&self, info: &MediaInfo, config: &EngineConfig) -> PathBuf;
}

/// Progress emitter helper. Wraps a callback that must not fail.
#[derive(Clone)]
pub struct ProgressEmitter {
    callback: Arc<dyn Fn(DownloadProgress) + Send + Sync>,
}

impl ProgressEmitter {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(DownloadProgress) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    pub fn emit(&self, progress: DownloadProgress) {
        (self.callback)(progress);
    }
}

impl fmt::Debug for ProgressEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressEmitter")
    }
}

/// Options for one engine invocation
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// yt-dlp format expression
    pub format: String,
    /// Output template, e.g. `<dir>/%(title)s.%(ext)s`
    pub output_template: String,
    pub merge_output_format: String,
    pub write_subtitles: bool,
    pub write_auto_subtitles: bool,
    pub subtitle_languages: Vec<String>,
    pub subtitle_format: String,
    /// Path to cookies.txt file
    pub cookie_file: Option<PathBuf>,
    /// Browser to pull session cookies from
    pub cookies_from_browser: Option<String>,
    pub proxy: Option<String>,
    pub socket_timeout: Option<u32>,
    pub progress: Option<ProgressEmitter>,
}

impl EngineConfig {
    /// Base options shared by every strategy
    pub fn for_request(request: &DownloadRequest) -> Self {
        Self {
            format: FormatSelector::get_format_spec(&request.quality).to_string(),
            output_template: output_template(&request.output_dir),
            merge_output_format: "mp4".to_string(),
            write_subtitles: request.download_subs,
            write_auto_subtitles: request.download_subs,
            subtitle_languages: DEFAULT_SUBTITLE_LANGUAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            subtitle_format: "vtt/srt".to_string(),
            cookie_file: None,
            cookies_from_browser: None,
            proxy: None,
            socket_timeout: None,
            progress: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_cookie_file(mut self, path: PathBuf) -> Self {
        self.cookie_file = Some(path);
        self
    }

    pub fn with_cookies_from_browser(mut self, browser: impl Into<String>) -> Self {
        self.cookies_from_browser = Some(browser.into());
        self
    }

    pub fn with_subtitle_languages(mut self, languages: Vec<String>) -> Self {
        if !languages.is_empty() {
            self.subtitle_languages = languages;
        }
        self
    }

    pub fn with_network(mut self, network: &NetworkConfig) -> Self {
        self.proxy = network.proxy.clone();
        self.socket_timeout = network.timeout;
        self
    }

    pub fn with_progress(mut self, progress: Option<ProgressEmitter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn emit(&self, progress: DownloadProgress) {
        if let Some(emitter) = &self.progress {
            emitter.emit(progress);
        }
    }
}

fn output_template(output_dir: &Path) -> String {
    output_dir
        .join("%(title)s.%(ext)s")
        .to_string_lossy()
        .to_string()
}
