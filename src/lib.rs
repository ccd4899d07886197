pub mod config;
pub mod downloader;

use std::path::Path;

use config::AppConfig;
use downloader::{
    DownloadError, DownloadRequest, DownloadResult, Downloader, ProgressEmitter, YtDlpEngine,
};

/// Download one URL, trying each access strategy in turn.
///
/// `output_dir` defaults to the current directory.
pub async fn download_with_strategies(
    url: &str,
    quality: &str,
    output_dir: Option<&Path>,
    download_subs: bool,
    config: &AppConfig,
    progress: Option<ProgressEmitter>,
) -> Result<(&'static str, DownloadResult), DownloadError> {
    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };

    let request = DownloadRequest::new(url, output_dir)
        .with_quality(quality)
        .with_subtitles(download_subs);

    let engine = match &config.ytdlp_path {
        Some(path) => YtDlpEngine::with_path(path.clone()),
        None => YtDlpEngine::new(),
    };

    let mut downloader = Downloader::new(engine)
        .with_cookies_path(config.resolved_cookies_path())
        .with_subtitle_languages(config.subtitle_languages.clone())
        .with_network(config.network.clone());
    if let Some(progress) = progress {
        downloader = downloader.with_progress(progress);
    }

    downloader.run(&request).await
}
