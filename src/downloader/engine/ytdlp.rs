// yt-dlp engine - drives the native `yt-dlp` binary
//
// probe: `--dump-json` (simulate, nothing written)
// fetch: `--dump-json --no-simulate` so the info dict still comes back on
//        stdout while progress lines are streamed and forwarded

use std::path::PathBuf;
use std::process::Command as StdCommand;

use async_trait::async_trait;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::MediaInfo;
use crate::downloader::traits::{EngineConfig, VideoEngine};
use crate::downloader::utils::{
    get_proxy_args, get_timeout_args, parse_progress_line, run_streaming, ProcessOutput,
};

pub struct YtDlpEngine {
    ytdlp_path: String,
}

impl YtDlpEngine {
    pub fn new() -> Self {
        Self {
            ytdlp_path: Self::find_ytdlp(),
        }
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: path.into(),
        }
    }

    /// Find yt-dlp binary
    fn find_ytdlp() -> String {
        if let Ok(custom) = std::env::var("YTDLP_PATH") {
            if !custom.trim().is_empty() {
                return custom;
            }
        }

        let common_paths = [
            "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
            "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
            "/usr/bin/yt-dlp",          // System installation
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                return path.to_string();
            }
        }

        if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }

        "yt-dlp".to_string()
    }

    /// Arguments shared by probe and fetch
    pub fn build_args(&self, config: &EngineConfig) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            config.format.clone(),
            "-o".to_string(),
            config.output_template.clone(),
            "--merge-output-format".to_string(),
            config.merge_output_format.clone(),
            "--no-playlist".to_string(),
        ];

        if config.write_subtitles {
            args.push("--write-subs".to_string());
        }
        if config.write_auto_subtitles {
            args.push("--write-auto-subs".to_string());
        }
        if config.write_subtitles || config.write_auto_subtitles {
            args.push("--sub-langs".to_string());
            args.push(config.subtitle_languages.join(","));
            args.push("--sub-format".to_string());
            args.push(config.subtitle_format.clone());
        }

        // Cookies
        if let Some(path) = &config.cookie_file {
            args.push("--cookies".to_string());
            args.push(path.to_string_lossy().to_string());
        } else if let Some(browser) = &config.cookies_from_browser {
            args.push("--cookies-from-browser".to_string());
            args.push(browser.clone());
        }

        args.extend(get_proxy_args(config));
        args.extend(get_timeout_args(config));
        args
    }

    /// Turn a finished run into the info dict or a classified failure
    fn finish(output: ProcessOutput) -> Result<MediaInfo, DownloadError> {
        if !output.status.success() {
            return Err(DownloadError::from(Self::error_message(
                &output.stderr.join("\n"),
            )));
        }
        Self::parse_info(&output.stdout.join("\n"))
    }

    /// Last JSON object printed on stdout
    fn parse_info(stdout: &str) -> Result<MediaInfo, DownloadError> {
        let line = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| l.starts_with('{'))
            .ok_or_else(|| DownloadError::ParseError("No JSON in yt-dlp output".to_string()))?;

        let json: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| DownloadError::ParseError(format!("Invalid JSON: {}", e)))?;

        Ok(MediaInfo::from_json(&json))
    }

    /// Short, classifiable message from yt-dlp stderr
    fn error_message(stderr: &str) -> String {
        let errors: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with("ERROR:"))
            .collect();

        if !errors.is_empty() {
            return errors.join("\n");
        }

        let trimmed = stderr.trim();
        if trimmed.is_empty() {
            "yt-dlp exited with an error and no output".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoEngine for YtDlpEngine {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn probe(&self, url: &str, config: &EngineConfig) -> Result<MediaInfo, DownloadError> {
        let mut args = self.build_args(config);
        args.push("--dump-json".to_string());
        args.push(url.to_string());

        log::debug!("[yt-dlp] Probe: {} {}", self.ytdlp_path, args.join(" "));

        let output = run_streaming(&self.ytdlp_path, &args, |_| true)
            .await
            .map_err(DownloadError::ExecutionError)?;

        Self::finish(output)
    }

    async fn fetch(&self, url: &str, config: &EngineConfig) -> Result<MediaInfo, DownloadError> {
        let mut args = self.build_args(config);
        args.extend([
            "--dump-json".to_string(),
            "--no-simulate".to_string(),
            "--newline".to_string(),
            "--progress".to_string(),
            url.to_string(),
        ]);

        log::debug!("[yt-dlp] Fetch: {} {}", self.ytdlp_path, args.join(" "));

        // Progress may land on either stream depending on yt-dlp's quiet mode.
        let output = run_streaming(&self.ytdlp_path, &args, |line| {
            if let Some(progress) = parse_progress_line(line) {
                config.emit(progress);
                return false;
            }
            if line.contains("[Merger]") {
                log::debug!("[yt-dlp] {}", line);
            }
            true
        })
        .await
        .map_err(DownloadError::ExecutionError)?;

        Self::finish(output)
    }

    fn prepare_filename(&self, info: &MediaInfo, config: &EngineConfig) -> PathBuf {
        if let Some(filename) = &info.filename {
            return PathBuf::from(filename);
        }

        let title = sanitize_filename(&info.title);
        let ext = info.ext.as_deref().unwrap_or(config.merge_output_format.as_str());
        PathBuf::from(
            config
                .output_template
                .replace("%(title)s", &title)
                .replace("%(ext)s", ext),
        )
    }
}

/// Replace characters yt-dlp would not keep in a file name
fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
