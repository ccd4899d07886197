// Orchestrator with fallback logic
//
// Walks the strategy chain in order. The first success wins; a terminal
// failure (video gone) stops the chain; everything else moves on.

use std::path::PathBuf;

use super::diagnostics::{classify, hint_for, ChainAction};
use super::errors::DownloadError;
use super::models::{AttemptOutcome, DownloadRequest, DownloadResult, NetworkConfig};
use super::output::{ensure_output_dir, prepare_result};
use super::strategy::{default_cookies_path, Strategy};
use super::traits::{EngineConfig, ProgressEmitter, VideoEngine};
use super::utils::format_duration;

pub struct Downloader<E: VideoEngine> {
    engine: E,
    cookies_path: PathBuf,
    subtitle_languages: Vec<String>,
    network: NetworkConfig,
    progress: Option<ProgressEmitter>,
}

impl<E: VideoEngine> Downloader<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            cookies_path: default_cookies_path(),
            subtitle_languages: Vec::new(),
            network: NetworkConfig::default(),
            progress: None,
        }
    }

    pub fn with_cookies_path(mut self, path: PathBuf) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_subtitle_languages(mut self, languages: Vec<String>) -> Self {
        self.subtitle_languages = languages;
        self
    }

    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub fn with_progress(mut self, progress: ProgressEmitter) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Run the fallback chain for one URL.
    ///
    /// Returns the name of the strategy that succeeded with its result, or
    /// `AllStrategiesFailed` carrying the last attempt's error message.
    pub async fn run(
        &self,
        request: &DownloadRequest,
    ) -> Result<(&'static str, DownloadResult), DownloadError> {
        ensure_output_dir(&request.output_dir)?;

        log::info!(
            "[Downloader] url={} quality={} output={} subtitles={} engine={}",
            request.url,
            request.quality,
            request.output_dir.display(),
            request.download_subs,
            self.engine.name()
        );

        let base = EngineConfig::for_request(request)
            .with_subtitle_languages(self.subtitle_languages.clone())
            .with_network(&self.network)
            .with_progress(self.progress.clone());

        let mut attempts = Vec::new();

        for strategy in Strategy::default_chain(self.cookies_path.clone()) {
            let name = strategy.name();
            log::info!("[Downloader] Trying strategy: {}", name);

            match self.attempt(&strategy, request, &base).await {
                Ok(result) => {
                    log::info!("[Downloader] ✓ Strategy {} succeeded", name);
                    return Ok((name, result));
                }
                Err(e) => {
                    let message = e.to_string();
                    log::warn!("[Downloader] ✗ Strategy {} failed: {}", name, message);
                    attempts.push(AttemptOutcome::failed(name, message));

                    if let Some(hint) = hint_for(&e) {
                        log::info!("[Downloader]   {}", hint);
                    }

                    if classify(&e) == ChainAction::Abort {
                        log::warn!("[Downloader] Terminal error, not trying remaining strategies");
                        break;
                    }
                }
            }
        }

        Err(DownloadError::all_failed(attempts))
    }

    /// One strategy: build its options, probe, fetch, assemble the result.
    async fn attempt(
        &self,
        strategy: &Strategy,
        request: &DownloadRequest,
        base: &EngineConfig,
    ) -> Result<DownloadResult, DownloadError> {
        let config = strategy.build_config(base)?;
        log::info!("[Downloader] {}", strategy.description());

        let info = self.engine.probe(&request.url, &config).await?;
        log::info!("[Downloader]   Title: {}", info.title);
        log::info!("[Downloader]   Duration: {}", format_duration(info.duration));
        log::info!("[Downloader] Starting download...");

        let info = self.engine.fetch(&request.url, &config).await?;
        let reported = self.engine.prepare_filename(&info, &config);

        Ok(prepare_result(&reported, &info, request.download_subs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::MediaInfo;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const AUTH: &str = "ERROR: [youtube] abc: Sign in to confirm you're not a bot";
    const GONE: &str = "ERROR: [youtube] abc: Video unavailable";

    /// Engine that replays scripted probe and fetch outcomes, one per call.
    /// Probes succeed once their script runs out.
    struct ScriptedEngine {
        probes: Mutex<VecDeque<Result<(), String>>>,
        outcomes: Mutex<VecDeque<Result<MediaInfo, String>>>,
        probed: Mutex<usize>,
        seen: Mutex<Vec<EngineConfig>>,
    }

    impl ScriptedEngine {
        fn new(outcomes: Vec<Result<MediaInfo, String>>) -> Self {
            Self {
                probes: Mutex::new(VecDeque::new()),
                outcomes: Mutex::new(outcomes.into()),
                probed: Mutex::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn with_probes(self, probes: Vec<Result<(), String>>) -> Self {
            *self.probes.lock().unwrap() = probes.into();
            self
        }

        fn probes(&self) -> usize {
            *self.probed.lock().unwrap()
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl VideoEngine for ScriptedEngine {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn probe(&self, _url: &str, _config: &EngineConfig) -> Result<MediaInfo, DownloadError> {
            *self.probed.lock().unwrap() += 1;
            match self.probes.lock().unwrap().pop_front() {
                Some(Err(msg)) => Err(DownloadError::from(msg)),
                _ => Ok(media("probe")),
            }
        }

        async fn fetch(&self, _url: &str, config: &EngineConfig) -> Result<MediaInfo, DownloadError> {
            self.seen.lock().unwrap().push(config.clone());
            match self.outcomes.lock().unwrap().pop_front() {
                Some(Ok(info)) => Ok(info),
                Some(Err(msg)) => Err(DownloadError::from(msg)),
                None => Err(DownloadError::Engine("script exhausted".to_string())),
            }
        }

        fn prepare_filename(&self, info: &MediaInfo, config: &EngineConfig) -> PathBuf {
            PathBuf::from(config.output_template.replace("%(title)s.%(ext)s", &format!("{}.webm", info.title)))
        }
    }

    fn media(title: &str) -> MediaInfo {
        MediaInfo {
            title: title.to_string(),
            uploader: "Chan".to_string(),
            duration: 61,
            width: Some(640),
            height: Some(360),
            ..Default::default()
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        request: DownloadRequest,
    }

    fn fixture(with_cookies: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        if with_cookies {
            std::fs::write(dir.path().join("cookies.txt"), "# Netscape HTTP Cookie File\n").unwrap();
        }
        let request = DownloadRequest::new("https://youtu.be/abc", dir.path().join("out"));
        Fixture { dir, request }
    }

    fn downloader(engine: ScriptedEngine, fx: &Fixture) -> Downloader<ScriptedEngine> {
        Downloader::new(engine).with_cookies_path(fx.dir.path().join("cookies.txt"))
    }

    #[tokio::test]
    async fn test_first_success_stops_the_chain() {
        let fx = fixture(true);
        let engine = ScriptedEngine::new(vec![
            Err(AUTH.to_string()),
            Err(AUTH.to_string()),
            Ok(media("Talk")),
            Ok(media("never")),
        ]);
        let dl = downloader(engine, &fx);

        let (name, result) = dl.run(&fx.request).await.unwrap();
        assert_eq!(name, "browser_chrome");
        assert_eq!(result.title, "Talk");
        assert_eq!(result.video_path, fx.request.output_dir.join("Talk.webm"));
        assert_eq!(result.resolution, "640x360");
        assert_eq!(dl.engine().calls(), 3);
    }

    #[tokio::test]
    async fn test_unavailable_aborts_after_one_attempt() {
        let fx = fixture(true);
        let engine = ScriptedEngine::new(vec![Err(GONE.to_string()), Ok(media("never"))]);
        let dl = downloader(engine, &fx);

        match dl.run(&fx.request).await.unwrap_err() {
            DownloadError::AllStrategiesFailed { last_error, attempts } => {
                assert_eq!(last_error, GONE);
                assert_eq!(attempts.len(), 1);
                assert_eq!(attempts[0].strategy, "direct");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(dl.engine().calls(), 1);
    }

    #[tokio::test]
    async fn test_all_six_fail_reports_last_message() {
        let fx = fixture(true);
        let engine = ScriptedEngine::new(
            (1..=6).map(|i| Err(format!("ERROR: failure number {i}"))).collect(),
        );
        let dl = downloader(engine, &fx);

        match dl.run(&fx.request).await.unwrap_err() {
            DownloadError::AllStrategiesFailed { last_error, attempts } => {
                assert_eq!(last_error, "ERROR: failure number 6");
                let names: Vec<&str> = attempts.iter().map(|a| a.strategy.as_str()).collect();
                assert_eq!(
                    names,
                    [
                        "direct",
                        "cookies_file",
                        "browser_chrome",
                        "browser_firefox",
                        "browser_edge",
                        "fallback"
                    ]
                );
                assert!(attempts.iter().all(|a| !a.success));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(dl.engine().calls(), 6);
    }

    #[tokio::test]
    async fn test_missing_cookie_file_falls_through() {
        let fx = fixture(false);
        let engine = ScriptedEngine::new(vec![Err(AUTH.to_string()), Ok(media("Talk"))]);
        let dl = downloader(engine, &fx);

        let (name, _) = dl.run(&fx.request).await.unwrap();
        assert_eq!(name, "browser_chrome");
        // cookies_file never reached the engine
        assert_eq!(dl.engine().calls(), 2);
        assert_eq!(
            dl.engine().seen.lock().unwrap()[1].cookies_from_browser.as_deref(),
            Some("chrome")
        );
    }

    #[tokio::test]
    async fn test_strategy_configs_reach_engine() {
        let fx = fixture(true);
        let engine = ScriptedEngine::new(
            (1..=6).map(|_| Err("ERROR: HTTP Error 403: Forbidden".to_string())).collect(),
        );
        let dl = downloader(engine, &fx);
        let _ = dl.run(&fx.request.clone().with_quality("720p")).await;

        let seen = dl.engine().seen.lock().unwrap();
        assert!(seen[0].cookie_file.is_none() && seen[0].cookies_from_browser.is_none());
        assert_eq!(seen[1].cookie_file, Some(fx.dir.path().join("cookies.txt")));
        assert_eq!(seen[3].cookies_from_browser.as_deref(), Some("firefox"));
        assert_eq!(seen[4].cookies_from_browser.as_deref(), Some("edge"));
        assert!(seen[0].format.contains("height<=720"));
        assert_eq!(seen[5].format, "best");
    }

    #[tokio::test]
    async fn test_output_dir_created_before_first_attempt() {
        let fx = fixture(true);
        let engine = ScriptedEngine::new(vec![Ok(media("Talk"))]);
        let dl = downloader(engine, &fx);

        assert!(!fx.request.output_dir.exists());
        let (name, _) = dl.run(&fx.request).await.unwrap();
        assert_eq!(name, "direct");
        assert!(fx.request.output_dir.is_dir());
    }

    #[tokio::test]
    async fn test_probe_auth_failures_move_down_the_chain() {
        let fx = fixture(true);
        let engine = ScriptedEngine::new(vec![Ok(media("Talk"))])
            .with_probes(vec![Err(AUTH.to_string()), Err(AUTH.to_string())]);
        let dl = downloader(engine, &fx);

        let (name, result) = dl.run(&fx.request).await.unwrap();
        assert_eq!(name, "browser_chrome");
        assert_eq!(result.title, "Talk");
        assert_eq!(dl.engine().probes(), 3);
        // only the strategy that got past its probe fetched
        assert_eq!(dl.engine().calls(), 1);
        assert_eq!(
            dl.engine().seen.lock().unwrap()[0].cookies_from_browser.as_deref(),
            Some("chrome")
        );
    }

    #[tokio::test]
    async fn test_probe_unavailable_aborts_without_fetching() {
        let fx = fixture(true);
        let engine = ScriptedEngine::new(vec![Ok(media("never"))])
            .with_probes(vec![Err(GONE.to_string())]);
        let dl = downloader(engine, &fx);

        match dl.run(&fx.request).await.unwrap_err() {
            DownloadError::AllStrategiesFailed { last_error, attempts } => {
                assert_eq!(last_error, GONE);
                assert_eq!(attempts.len(), 1);
                assert_eq!(attempts[0].strategy, "direct");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(dl.engine().probes(), 1);
        assert_eq!(dl.engine().calls(), 0);
    }
}
