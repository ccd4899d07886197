// Downloader module - strategy chain over an external engine

pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod strategy;
pub mod traits;
pub mod utils;

pub use engine::YtDlpEngine;
pub use errors::DownloadError;
pub use format_selector::FormatSelector;
pub use models::{AttemptOutcome, DownloadProgress, DownloadRequest, DownloadResult, MediaInfo, NetworkConfig};
pub use orchestrator::Downloader;
pub use strategy::{Browser, Strategy};
pub use traits::{EngineConfig, ProgressEmitter, VideoEngine};
