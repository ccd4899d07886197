// Error types for the strategy chain and the engine behind it

use std::path::PathBuf;

use thiserror::Error;

use super::diagnostics::{diagnose_error, BlockingReason};
use super::models::AttemptOutcome;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Sign-in / bot-detection gate. A stronger credential may get past it.
    #[error("{0}")]
    AuthenticationRequired(String),

    /// The video itself is gone; no strategy can fix this.
    #[error("{0}")]
    ResourceUnavailable(String),

    /// cookies.txt is not where the cookies_file strategy expects it
    #[error("Cookies file not found: {}", .0.display())]
    CookieStoreMissing(PathBuf),

    /// Any other failure reported by the engine
    #[error("{0}")]
    Engine(String),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Command execution failed
    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Every strategy failed, or the chain was aborted by a terminal error.
    #[error("All download strategies failed. Last error: {last_error}")]
    AllStrategiesFailed {
        last_error: String,
        attempts: Vec<AttemptOutcome>,
    },
}

impl DownloadError {
    /// Aggregate the attempts of one run into the final failure.
    pub fn all_failed(attempts: Vec<AttemptOutcome>) -> Self {
        let last_error = attempts
            .iter()
            .rev()
            .find_map(|a| a.error.clone())
            .unwrap_or_else(|| "no strategy was attempted".to_string());

        Self::AllStrategiesFailed {
            last_error,
            attempts,
        }
    }
}

// Engine stderr -> structured category. Markers live in diagnostics.
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        match diagnose_error(&s) {
            Some(BlockingReason::SignInRequired) | Some(BlockingReason::BotDetection) => {
                Self::AuthenticationRequired(s)
            }
            Some(BlockingReason::VideoUnavailable) => Self::ResourceUnavailable(s),
            None => Self::Engine(s),
        }
    }
}
