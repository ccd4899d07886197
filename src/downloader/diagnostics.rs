// Blocking diagnostics - decides what the strategy chain does after a failure
//
// Analyzes error messages to determine:
// - Whether the failure is an auth/bot gate (stronger credentials may help)
// - Whether the video itself is gone (stop trying)
// - Everything else (keep going, it may be strategy-specific)

use super::errors::DownloadError;

/// Reasons why a site might refuse a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingReason {
    /// "Sign in to confirm ..." gate
    SignInRequired,

    /// Bot detection triggered
    BotDetection,

    /// Video deleted or unavailable
    VideoUnavailable,
}

/// What the controller does after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainAction {
    Continue,
    Abort,
}

/// Analyze error message and return blocking reason, if any marker matches.
///
/// The auth markers are checked before the unavailable marker, so a message
/// carrying both keeps the chain going.
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    if error.contains("Sign in to confirm") {
        return Some(BlockingReason::SignInRequired);
    }

    if error.to_lowercase().contains("bot") {
        return Some(BlockingReason::BotDetection);
    }

    if error.contains("Video unavailable") {
        return Some(BlockingReason::VideoUnavailable);
    }

    None
}

/// Map a failed attempt onto the chain decision.
pub fn classify(error: &DownloadError) -> ChainAction {
    match error {
        DownloadError::ResourceUnavailable(_) => ChainAction::Abort,
        _ => ChainAction::Continue,
    }
}

/// Hint logged next to a failed attempt, if the failure has one.
pub fn hint_for(error: &DownloadError) -> Option<&'static str> {
    match error {
        DownloadError::AuthenticationRequired(_) => {
            Some("Authentication required, trying the next strategy...")
        }
        DownloadError::ResourceUnavailable(_) => Some("Video is unavailable, check the URL"),
        DownloadError::CookieStoreMissing(_) => {
            Some("No cookies.txt next to the install, skipping to browser cookies")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_sign_in_detection() {
        let error = "ERROR: [youtube] dQw4w9WgXcQ: Sign in to confirm you're not a bot";
        assert_eq!(diagnose_error(error), Some(BlockingReason::SignInRequired));
    }

    #[test]
    fn test_bot_detection_is_case_insensitive() {
        assert_eq!(
            diagnose_error("Suspected BOT traffic from your network"),
            Some(BlockingReason::BotDetection)
        );
    }

    #[test]
    fn test_unavailable_detection() {
        let error = "ERROR: [youtube] abc: Video unavailable. This video has been removed";
        assert_eq!(diagnose_error(error), Some(BlockingReason::VideoUnavailable));
    }

    #[test]
    fn test_auth_marker_wins_over_unavailable() {
        let error = "Video unavailable for bots";
        assert_eq!(diagnose_error(error), Some(BlockingReason::BotDetection));
    }

    #[test]
    fn test_no_marker() {
        assert_eq!(diagnose_error(""), None);
        assert_eq!(diagnose_error("timed out"), None);
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            classify(&DownloadError::AuthenticationRequired("x".into())),
            ChainAction::Continue
        );
        assert_eq!(
            classify(&DownloadError::ResourceUnavailable("x".into())),
            ChainAction::Abort
        );
        assert_eq!(
            classify(&DownloadError::Engine("HTTP Error 403".into())),
            ChainAction::Continue
        );
    }

    #[test]
    fn test_missing_cookie_file_keeps_chain_going() {
        let err = DownloadError::CookieStoreMissing(PathBuf::from("/opt/tool/cookies.txt"));
        assert_eq!(classify(&err), ChainAction::Continue);
        assert!(hint_for(&err).is_some());
    }
}
