// Access strategies and the fixed order they are tried in

use std::fmt;
use std::path::PathBuf;

use super::errors::DownloadError;
use super::format_selector::ANY_FORMAT;
use super::traits::EngineConfig;

/// Name of the cookie store looked up next to the install
pub const COOKIES_FILE_NAME: &str = "cookies.txt";

/// Browsers the engine can pull session cookies from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Firefox,
    Edge,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Edge => "edge",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One way of getting at the video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// No credentials
    Anonymous,
    /// Netscape cookies.txt
    CookieFile(PathBuf),
    /// Session cookies from a local browser profile
    BrowserCookies(Browser),
    /// Drop the quality constraint, take whatever format exists
    DegradedFormat,
}

impl Strategy {
    /// The fallback chain, in order
    pub fn default_chain(cookies_path: PathBuf) -> Vec<Strategy> {
        vec![
            Strategy::Anonymous,
            Strategy::CookieFile(cookies_path),
            Strategy::BrowserCookies(Browser::Chrome),
            Strategy::BrowserCookies(Browser::Firefox),
            Strategy::BrowserCookies(Browser::Edge),
            Strategy::DegradedFormat,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Anonymous => "direct",
            Strategy::CookieFile(_) => "cookies_file",
            Strategy::BrowserCookies(Browser::Chrome) => "browser_chrome",
            Strategy::BrowserCookies(Browser::Firefox) => "browser_firefox",
            Strategy::BrowserCookies(Browser::Edge) => "browser_edge",
            Strategy::DegradedFormat => "fallback",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Strategy::Anonymous => "Direct download (no cookies)".to_string(),
            Strategy::CookieFile(path) => format!("Cookies file: {}", path.display()),
            Strategy::BrowserCookies(browser) => format!("Cookies from {} browser", browser),
            Strategy::DegradedFormat => "Degraded download (any available format)".to_string(),
        }
    }

    /// Engine options for this strategy.
    ///
    /// `CookieFile` fails with `CookieStoreMissing` when the file is absent,
    /// before the engine is ever invoked.
    pub fn build_config(&self, base: &EngineConfig) -> Result<EngineConfig, DownloadError> {
        let config = base.clone();
        match self {
            Strategy::Anonymous => Ok(config),
            Strategy::CookieFile(path) => {
                if !path.is_file() {
                    return Err(DownloadError::CookieStoreMissing(path.clone()));
                }
                Ok(config.with_cookie_file(path.clone()))
            }
            Strategy::BrowserCookies(browser) => Ok(config.with_cookies_from_browser(browser.as_str())),
            Strategy::DegradedFormat => Ok(config.with_format(ANY_FORMAT)),
        }
    }
}

/// cookies.txt one level above the directory holding the executable
pub fn default_cookies_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(|bin| bin.parent()).map(|p| p.to_path_buf()))
        .map(|root| root.join(COOKIES_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(COOKIES_FILE_NAME))
}
