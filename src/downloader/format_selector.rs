// FormatSelector - quality tag to yt-dlp format expression
//
// The strings are handed to the engine as-is. mp4/m4a are preferred so the
// merged output lands in the mp4 container without re-encoding.

/// Selector used by the `fallback` strategy: any single best format
pub const ANY_FORMAT: &str = "best";

/// Quality tags accepted on the command line
pub const QUALITY_TAGS: [&str; 5] = ["best", "1080p", "720p", "480p", "audio"];

pub struct FormatSelector;

impl FormatSelector {
    /// Get format spec for yt-dlp based on quality value.
    /// Unknown tags get the `best` expression.
    pub fn get_format_spec(quality: &str) -> &'static str {
        match quality {
            "best" => "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
            "1080p" => "bestvideo[ext=mp4][height<=1080]+bestaudio[ext=m4a]/best[ext=mp4][height<=1080]/best[height<=1080]",
            "720p" => "bestvideo[ext=mp4][height<=720]+bestaudio[ext=m4a]/best[ext=mp4][height<=720]/best[height<=720]",
            "480p" => "bestvideo[ext=mp4][height<=480]+bestaudio[ext=m4a]/best[ext=mp4][height<=480]/best[height<=480]",
            "audio" => "bestaudio[ext=m4a]/bestaudio/best",
            _ => Self::get_format_spec("best"),
        }
    }

    pub fn is_known_quality(quality: &str) -> bool {
        QUALITY_TAGS.contains(&quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_selectors() {
        assert_eq!(
            FormatSelector::get_format_spec("best"),
            "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best"
        );
        assert_eq!(
            FormatSelector::get_format_spec("1080p"),
            "bestvideo[ext=mp4][height<=1080]+bestaudio[ext=m4a]/best[ext=mp4][height<=1080]/best[height<=1080]"
        );
        assert_eq!(
            FormatSelector::get_format_spec("720p"),
            "bestvideo[ext=mp4][height<=720]+bestaudio[ext=m4a]/best[ext=mp4][height<=720]/best[height<=720]"
        );
        assert_eq!(
            FormatSelector::get_format_spec("480p"),
            "bestvideo[ext=mp4][height<=480]+bestaudio[ext=m4a]/best[ext=mp4][height<=480]/best[height<=480]"
        );
        assert_eq!(
            FormatSelector::get_format_spec("audio"),
            "bestaudio[ext=m4a]/bestaudio/best"
        );
    }

    #[test]
    fn test_unknown_tag_falls_back_to_best() {
        let best = FormatSelector::get_format_spec("best");
        assert_eq!(FormatSelector::get_format_spec("4k"), best);
        assert_eq!(FormatSelector::get_format_spec(""), best);
        assert_eq!(FormatSelector::get_format_spec("BEST"), best);
        assert!(!FormatSelector::is_known_quality("360p"));
    }
}
