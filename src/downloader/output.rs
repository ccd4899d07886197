// Output directory handling and result assembly after a successful fetch

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::DownloadError;
use super::models::{DownloadResult, MediaInfo};

/// Container the engine merges into
pub const CANONICAL_EXTENSION: &str = "mp4";

pub const SUBTITLE_EXTENSIONS: [&str; 2] = ["vtt", "srt"];

/// Create the output directory. Safe to call repeatedly.
pub fn ensure_output_dir(dir: &Path) -> Result<(), DownloadError> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Prefer an `.mp4` sibling when the engine reported another container.
pub fn resolve_media_path(reported: &Path) -> PathBuf {
    let is_canonical = reported
        .extension()
        .map_or(false, |ext| ext == CANONICAL_EXTENSION);

    if !is_canonical {
        let sibling = reported.with_extension(CANONICAL_EXTENSION);
        if sibling.exists() {
            return sibling;
        }
    }

    reported.to_path_buf()
}

/// Subtitle files next to the media sharing its base name, sorted by path.
pub fn find_subtitles(media: &Path) -> Vec<PathBuf> {
    let (Some(dir), Some(stem)) = (media.parent(), media.file_stem()) else {
        return Vec::new();
    };
    let prefix = format!("{}.", stem.to_string_lossy());

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("[Output] Cannot scan {} for subtitles: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut subtitles: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let name_matches = path
                .file_name()
                .map_or(false, |n| n.to_string_lossy().starts_with(&prefix));
            let ext_matches = path
                .extension()
                .map_or(false, |ext| SUBTITLE_EXTENSIONS.iter().any(|s| ext == *s));
            name_matches && ext_matches && path.is_file()
        })
        .collect();

    subtitles.sort();
    subtitles
}

pub fn prepare_result(reported: &Path, info: &MediaInfo, download_subs: bool) -> DownloadResult {
    let video_path = resolve_media_path(reported);
    let file_size = fs::metadata(&video_path).map(|m| m.len()).unwrap_or(0);

    let subtitle_files = if download_subs {
        find_subtitles(&video_path)
    } else {
        Vec::new()
    };

    DownloadResult {
        video_path,
        title: info.title.clone(),
        duration: info.duration,
        file_size,
        subtitle_files,
        resolution: info.resolution(),
        uploader: info.uploader.clone(),
    }
}
