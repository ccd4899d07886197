use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use log::{error, info};

use smart_video_dl_lib::config::AppConfig;
use smart_video_dl_lib::download_with_strategies;
use smart_video_dl_lib::downloader::format_selector::QUALITY_TAGS;
use smart_video_dl_lib::downloader::utils::format_duration;
use smart_video_dl_lib::downloader::{DownloadProgress, DownloadResult, FormatSelector, ProgressEmitter};

const BAR_LENGTH: usize = 30;

/// Set while the progress bar owns an unterminated stderr line
static BAR_OPEN: AtomicBool = AtomicBool::new(false);

#[derive(Parser, Debug)]
#[command(name = "smart-video-dl", version, about = "Download a video, retrying with cookies until one way works")]
struct Cli {
    /// Video URL
    url: String,

    /// best, 1080p, 720p, 480p or audio
    #[arg(default_value = "best")]
    quality: String,

    /// Output directory (defaults to the current directory)
    output_dir: Option<PathBuf>,

    /// "true" to also download subtitles
    download_subs: Option<String>,

    /// Config file (defaults to <config dir>/smart-video-dl/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .format(|buf, record| {
            if BAR_OPEN.swap(false, Ordering::SeqCst) {
                writeln!(buf)?;
            }
            writeln!(buf, "[{}] {}", record.level(), record.args())
        })
        .init();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if !FormatSelector::is_known_quality(&cli.quality) {
        info!(
            "Unknown quality '{}', using best (choose from {})",
            cli.quality,
            QUALITY_TAGS.join(", ")
        );
    }

    let download_subs = cli
        .download_subs
        .as_deref()
        .map_or(false, |v| v.eq_ignore_ascii_case("true"));

    let result = download_with_strategies(
        &cli.url,
        &cli.quality,
        cli.output_dir.as_deref(),
        download_subs,
        &config,
        Some(ProgressEmitter::new(render_progress)),
    )
    .await;

    match result {
        Ok((strategy, result)) => {
            print_summary(strategy, &result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("\nDownload failed: {}", e);
            eprintln!("\nSuggestions:");
            eprintln!("   1. Check that the URL is correct");
            eprintln!("   2. Make sure the video is public");
            eprintln!("   3. Sign in to the site in your browser");
            eprintln!("   4. Check your network connection");
            ExitCode::FAILURE
        }
    }
}

fn render_progress(progress: DownloadProgress) {
    let percent = progress.percent.clamp(0.0, 100.0);
    let filled = (BAR_LENGTH as f32 * percent / 100.0) as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_LENGTH - filled));

    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "\r   [{}] {}", bar, progress.status);
    if percent >= 100.0 {
        let _ = writeln!(stderr);
        BAR_OPEN.store(false, Ordering::SeqCst);
    } else {
        BAR_OPEN.store(true, Ordering::SeqCst);
    }
    let _ = stderr.flush();
}

fn size_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

fn print_summary(strategy: &str, result: &DownloadResult) {
    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!("Download succeeded");
    println!("{}", rule);
    println!("\nStrategy: {}", strategy);
    println!("\nFile:");
    println!("   Title: {}", result.title);
    println!("   Path: {}", result.video_path.display());
    println!("   Size: {:.1} MB", size_mb(result.file_size));
    println!("   Duration: {}", format_duration(result.duration));
    println!("   Resolution: {}", result.resolution);
    println!("   Uploader: {}", result.uploader);

    if !result.subtitle_files.is_empty() {
        println!("\nSubtitles:");
        for sub in &result.subtitle_files {
            let name = sub.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            println!("   - {}", name);
        }
    }

    let mut json = match serde_json::to_value(result) {
        Ok(json) => json,
        Err(e) => {
            error!("Cannot serialize result: {}", e);
            return;
        }
    };
    if let Some(obj) = json.as_object_mut() {
        obj.insert("success".to_string(), serde_json::Value::Bool(true));
        obj.insert("strategy".to_string(), serde_json::Value::from(strategy));
    }

    println!("\n{}", rule);
    println!("Result (JSON):");
    match serde_json::to_string_pretty(&json) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("Cannot serialize result: {}", e),
    }
}
