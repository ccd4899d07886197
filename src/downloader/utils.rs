// Helper functions shared by the engine, the controller and the CLI

use std::process::{ExitStatus, Stdio};

use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as TokioCommand;

use super::models::DownloadProgress;
use super::traits::EngineConfig;

/// Exit status plus the lines a process printed that were not consumed
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

/// Run a command to completion, reading both pipes line by line.
///
/// Lines are decoded lossily, so output in a non-UTF-8 locale never stops
/// the pipes from draining. `on_line` sees every line and returns `false`
/// for lines it consumed (progress) and `true` for lines to keep.
pub async fn run_streaming<F>(
    program: &str,
    args: &[String],
    on_line: F,
) -> Result<ProcessOutput, String>
where
    F: Fn(&str) -> bool + Sync,
{
    let mut child = TokioCommand::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("Failed to start {}: {}", program, e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| format!("Failed to capture stdout from {}", program))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| format!("Failed to capture stderr from {}", program))?;

    let (stdout, stderr) = tokio::join!(
        drain_lines(stdout, &on_line),
        drain_lines(stderr, &on_line)
    );

    let status = child
        .wait()
        .await
        .map_err(|e| format!("Failed to wait for {}: {}", program, e))?;

    Ok(ProcessOutput {
        status,
        stdout,
        stderr,
    })
}

async fn drain_lines<R, F>(pipe: R, on_line: &F) -> Vec<String>
where
    R: AsyncRead + Unpin,
    F: Fn(&str) -> bool,
{
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    let mut kept = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);
                if on_line(line) {
                    kept.push(line.to_string());
                }
            }
            Err(e) => {
                log::warn!("[Process] Pipe read failed: {}", e);
                break;
            }
        }
    }

    kept
}

/// Build proxy arguments for yt-dlp
pub fn get_proxy_args(config: &EngineConfig) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(proxy) = &config.proxy {
        args.push("--proxy".to_string());
        args.push(proxy.clone());
    }

    args
}

/// Build timeout arguments for yt-dlp
pub fn get_timeout_args(config: &EngineConfig) -> Vec<String> {
    let mut args = Vec::new();

    if let Some(timeout) = config.socket_timeout {
        args.push("--socket-timeout".to_string());
        args.push(timeout.to_string());
    }

    args
}

/// Parse yt-dlp progress line like:
/// [download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32 (frag 29/454)
pub fn parse_progress_line(line: &str) -> Option<DownloadProgress> {
    lazy_static::lazy_static! {
        static ref PROGRESS_RE: Regex = Regex::new(
            r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\S+/s))?(?:\s+ETA\s+(\S+))?(?:\s+\(frag\s+(\d+)/(\d+)\))?"
        ).unwrap();
        static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
        static ref MERGE_RE: Regex = Regex::new(r"\[Merger?\]\s+Merging").unwrap();
        static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
    }

    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let size = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
        let speed = caps.get(3).map(|m| m.as_str()).unwrap_or("N/A");
        let eta = caps.get(4).map(|m| m.as_str()).unwrap_or("");

        let status = match (caps.get(5), caps.get(6)) {
            (Some(fc), Some(ft)) => format!(
                "{:.1}% of {} @ {} ETA {} (frag {}/{})",
                percent,
                size,
                speed,
                eta,
                fc.as_str(),
                ft.as_str()
            ),
            _ if !eta.is_empty() => format!("{:.1}% of {} @ {} ETA {}", percent, size, speed, eta),
            _ => format!("{:.1}% of {} @ {}", percent, size, speed),
        };

        return Some(DownloadProgress { percent, status });
    }

    if let Some(caps) = DEST_RE.captures(line) {
        let filename = caps.get(1).map(|m| m.as_str()).unwrap_or("file");
        let short_name: String = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(filename)
            .chars()
            .take(50)
            .collect();
        return Some(DownloadProgress {
            percent: 0.0,
            status: format!("Starting: {}", short_name),
        });
    }

    if MERGE_RE.is_match(line) {
        return Some(DownloadProgress {
            percent: 99.0,
            status: "Merging video and audio...".to_string(),
        });
    }

    if ALREADY_RE.is_match(line) {
        return Some(DownloadProgress {
            percent: 100.0,
            status: "File already downloaded".to_string(),
        });
    }

    None
}

/// MM:SS, or HH:MM:SS from one hour up
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
