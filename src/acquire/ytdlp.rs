use async_trait::async_trait;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{AcquireError, AcquireOutcome, AudioAcquirer, MediaInfo};
use crate::config::{AudioConfig, Config, DownloadConfig};
use crate::locator::TranscoderLocator;
use crate::utils;

/// Audio acquirer backed by the yt-dlp executable, with FFmpeg for post-processing
pub struct YtDlpAcquirer {
    yt_dlp_path: String,
    locator: TranscoderLocator,
    download: DownloadConfig,
    audio: AudioConfig,
}

impl YtDlpAcquirer {
    pub fn new(config: &Config, locator: TranscoderLocator) -> Self {
        Self {
            yt_dlp_path: config.tools.yt_dlp.clone(),
            locator,
            download: config.download.clone(),
            audio: config.audio.clone(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Query metadata only. `Ok(None)` when the extractor resolved nothing.
    async fn get_video_info(&self, url: &str) -> Result<Option<MediaInfo>, AcquireError> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(self.info_args(url))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| self.spawn_error(source))?;

        if !output.status.success() {
            return Err(self.tool_failed(output.status, &output.stderr));
        }

        parse_video_info(&String::from_utf8_lossy(&output.stdout))
    }

    /// Download, transcode, and embed thumbnail and metadata
    async fn download_audio(
        &self,
        url: &str,
        output_dir: &Path,
        ffmpeg: &Path,
    ) -> Result<(), AcquireError> {
        tracing::debug!("Downloading audio for {} into {}", url, output_dir.display());

        // Progress goes straight to the console; stderr is kept for the error report.
        let output = Command::new(&self.yt_dlp_path)
            .args(self.download_args(url, output_dir, ffmpeg))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| self.spawn_error(source))?;

        if !output.status.success() {
            return Err(self.tool_failed(output.status, &output.stderr));
        }

        let warnings = String::from_utf8_lossy(&output.stderr);
        if !warnings.trim().is_empty() {
            tracing::debug!("yt-dlp stderr for {}: {}", url, warnings.trim());
        }

        Ok(())
    }

    fn info_args(&self, url: &str) -> Vec<OsString> {
        vec![
            "--dump-single-json".into(),
            "-f".into(),
            self.download.format.clone().into(),
            "--abort-on-error".into(),
            "--".into(),
            url.into(),
        ]
    }

    /// Arguments for the download call. Post-processing runs as: extract audio,
    /// embed thumbnail, write metadata.
    pub(crate) fn download_args(&self, url: &str, output_dir: &Path, ffmpeg: &Path) -> Vec<OsString> {
        let mut home = OsString::from("home:");
        home.push(output_dir.as_os_str());

        let mut args: Vec<OsString> = vec![
            "-f".into(),
            self.download.format.clone().into(),
            "-P".into(),
            home,
            "-o".into(),
            self.download.output_template.clone().into(),
        ];

        if self.download.write_thumbnail {
            args.push("--write-thumbnail".into());
        }

        args.extend(
            [
                "--extract-audio",
                "--audio-format",
                self.audio.format.as_str(),
                "--audio-quality",
                self.audio.quality.as_str(),
            ]
            .map(OsString::from),
        );

        if self.download.write_thumbnail {
            args.push("--embed-thumbnail".into());
        }

        args.push("--embed-metadata".into());
        args.push("--ffmpeg-location".into());
        args.push(ffmpeg.as_os_str().to_os_string());
        args.push("--abort-on-error".into());

        let retries = self.download.retries.to_string();
        let fragment_retries = self.download.fragment_retries.to_string();
        args.extend(
            [
                "--retries",
                retries.as_str(),
                "--fragment-retries",
                fragment_retries.as_str(),
            ]
            .map(OsString::from),
        );

        args.push(if self.download.skip_unavailable_fragments {
            "--skip-unavailable-fragments".into()
        } else {
            "--abort-on-unavailable-fragments".into()
        });

        // Same title, same file name: later downloads replace earlier ones.
        args.push("--force-overwrites".into());
        args.push("--newline".into());
        args.push("--".into());
        args.push(url.into());

        args
    }

    async fn try_acquire(&self, url: &str, output_dir: &Path) -> Result<MediaInfo, AcquireError> {
        fs_err::create_dir_all(output_dir)?;

        let ffmpeg = self.locator.locate()?;

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.set_message("Getting video information...");
        progress.enable_steady_tick(Duration::from_millis(100));

        let info = self.get_video_info(url).await;
        progress.finish_and_clear();

        let info = info?.ok_or(AcquireError::MetadataUnavailable)?;

        println!("Title: {}", info.title.as_deref().unwrap_or("N/A"));
        if let Some(uploader) = &info.uploader {
            println!("Uploader: {}", uploader);
        }
        match info.duration {
            Some(seconds) => println!(
                "Duration: {} seconds ({})",
                seconds.round() as u64,
                utils::format_duration(seconds)
            ),
            None => println!("Duration: N/A"),
        }
        if let Some(domain) = info.webpage_url.as_deref().and_then(utils::extract_domain) {
            tracing::debug!("Source: {}", domain);
        }

        println!("\nStarting download...");
        self.download_audio(url, output_dir, &ffmpeg).await?;

        println!("\n{}", style("Download completed successfully!").green());
        println!("Saved to: {}", output_dir.display());

        Ok(info)
    }

    fn spawn_error(&self, source: std::io::Error) -> AcquireError {
        AcquireError::Spawn {
            program: self.yt_dlp_path.clone(),
            source,
        }
    }

    fn tool_failed(&self, status: std::process::ExitStatus, stderr: &[u8]) -> AcquireError {
        AcquireError::ToolFailed {
            program: self.yt_dlp_path.clone(),
            status,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}

/// Parse `--dump-single-json` output. An empty document or `null` means no info.
fn parse_video_info(stdout: &str) -> Result<Option<MediaInfo>, AcquireError> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str::<Option<MediaInfo>>(stdout)?)
}

#[async_trait]
impl AudioAcquirer for YtDlpAcquirer {
    async fn acquire(&self, url: &str, output_dir: &Path) -> AcquireOutcome {
        match self.try_acquire(url, output_dir).await {
            Ok(info) => AcquireOutcome::Completed(info),
            Err(err) => {
                println!(
                    "{}",
                    style(format!("An error occurred while processing {}: {}", url, err)).red()
                );
                tracing::debug!(?err, "acquire failed for {}", url);
                AcquireOutcome::Failed(err)
            }
        }
    }

    fn extension(&self) -> &'static str {
        self.audio.format.extension()
    }
}
