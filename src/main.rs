use anyhow::Result;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audio_archiver::locator::FFMPEG_DOWNLOAD_URL;
use audio_archiver::{BatchDriver, Cli, Config, TranscoderLocator, YtDlpAcquirer};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "audio_archiver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    println!("YouTube Audio Downloader (yt-dlp)");
    println!("--------------------------------");
    println!("Checking FFmpeg installation...");

    let locator = TranscoderLocator::from_env();
    let ffmpeg = match locator.locate() {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!("{}", err);
            println!("FFmpeg not found. Please install FFmpeg and add it to PATH.");
            println!("You can download it from: {}", FFMPEG_DOWNLOAD_URL);
            return Ok(ExitCode::FAILURE);
        }
    };
    tracing::debug!("FFmpeg located at {}", ffmpeg.display());

    let config = Config::load()?;

    if let Some(artist) = &cli.artist {
        println!("Received artist argument: {}", artist);
    }
    let output_dir = config.output_dir(cli.artist.as_deref());

    let acquirer = YtDlpAcquirer::new(&config, locator);
    if !acquirer.check_availability().await {
        eprintln!(
            "⚠️  {} is not available. Install it from https://github.com/yt-dlp/yt-dlp",
            config.tools.yt_dlp
        );
        eprintln!("   (Continuing anyway - every download will fail without it)");
    }

    let driver = BatchDriver::new(acquirer, config.paths.input_file.clone());
    if let Some(summary) = driver.run(&output_dir, cli.label()).await? {
        println!(
            "\n{} of {} URL(s) downloaded, {} file(s) tagged in {}",
            summary.succeeded,
            summary.total,
            summary.tagged,
            output_dir.display()
        );
        if !summary.failed.is_empty() {
            println!("{}", style("Failed URLs:").yellow());
            for url in &summary.failed {
                println!("  • {}", url);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
