//! Audio Archiver - A Rust CLI tool for archiving the audio track of video URLs
//!
//! This library reads a list of URLs, downloads the best available audio for each one
//! through yt-dlp, transcodes it with FFmpeg, and rewrites the album/artist tags of the
//! resulting files.

pub mod acquire;
pub mod batch;
pub mod cli;
pub mod config;
pub mod locator;
pub mod tagging;
pub mod utils;

pub use acquire::{AcquireOutcome, AudioAcquirer, MediaInfo, YtDlpAcquirer};
pub use batch::{BatchDriver, BatchSummary};
pub use cli::Cli;
pub use config::Config;
pub use locator::TranscoderLocator;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the archiver
#[derive(thiserror::Error, Debug)]
pub enum ArchiverError {
    #[error("FFmpeg not found (looked for {bundled} and `{name}` on PATH)")]
    TranscoderNotFound { bundled: String, name: String },

    #[error("Could not read URL list {path}: {source}")]
    InputUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
