use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod ytdlp;

pub use ytdlp::YtDlpAcquirer;

/// Metadata reported by the extractor before downloading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Title of the source video; also names the output file
    pub title: Option<String>,

    /// Duration in seconds
    pub duration: Option<f64>,

    /// Uploader or channel name
    pub uploader: Option<String>,

    /// Canonical page URL
    pub webpage_url: Option<String>,
}

/// Target audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    M4a,
    Opus,
    Flac,
}

impl AudioFormat {
    /// Value for yt-dlp's `--audio-format`
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Opus => "opus",
            AudioFormat::Flac => "flac",
        }
    }

    /// Extension of the files the transcoder produces
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

/// Why a single URL could not be archived
#[derive(thiserror::Error, Debug)]
pub enum AcquireError {
    #[error("could not retrieve info")]
    MetadataUnavailable,

    #[error(transparent)]
    TranscoderMissing(#[from] crate::ArchiverError),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("unexpected metadata from extractor: {0}")]
    InvalidMetadata(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result of archiving one URL
#[derive(Debug)]
pub enum AcquireOutcome {
    /// Audio downloaded, transcoded, and written to the output directory
    Completed(MediaInfo),
    /// Nothing usable was produced for this URL
    Failed(AcquireError),
}

/// Downloads and post-processes the audio of one URL into a directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioAcquirer: Send + Sync {
    /// Archive the audio of `url` into `output_dir`. Never panics or returns early on
    /// failure; every error is folded into [`AcquireOutcome::Failed`].
    async fn acquire(&self, url: &str, output_dir: &Path) -> AcquireOutcome;

    /// Extension of the files this acquirer leaves in the output directory
    fn extension(&self) -> &'static str;
}
