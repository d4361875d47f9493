use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::acquire::AudioFormat;

/// Name of the config file looked up in the working directory
const LOCAL_CONFIG_FILE: &str = "audio-archiver.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations
    pub paths: PathsConfig,

    /// Options handed to yt-dlp
    pub download: DownloadConfig,

    /// Target audio encoding
    pub audio: AudioConfig,

    /// External executables
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Newline-delimited URL list
    pub input_file: PathBuf,

    /// Root directory for downloads; the artist subdirectory is created below it
    pub output_root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// yt-dlp format selector
    pub format: String,

    /// yt-dlp output filename template
    pub output_template: String,

    /// Download and embed the video thumbnail
    pub write_thumbnail: bool,

    /// Retries for a whole item
    pub retries: u32,

    /// Retries for a single fragment
    pub fragment_retries: u32,

    /// Keep going when a fragment cannot be fetched
    pub skip_unavailable_fragments: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Target container/codec
    pub format: AudioFormat,

    /// Target bitrate, as understood by `--audio-quality`
    pub quality: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// yt-dlp executable (name on PATH or explicit path)
    pub yt_dlp: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("links.txt"),
            output_root: PathBuf::from("musics"),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            format: "bestaudio/best".to_string(),
            output_template: "%(title)s.%(ext)s".to_string(),
            write_thumbnail: true,
            retries: 10,
            fragment_retries: 10,
            skip_unavailable_fragments: true,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::Mp3,
            quality: "192K".to_string(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp: "yt-dlp".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults when there is none.
    /// The file is only read, never created.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!("Loading config from {}", path.display());

        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Get configuration file path, if one exists
    fn config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        let user_config = dirs::config_dir()?
            .join("audio-archiver")
            .join("config.yaml");
        user_config.exists().then_some(user_config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.download.format.trim().is_empty() {
            anyhow::bail!("download.format must not be empty");
        }
        if self.download.output_template.trim().is_empty() {
            anyhow::bail!("download.output_template must not be empty");
        }
        if self.audio.quality.trim().is_empty() {
            anyhow::bail!("audio.quality must not be empty");
        }
        if self.tools.yt_dlp.trim().is_empty() {
            anyhow::bail!("tools.yt_dlp must not be empty");
        }
        if self.paths.input_file.as_os_str().is_empty() {
            anyhow::bail!("paths.input_file must not be empty");
        }

        Ok(())
    }

    /// Output directory for a run: `<output_root>` or `<output_root>/<artist>`
    pub fn output_dir(&self, artist: Option<&str>) -> PathBuf {
        match artist {
            Some(artist) => self.paths.output_root.join(artist),
            None => self.paths.output_root.clone(),
        }
    }
}
