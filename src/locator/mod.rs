use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::ArchiverError;

/// Where to get FFmpeg when it is neither bundled nor installed
pub const FFMPEG_DOWNLOAD_URL: &str = "https://ffmpeg.org/download.html";

/// Finds a usable FFmpeg executable.
///
/// The bundled copy next to the program wins over anything on the search path.
#[derive(Debug, Clone)]
pub struct TranscoderLocator {
    bundle_dir: PathBuf,
    search_path: Option<OsString>,
}

impl TranscoderLocator {
    /// Locator for the running process: bundle next to the executable, `PATH` from the environment
    pub fn from_env() -> Self {
        let bundle_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        Self::new(bundle_dir, std::env::var_os("PATH"))
    }

    pub fn new(bundle_dir: impl Into<PathBuf>, search_path: Option<OsString>) -> Self {
        Self {
            bundle_dir: bundle_dir.into(),
            search_path,
        }
    }

    /// Bundled location: `ffmpeg/ffmpeg.exe` on Windows, `ffmpeg` elsewhere
    pub fn bundled_path(&self) -> PathBuf {
        if cfg!(windows) {
            self.bundle_dir.join("ffmpeg").join("ffmpeg.exe")
        } else {
            self.bundle_dir.join("ffmpeg")
        }
    }

    fn executable_name() -> &'static str {
        if cfg!(windows) {
            "ffmpeg.exe"
        } else {
            "ffmpeg"
        }
    }

    /// Return the first FFmpeg found: bundled copy, then the first match on the search path
    pub fn locate(&self) -> Result<PathBuf, ArchiverError> {
        let bundled = self.bundled_path();
        if bundled.is_file() {
            tracing::debug!("Using bundled FFmpeg at {}", bundled.display());
            return Ok(bundled);
        }

        if let Some(found) = self.search() {
            tracing::debug!("Using FFmpeg from PATH at {}", found.display());
            return Ok(found);
        }

        Err(ArchiverError::TranscoderNotFound {
            bundled: bundled.display().to_string(),
            name: Self::executable_name().to_string(),
        })
    }

    fn search(&self) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        std::env::split_paths(search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.join(Self::executable_name()))
            .find(|candidate| is_executable(candidate))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
