//! Batch-wide album/artist tagging of finished audio files.

use anyhow::{Context, Result};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag, TagExt};
use std::path::{Path, PathBuf};

/// Audio files with `extension` directly inside `dir`, sorted by name. Not recursive.
pub fn audio_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs_err::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Overwrite the album and artist of one audio file.
///
/// Uses the container's native tag (ID3v2 for MP3). A file without that tag gets a
/// fresh, empty one. A file that cannot be parsed at all is an error.
pub fn set_album_metadata(path: &Path, album: &str, artist: &str) -> Result<()> {
    let mut tagged_file = Probe::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .options(ParseOptions::new())
        .read()
        .with_context(|| format!("Failed to read tags from {}", path.display()))?;

    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tracing::debug!("No {:?} tag in {}, creating one", tag_type, path.display());
        tagged_file.insert_tag(Tag::new(tag_type));
    }

    let tag = tagged_file
        .tag_mut(tag_type)
        .with_context(|| format!("No {:?} tag available for {}", tag_type, path.display()))?;

    tag.set_album(album.to_string());
    tag.set_artist(artist.to_string());
    tag.save_to_path(path, WriteOptions::default())
        .with_context(|| format!("Failed to write tags to {}", path.display()))?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!(
        "Album metadata set for {}: Album='{}', Artist='{}'",
        name, album, artist
    );

    Ok(())
}

/// Tag every matching file in `dir`. Stops at the first file that fails, leaving the
/// rest untouched. Returns the number of files tagged.
pub fn finalize(dir: &Path, extension: &str, album: &str, artist: &str) -> Result<usize> {
    let files = audio_files(dir, extension)?;
    tracing::debug!("Tagging {} file(s) in {}", files.len(), dir.display());

    for file in &files {
        set_album_metadata(file, album, artist)?;
    }

    Ok(files.len())
}
