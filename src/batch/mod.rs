use anyhow::Result;
use console::style;
use std::path::{Path, PathBuf};

use crate::acquire::{AcquireOutcome, AudioAcquirer};
use crate::{tagging, utils, ArchiverError};

/// What a batch run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// URLs read from the input file
    pub total: usize,

    /// URLs archived successfully
    pub succeeded: usize,

    /// URLs that failed, in processing order
    pub failed: Vec<String>,

    /// Files whose album/artist tags were rewritten
    pub tagged: usize,
}

/// Runs the acquirer over every URL in the input file, then tags the output directory
pub struct BatchDriver<A> {
    acquirer: A,
    input_file: PathBuf,
}

impl<A: AudioAcquirer> BatchDriver<A> {
    pub fn new(acquirer: A, input_file: impl Into<PathBuf>) -> Self {
        Self {
            acquirer,
            input_file: input_file.into(),
        }
    }

    /// Process the whole input file into `output_dir`, tagging with `label` as both album
    /// and artist.
    ///
    /// Returns `Ok(None)` without downloading or tagging anything when the input file
    /// does not exist. Per-URL failures are reported and skipped; a tagging failure
    /// aborts the run.
    pub async fn run(&self, output_dir: &Path, label: &str) -> Result<Option<BatchSummary>> {
        fs_err::create_dir_all(output_dir)?;

        let urls = match read_url_list(&self.input_file)? {
            Some(urls) => urls,
            None => {
                println!(
                    "{} not found. Please create {} with one YouTube URL per line.",
                    self.input_file.display(),
                    self.input_file.display()
                );
                return Ok(None);
            }
        };

        println!("\nFound {}, processing URLs...", self.input_file.display());

        let mut summary = BatchSummary {
            total: urls.len(),
            ..Default::default()
        };

        for (idx, url) in urls.iter().enumerate() {
            println!("\nProcessing URL {} of {}: {}", idx + 1, summary.total, url);
            if !utils::is_web_url(url) {
                tracing::warn!("{} is not an http(s) URL, passing it to the extractor as-is", url);
            }

            match self.acquirer.acquire(url, output_dir).await {
                AcquireOutcome::Completed(info) => {
                    tracing::info!(
                        "Archived {} ({})",
                        url,
                        info.title.as_deref().unwrap_or("untitled")
                    );
                    summary.succeeded += 1;
                }
                AcquireOutcome::Failed(err) => {
                    tracing::debug!("{} failed: {}", url, err);
                    println!("{}", style(format!("Failed to download: {}", url)).red());
                    summary.failed.push(url.clone());
                }
            }
        }

        summary.tagged = tagging::finalize(output_dir, self.acquirer.extension(), label, label)?;

        Ok(Some(summary))
    }
}

/// Read the URL list: one entry per line, trimmed, blank lines dropped, order kept.
/// `Ok(None)` when the file does not exist.
pub fn read_url_list(path: &Path) -> Result<Option<Vec<String>>, ArchiverError> {
    if !path.exists() {
        return Ok(None);
    }

    let content =
        fs_err::read_to_string(path).map_err(|source| ArchiverError::InputUnreadable {
            path: path.display().to_string(),
            source,
        })?;

    Ok(Some(parse_url_list(&content)))
}

fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::{AcquireError, MediaInfo, MockAudioAcquirer};
    use crate::tagging::test_support::write_silent_mp3;
    use lofty::file::TaggedFileExt;
    use lofty::probe::Probe;
    use lofty::tag::{Accessor, TagType};
    use mockall::Sequence;

    fn completed(title: &str) -> AcquireOutcome {
        AcquireOutcome::Completed(MediaInfo {
            title: Some(title.to_string()),
            ..Default::default()
        })
    }

    fn write_links(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("links.txt");
        fs_err::write(&path, content).unwrap();
        path
    }

    fn expect_url(
        mock: &mut MockAudioAcquirer,
        seq: &mut Sequence,
        expected: &'static str,
        outcome: fn() -> AcquireOutcome,
    ) {
        mock.expect_acquire()
            .withf(move |url, _| url.to_string() == expected)
            .times(1)
            .in_sequence(seq)
            .returning(move |_, _| outcome());
    }

    #[test]
    fn test_parse_url_list() {
        let urls = parse_url_list("  https://a \n\n\t\nhttps://b\r\nhttps://a\n   ");
        assert_eq!(urls, vec!["https://a", "https://b", "https://a"]);
        assert!(parse_url_list("").is_empty());
    }

    #[test]
    fn test_read_url_list_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_url_list(&dir.path().join("links.txt")).unwrap(), None);
    }

    #[test]
    fn test_read_url_list_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.txt");
        fs_err::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        assert!(matches!(
            read_url_list(&path),
            Err(ArchiverError::InputUnreadable { .. })
        ));
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped_and_order_kept() {
        let dir = tempfile::tempdir().unwrap();
        let links = write_links(dir.path(), "https://one\n\nhttps://two\n");
        let output_dir = dir.path().join("musics");

        let mut mock = MockAudioAcquirer::new();
        let mut seq = Sequence::new();
        expect_url(&mut mock, &mut seq, "https://one", || completed("One"));
        expect_url(&mut mock, &mut seq, "https://two", || completed("Two"));
        mock.expect_extension().return_const("mp3");

        let summary = BatchDriver::new(mock, links)
            .run(&output_dir, "")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
        assert!(summary.failed.is_empty());
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let links = write_links(dir.path(), "https://bad\nhttps://good\nhttps://bad-again\n");
        let output_dir = dir.path().join("musics");

        let mut mock = MockAudioAcquirer::new();
        let mut seq = Sequence::new();
        expect_url(&mut mock, &mut seq, "https://bad", || {
            AcquireOutcome::Failed(AcquireError::MetadataUnavailable)
        });
        expect_url(&mut mock, &mut seq, "https://good", || completed("Good"));
        expect_url(&mut mock, &mut seq, "https://bad-again", || {
            AcquireOutcome::Failed(AcquireError::MetadataUnavailable)
        });
        mock.expect_extension().return_const("mp3");

        let summary = BatchDriver::new(mock, links)
            .run(&output_dir, "Bob")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, vec!["https://bad", "https://bad-again"]);
    }

    #[tokio::test]
    async fn test_missing_input_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("musics").join("Bob");
        write_silent_mp3(&dir.path().join("stray.mp3"));

        // No expectations: any acquire or extension call fails the test.
        let mock = MockAudioAcquirer::new();

        let result = BatchDriver::new(mock, dir.path().join("links.txt"))
            .run(&output_dir, "Bob")
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(output_dir.is_dir());
    }

    #[tokio::test]
    async fn test_downloaded_files_are_tagged_with_label() {
        let dir = tempfile::tempdir().unwrap();
        let links = write_links(dir.path(), "https://one\nhttps://two\n");
        let output_dir = dir.path().join("musics").join("Bob");

        let mut mock = MockAudioAcquirer::new();
        mock.expect_acquire().times(2).returning(|url, output_dir| {
            let name = if url.ends_with("one") { "One.mp3" } else { "Two.mp3" };
            write_silent_mp3(&output_dir.join(name));
            completed(name)
        });
        mock.expect_extension().return_const("mp3");

        let summary = BatchDriver::new(mock, links)
            .run(&output_dir, "Bob")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.tagged, 2);

        for name in ["One.mp3", "Two.mp3"] {
            let tagged_file = Probe::open(output_dir.join(name)).unwrap().read().unwrap();
            let tag = tagged_file.tag(TagType::Id3v2).unwrap();
            assert_eq!(tag.album().as_deref(), Some("Bob"));
            assert_eq!(tag.artist().as_deref(), Some("Bob"));
        }
    }

    #[tokio::test]
    async fn test_tagging_runs_even_when_every_url_fails() {
        let dir = tempfile::tempdir().unwrap();
        let links = write_links(dir.path(), "https://bad\n");
        let output_dir = dir.path().join("musics");
        fs_err::create_dir_all(&output_dir).unwrap();
        write_silent_mp3(&output_dir.join("Earlier Run.mp3"));

        let mut mock = MockAudioAcquirer::new();
        mock.expect_acquire()
            .times(1)
            .returning(|_, _| AcquireOutcome::Failed(AcquireError::MetadataUnavailable));
        mock.expect_extension().return_const("mp3");

        let summary = BatchDriver::new(mock, links)
            .run(&output_dir, "Bob")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.tagged, 1);
    }

    #[tokio::test]
    async fn test_tagging_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let links = write_links(dir.path(), "https://one\n");
        let output_dir = dir.path().join("musics");

        let mut mock = MockAudioAcquirer::new();
        mock.expect_acquire().times(1).returning(|_, output_dir| {
            fs_err::write(output_dir.join("Broken.mp3"), b"not audio").unwrap();
            completed("Broken")
        });
        mock.expect_extension().return_const("mp3");

        let result = BatchDriver::new(mock, links).run(&output_dir, "Bob").await;
        assert!(result.is_err());
    }
}
