use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "audio-archiver",
    about = "Audio Archiver - Download the audio of every URL in links.txt as tagged MP3 files",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Artist name, used as the output subdirectory and as the album/artist tag
    #[arg(value_name = "ARTIST", allow_hyphen_values = true)]
    pub artist: Option<String>,

    /// Anything after the artist is ignored
    #[arg(hide = true, num_args = 0.., allow_hyphen_values = true)]
    pub ignored: Vec<String>,
}

impl Cli {
    /// The label written to both album and artist tags. Empty when no artist was given.
    pub fn label(&self) -> &str {
        self.artist.as_deref().unwrap_or("")
    }
}
