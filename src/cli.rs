//! Command-line arguments and their mapping onto [`SplitOptions`].

use crate::types::{SplitOptions, DEFAULT_CHUNK_SECS, DEFAULT_MODEL};
use clap::Parser;
use std::path::PathBuf;

/// Separate long recordings into stems chunk by chunk.
///
/// The input is cut into chunks with ffmpeg, each chunk is run through the
/// separation model, and the per-chunk stems are joined back losslessly into
/// `<output-dir>/<input name>_<stem>.<codec>`.
#[derive(Parser, Debug)]
#[command(name = "chunked-splitter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input audio file
    #[arg(value_name = "INPUT", required_unless_present = "list_models")]
    pub input: Option<PathBuf>,

    /// Chunk length in seconds
    #[arg(short = 'c', long = "chunk", value_name = "SECS", default_value_t = DEFAULT_CHUNK_SECS, allow_negative_numbers = true)]
    pub chunk: f64,

    /// Final output directory
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Separation model identifier
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Stem names the model writes (comma separated); defaults to the model's registry entry
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub stems: Option<Vec<String>>,

    /// Audio format of the stem files
    #[arg(long, default_value = "wav")]
    pub codec: String,

    /// Keep per-chunk temporary directories
    #[arg(long)]
    pub keep_temp: bool,

    /// Parent directory for temporary chunk data (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Chunks to process in parallel; keep at 1 when the model needs the whole GPU
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub jobs: usize,

    /// Extra separation attempts per chunk before giving up
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub retries: u32,

    /// Skip checking joined stem durations against their chunks
    #[arg(long)]
    pub no_verify: bool,

    /// ffmpeg executable
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe executable
    #[arg(long, value_name = "PATH")]
    pub ffprobe: Option<PathBuf>,

    /// Separator executable, e.g. the `spleeter` inside a virtualenv
    #[arg(long, value_name = "PATH")]
    pub separator: Option<PathBuf>,

    /// Print the chunk plan and exit without processing
    #[arg(long)]
    pub dry_run: bool,

    /// List known models and their stems
    #[arg(long)]
    pub list_models: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors and the output paths
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn to_options(&self) -> SplitOptions {
        let defaults = SplitOptions::default();
        SplitOptions {
            chunk_secs: self.chunk,
            output_dir: self.output_dir.clone(),
            model: self.model.clone(),
            stems: self.stems.clone(),
            codec: self.codec.clone(),
            keep_temp: self.keep_temp,
            temp_root: self.temp_dir.clone(),
            jobs: self.jobs,
            retries: self.retries,
            verify_durations: !self.no_verify,
            ffmpeg: self.ffmpeg.clone().unwrap_or(defaults.ffmpeg),
            ffprobe: self.ffprobe.clone().unwrap_or(defaults.ffprobe),
            separator: self.separator.clone().unwrap_or(defaults.separator),
        }
    }

    /// Default log filter for the verbosity flags; `RUST_LOG` wins over it.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
