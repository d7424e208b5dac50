use std::path::PathBuf;

use crate::utils::{tool_path, FFMPEG_ENV, FFPROBE_ENV, SEPARATOR_ENV};

/// Default chunk length in seconds.
pub const DEFAULT_CHUNK_SECS: f64 = 600.0;

/// Default separation model (two stems: vocals + accompaniment).
pub const DEFAULT_MODEL: &str = "spleeter:2stems";

/// One contiguous time slice of the source, `[start, end)` in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkSpec {
    pub index: usize,
    pub start: f64,
    pub end: f64,
}

impl ChunkSpec {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Result of probing and planning an input without processing it.
#[derive(Clone, Debug)]
pub struct ChunkPlan {
    pub total_duration: f64,
    pub chunk_length: f64,
    pub chunks: Vec<ChunkSpec>,
}

/// Run configuration. Every field has a documented default, see [`Default`].
#[derive(Clone, Debug)]
pub struct SplitOptions {
    /// Chunk length in seconds. Default 600.
    pub chunk_secs: f64,
    /// Directory receiving one file per stem. Default `output`.
    pub output_dir: PathBuf,
    /// Separation model identifier. Default `spleeter:2stems`.
    pub model: String,
    /// Stem names to expect; `None` resolves them from the model registry.
    pub stems: Option<Vec<String>>,
    /// File format the separator writes and the stems are joined in. Default `wav`.
    pub codec: String,
    /// Keep the per-chunk work directory after the run. Default off.
    pub keep_temp: bool,
    /// Parent directory of the work directory. Default: the system temp dir.
    pub temp_root: Option<PathBuf>,
    /// Chunks processed concurrently. Default 1, since most separators hold
    /// the whole model on one GPU.
    pub jobs: usize,
    /// Extra separation attempts per chunk after a failure. Default 0.
    pub retries: u32,
    /// Check concatenated stem durations against the sum of their parts. Default on.
    pub verify_durations: bool,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub separator: PathBuf,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            chunk_secs: DEFAULT_CHUNK_SECS,
            output_dir: PathBuf::from("output"),
            model: DEFAULT_MODEL.into(),
            stems: None,
            codec: "wav".into(),
            keep_temp: false,
            temp_root: None,
            jobs: 1,
            retries: 0,
            verify_durations: true,
            ffmpeg: tool_path(FFMPEG_ENV, "ffmpeg"),
            ffprobe: tool_path(FFPROBE_ENV, "ffprobe"),
            separator: tool_path(SEPARATOR_ENV, "spleeter"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StemOutput {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct SplitResult {
    /// Final stem files, in model stem order.
    pub stems: Vec<StemOutput>,
    pub chunks: usize,
    pub duration: f64,
}

impl SplitResult {
    pub fn stem_path(&self, name: &str) -> Option<&PathBuf> {
        self.stems.iter().find(|s| s.name == name).map(|s| &s.path)
    }
}
