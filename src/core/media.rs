//! Media tool backend: duration probing, range extraction, lossless joins.

use crate::{
    core::command::{describe, run},
    error::ToolError,
    types::{ChunkSpec, SplitOptions},
};
use serde::Deserialize;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    process::Command,
};

pub trait MediaTool: Send + Sync {
    /// Duration of `path` in seconds.
    fn probe_duration(&self, path: &Path) -> Result<f64, ToolError>;

    /// Write exactly `[chunk.start, chunk.end)` of `source` to `dest`.
    fn extract(&self, source: &Path, chunk: &ChunkSpec, dest: &Path) -> Result<(), ToolError>;

    /// Join `parts` in order into `dest` without re-encoding. `list_file` is
    /// scratch space the backend may use for its own input manifest.
    fn concat(&self, parts: &[PathBuf], list_file: &Path, dest: &Path) -> Result<(), ToolError>;
}

/// ffmpeg/ffprobe driven through their command lines.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

#[derive(Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl Ffmpeg {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn from_options(opts: &SplitOptions) -> Self {
        Self::new(&opts.ffmpeg, &opts.ffprobe)
    }

    /// True if `ffmpeg -version` runs.
    pub fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg)
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn ffmpeg_cmd(&self) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-nostdin", "-hide_banner", "-v", "error", "-y"]);
        cmd
    }

    // -ss before -i seeks the input instead of decoding up to the start.
    // Transcoding keeps it sample accurate since -accurate_seek is the default.
    fn extract_cmd(&self, source: &Path, chunk: &ChunkSpec, dest: &Path) -> Command {
        let mut cmd = self.ffmpeg_cmd();
        cmd.arg("-ss")
            .arg(format!("{:.6}", chunk.start))
            .arg("-i")
            .arg(source)
            .arg("-t")
            .arg(format!("{:.6}", chunk.duration()))
            .args(["-vn", "-map", "0:a:0", "-c:a", "pcm_f32le"])
            .arg(dest);
        cmd
    }
}

impl MediaTool for Ffmpeg {
    fn probe_duration(&self, path: &Path) -> Result<f64, ToolError> {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(path);
        let command = describe(&cmd);
        let out = run(&mut cmd)?;

        let parsed: ProbeOutput =
            serde_json::from_slice(&out.stdout).map_err(|e| ToolError::BadOutput {
                command: command.clone(),
                detail: e.to_string(),
            })?;
        let raw = parsed.format.duration.ok_or_else(|| ToolError::BadOutput {
            command: command.clone(),
            detail: "no duration reported".into(),
        })?;
        let secs: f64 = raw.trim().parse().map_err(|_| ToolError::BadOutput {
            command: command.clone(),
            detail: format!("unparsable duration `{raw}`"),
        })?;

        if !(secs.is_finite() && secs > 0.0) {
            return Err(ToolError::BadOutput {
                command,
                detail: format!("non-positive duration {secs}"),
            });
        }
        Ok(secs)
    }

    fn extract(&self, source: &Path, chunk: &ChunkSpec, dest: &Path) -> Result<(), ToolError> {
        run(&mut self.extract_cmd(source, chunk, dest))?;

        if !dest.is_file() {
            return Err(ToolError::MissingOutput {
                path: dest.to_path_buf(),
            });
        }
        Ok(())
    }

    fn concat(&self, parts: &[PathBuf], list_file: &Path, dest: &Path) -> Result<(), ToolError> {
        write_concat_list(parts, list_file)?;

        let mut cmd = self.ffmpeg_cmd();
        cmd.args(["-f", "concat", "-safe", "0", "-i"])
            .arg(list_file)
            .args(["-c", "copy"])
            .arg(dest);
        run(&mut cmd)?;

        if !dest.is_file() {
            return Err(ToolError::MissingOutput {
                path: dest.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// Concat-demuxer manifest: one `file '<abs path>'` line per part.
fn write_concat_list(parts: &[PathBuf], list_file: &Path) -> Result<(), ToolError> {
    let io_err = |source| ToolError::Io {
        path: list_file.to_path_buf(),
        source,
    };

    let mut body = String::new();
    for part in parts {
        let abs = fs::canonicalize(part).map_err(|source| ToolError::Io {
            path: part.clone(),
            source,
        })?;
        body.push_str(&concat_entry(&abs));
        body.push('\n');
    }

    let mut f = fs::File::create(list_file).map_err(io_err)?;
    f.write_all(body.as_bytes()).map_err(io_err)?;
    f.flush().map_err(io_err)
}

fn concat_entry(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{escaped}'")
}
