//! In-process stand-ins for ffmpeg and spleeter.
//!
//! "Audio" files here are text: the first line is the duration in seconds,
//! the remaining lines are a body that extraction, separation and joining
//! carry along, so tests can read back exactly which chunks ended up where.
#![allow(dead_code)]

use chunked_stem_splitter::{ChunkSpec, MediaTool, Separator, SplitOptions, ToolError};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    thread,
    time::Duration,
};

pub fn write_fake_audio(path: &Path, secs: f64, body: &str) {
    fs::write(path, format!("{secs}\n{body}")).unwrap();
}

pub fn read_fake_audio(path: &Path) -> (f64, Vec<String>) {
    let text = fs::read_to_string(path).unwrap();
    let mut lines = text.lines();
    let secs = lines.next().unwrap().parse().unwrap();
    (secs, lines.map(str::to_string).collect())
}

fn bad(path: &Path, detail: &str) -> ToolError {
    ToolError::BadOutput {
        command: format!("fake-probe {}", path.display()),
        detail: detail.into(),
    }
}

#[derive(Default)]
pub struct FakeMedia {
    /// Seconds added to every joined file, to trip duration verification.
    pub concat_skew: f64,
    /// Stem name whose join fails.
    pub fail_concat_for: Option<String>,
}

impl MediaTool for FakeMedia {
    fn probe_duration(&self, path: &Path) -> Result<f64, ToolError> {
        let text = fs::read_to_string(path).map_err(|e| bad(path, &e.to_string()))?;
        let first = text.lines().next().unwrap_or_default();
        first
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| *d > 0.0)
            .ok_or_else(|| bad(path, "no duration"))
    }

    fn extract(&self, _source: &Path, chunk: &ChunkSpec, dest: &Path) -> Result<(), ToolError> {
        write_fake_audio(dest, chunk.duration(), &format!("chunk {}", chunk.index));
        Ok(())
    }

    fn concat(&self, parts: &[PathBuf], list_file: &Path, dest: &Path) -> Result<(), ToolError> {
        let name = dest.file_name().unwrap().to_string_lossy().into_owned();
        if let Some(stem) = &self.fail_concat_for {
            if name.contains(&format!("_{stem}.")) {
                fs::write(dest, "partial").unwrap();
                return Err(ToolError::Failed {
                    command: format!("fake-concat {}", list_file.display()),
                    status: "exit status: 1".into(),
                    stderr: "Invalid data found when processing input".into(),
                });
            }
        }

        let mut total = self.concat_skew;
        let mut body = Vec::new();
        for part in parts {
            let (secs, lines) = read_fake_audio(part);
            total += secs;
            body.extend(lines);
        }
        write_fake_audio(dest, total, &body.join("\n"));
        Ok(())
    }
}

/// Writes `<stem>.<codec>` per stem, each tagged with the chunk it came from.
pub struct FakeSeparator {
    pub stems: Vec<String>,
    pub codec: String,
    /// (chunk index, stem) that is never written.
    pub omit: Option<(usize, String)>,
    /// Chunk index -> number of leading attempts that fail.
    pub flaky: Mutex<HashMap<usize, u32>>,
    /// Sleep `(max_index - index) * delay` so later chunks finish first.
    pub reverse_delay: Option<(usize, Duration)>,
}

impl FakeSeparator {
    pub fn new(stems: &[&str]) -> Self {
        Self {
            stems: stems.iter().map(|s| s.to_string()).collect(),
            codec: "wav".into(),
            omit: None,
            flaky: Mutex::new(HashMap::new()),
            reverse_delay: None,
        }
    }

    pub fn two_stem() -> Self {
        Self::new(&["vocals", "accompaniment"])
    }
}

impl Separator for FakeSeparator {
    fn separate(&self, input: &Path, _model: &str, output_dir: &Path) -> Result<(), ToolError> {
        let (secs, lines) = read_fake_audio(input);
        let tag = lines.first().cloned().unwrap_or_default();
        let index: usize = tag.trim_start_matches("chunk ").parse().unwrap();

        if let Some((max, delay)) = self.reverse_delay {
            thread::sleep(delay * (max.saturating_sub(index)) as u32);
        }

        {
            let mut flaky = self.flaky.lock().unwrap();
            if let Some(left) = flaky.get_mut(&index) {
                if *left > 0 {
                    *left -= 1;
                    return Err(ToolError::Failed {
                        command: format!("fake-separate {}", input.display()),
                        status: "exit status: 1".into(),
                        stderr: "CUDA out of memory".into(),
                    });
                }
            }
        }

        for stem in &self.stems {
            if self.omit.as_ref() == Some(&(index, stem.clone())) {
                continue;
            }
            let path = output_dir.join(format!("{stem}.{}", self.codec));
            write_fake_audio(&path, secs, &format!("{stem} of {tag}"));
        }
        Ok(())
    }
}

/// Options pointing every output under `root`, with fake-friendly defaults.
pub fn options_in(root: &Path, chunk_secs: f64) -> SplitOptions {
    SplitOptions {
        chunk_secs,
        output_dir: root.join("out"),
        temp_root: Some(root.join("work")),
        ..SplitOptions::default()
    }
}

pub fn entries(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(rd) => {
            let mut v: Vec<PathBuf> = rd.map(|e| e.unwrap().path()).collect();
            v.sort();
            v
        }
        Err(_) => Vec::new(),
    }
}
