//! Runs the real ffmpeg backend when ffmpeg and ffprobe are on PATH.

use approx::assert_abs_diff_eq;
use chunked_stem_splitter::{
    ChunkSpec, Ffmpeg, MediaTool, Separator, SplitOptions, Splitter, ToolError,
};
use std::{f32::consts::PI, fs, path::Path, process::Command};
use tempfile::tempdir;

fn ffmpeg() -> Option<Ffmpeg> {
    let tools = Ffmpeg::new("ffmpeg", "ffprobe");
    let probe_ok = Command::new("ffprobe")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if tools.is_available() && probe_ok {
        Some(tools)
    } else {
        eprintln!("ffmpeg/ffprobe not found; skipping");
        None
    }
}

fn write_sine(path: &Path, secs: f32, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let frames = (secs * sample_rate as f32) as usize;
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let s = ((2.0 * PI * 440.0 * t).sin() * 0.4 * i16::MAX as f32) as i16;
        writer.write_sample(s).unwrap();
        writer.write_sample(-s).unwrap();
    }
    writer.finalize().unwrap();
}

/// Treats the whole chunk as every stem.
struct CopySeparator {
    stems: Vec<&'static str>,
}

impl Separator for CopySeparator {
    fn separate(&self, input: &Path, _model: &str, output_dir: &Path) -> Result<(), ToolError> {
        for stem in &self.stems {
            let dest = output_dir.join(format!("{stem}.wav"));
            fs::copy(input, &dest).map_err(|source| ToolError::Io { path: dest, source })?;
        }
        Ok(())
    }
}

#[test]
fn measures_and_extracts_exact_range() {
    let Some(tools) = ffmpeg() else { return };
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("tone.wav");
    write_sine(&src, 2.5, 8000);

    assert_abs_diff_eq!(tools.probe_duration(&src).unwrap(), 2.5, epsilon = 1e-3);

    let chunk = ChunkSpec {
        index: 2,
        start: 2.0,
        end: 2.5,
    };
    let dest = tmp.path().join("chunk.wav");
    tools.extract(&src, &chunk, &dest).unwrap();
    assert_abs_diff_eq!(tools.probe_duration(&dest).unwrap(), 0.5, epsilon = 1e-3);
}

#[test]
fn extract_from_missing_source_reports_tool_failure() {
    let Some(tools) = ffmpeg() else { return };
    let tmp = tempdir().unwrap();
    let chunk = ChunkSpec {
        index: 0,
        start: 0.0,
        end: 1.0,
    };
    let err = tools
        .extract(&tmp.path().join("absent.wav"), &chunk, &tmp.path().join("o.wav"))
        .unwrap_err();
    assert!(matches!(err, ToolError::Failed { .. }), "{err}");
}

#[test]
fn chunked_run_rejoins_to_source_length() {
    let Some(tools) = ffmpeg() else { return };
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("tone.wav");
    write_sine(&src, 2.5, 8000);

    let opts = SplitOptions {
        chunk_secs: 1.0,
        output_dir: tmp.path().join("out"),
        temp_root: Some(tmp.path().join("work")),
        ..SplitOptions::default()
    };
    let sep = CopySeparator {
        stems: vec!["vocals", "accompaniment"],
    };
    let res = Splitter::new(tools.clone(), sep, opts).run(&src).unwrap();

    assert_eq!(res.chunks, 3);
    for stem in &res.stems {
        assert!(stem.path.is_file());
        let secs = tools.probe_duration(&stem.path).unwrap();
        assert_abs_diff_eq!(secs, 2.5, epsilon = 0.01);
    }
    assert_eq!(
        res.stem_path("vocals").unwrap(),
        &tmp.path().join("out").join("tone_vocals.wav")
    );
}
