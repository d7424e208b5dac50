use std::{env, path::PathBuf};

pub const FFMPEG_ENV: &str = "CHUNKED_SPLITTER_FFMPEG";
pub const FFPROBE_ENV: &str = "CHUNKED_SPLITTER_FFPROBE";
pub const SEPARATOR_ENV: &str = "CHUNKED_SPLITTER_SEPARATOR";

/// Executable for an external tool: the env override if set, else `fallback` on `PATH`.
pub fn tool_path(var: &str, fallback: &str) -> PathBuf {
    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(fallback))
}
