use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// Pipeline stage an external tool failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Planning,
    Extraction,
    Separation,
    Concatenation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Planning => "planning",
            Stage::Extraction => "extraction",
            Stage::Separation => "separation",
            Stage::Concatenation => "concatenation",
        })
    }
}

/// A single external command that did not do what was asked of it.
///
/// Tool backends return this without knowing which stage or chunk they
/// serve; the splitter attaches that context when wrapping it in
/// [`SplitError::ExternalTool`].
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {status}{}", stderr_suffix(.stderr))]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`{command}` produced unusable output: {detail}")]
    BadOutput { command: String, detail: String },

    #[error("expected output is missing: {}", .path.display())]
    MissingOutput { path: PathBuf },

    #[error(
        "{} lasts {actual:.3}s but its parts sum to {expected:.3}s",
        .path.display()
    )]
    DurationMismatch {
        path: PathBuf,
        expected: f64,
        actual: f64,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Central error type for the chunked-stem-splitter crate.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{stage} failed{}: {source}", chunk_label(.chunk))]
    ExternalTool {
        stage: Stage,
        chunk: Option<usize>,
        #[source]
        source: ToolError,
    },

    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SplitError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SplitError::InvalidInput(msg.into())
    }

    pub fn tool(stage: Stage, chunk: Option<usize>, source: ToolError) -> Self {
        SplitError::ExternalTool {
            stage,
            chunk,
            source,
        }
    }

    pub fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SplitError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Stage the error is attributed to, if it came from an external tool.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SplitError::ExternalTool { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Chunk index the error is attributed to, if any.
    pub fn chunk(&self) -> Option<usize> {
        match self {
            SplitError::ExternalTool { chunk, .. } => *chunk,
            _ => None,
        }
    }

    /// Process exit code used by the CLI for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            SplitError::InvalidInput(_) => 2,
            SplitError::ExternalTool { .. } => 3,
            SplitError::Filesystem { .. } => 4,
        }
    }
}

fn chunk_label(chunk: &Option<usize>) -> String {
    match chunk {
        Some(i) => format!(" for chunk {i}"),
        None => String::new(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;
