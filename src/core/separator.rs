use crate::{
    core::command::run,
    error::ToolError,
    types::SplitOptions,
};
use std::{
    path::{Path, PathBuf},
    process::Command,
};

/// An external source-separation model.
///
/// Implementations must leave one `<stem>.<codec>` file per stem directly in
/// `output_dir`; the splitter checks for them afterwards.
pub trait Separator: Send + Sync {
    fn separate(&self, input: &Path, model: &str, output_dir: &Path) -> Result<(), ToolError>;
}

/// Spleeter's `separate` command.
#[derive(Debug, Clone)]
pub struct Spleeter {
    pub program: PathBuf,
    pub codec: String,
}

impl Spleeter {
    pub fn new(program: impl Into<PathBuf>, codec: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            codec: codec.into(),
        }
    }

    pub fn from_options(opts: &SplitOptions) -> Self {
        Self::new(&opts.separator, opts.codec.as_str())
    }
}

impl Separator for Spleeter {
    fn separate(&self, input: &Path, model: &str, output_dir: &Path) -> Result<(), ToolError> {
        // Flat `<stem>.<codec>` naming instead of spleeter's `<input>/<stem>` default.
        let mut cmd = Command::new(&self.program);
        cmd.arg("separate")
            .args(["-p", model])
            .arg("-o")
            .arg(output_dir)
            .args(["-c", self.codec.as_str()])
            .args(["-f", "{instrument}.{codec}"])
            .arg(input);
        run(&mut cmd)?;
        Ok(())
    }
}
