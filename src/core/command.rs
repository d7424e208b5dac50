use crate::error::ToolError;
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Lines of stderr kept when a tool fails.
const STDERR_TAIL_LINES: usize = 20;

/// Render a command the way a user would type it, for logs and errors.
pub fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| {
        let a = a.to_string_lossy();
        if a.is_empty() || a.contains(char::is_whitespace) {
            format!("'{a}'")
        } else {
            a.into_owned()
        }
    }));
    parts.join(" ")
}

/// Run to completion, capturing output. Non-zero exit becomes [`ToolError::Failed`].
pub fn run(cmd: &mut Command) -> Result<Output, ToolError> {
    let command = describe(cmd);
    debug!("» {command}");

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ToolError::Launch {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            command,
            status: output.status.to_string(),
            stderr: stderr_tail(&output.stderr),
        });
    }
    Ok(output)
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let skip = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[skip..].join("\n")
}
