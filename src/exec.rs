//! Minimal external process execution.
//!
//! The engine itself never shells out; the only consumer is the template
//! renderer's `hostname` helper, which falls back to the `hostname` binary
//! when no environment variable is available.

use anyhow::{Context as _, Result};
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Whether the command exited successfully.
    pub success: bool,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            success: output.status.success(),
        }
    }
}

/// Run a command, allowing failure (returns the result without bailing).
///
/// # Errors
///
/// Returns an error only if the command could not be spawned at all.
pub fn run_unchecked(program: &str, args: &[&str]) -> Result<ExecResult> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to execute: {program}"))?;
    Ok(ExecResult::from(output))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn run_unchecked_captures_stdout() {
        let result = run_unchecked("echo", &["hello"]).unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn run_unchecked_reports_failure() {
        let result = run_unchecked("false", &[]).unwrap();
        assert!(!result.success);
    }

    #[test]
    fn run_unchecked_errors_on_missing_program() {
        assert!(run_unchecked("this-program-does-not-exist-12345", &[]).is_err());
    }
}
