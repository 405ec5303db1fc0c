//! Blocking process execution.

use std::process::Command;

use super::error::AdapterError;

/// Captured result of one finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

impl ProcessOutput {
    /// True when the process exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an argument vector to completion.
pub trait ProcessExecutor {
    /// Execute `argv` (program first), block until exit and capture output.
    fn execute(&self, argv: &[String]) -> Result<ProcessOutput, AdapterError>;
}

/// [`ProcessExecutor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl ProcessExecutor for SystemExecutor {
    fn execute(&self, argv: &[String]) -> Result<ProcessOutput, AdapterError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(AdapterError::ExecutableNotFound(String::new()));
        };

        let output = match Command::new(program).args(args).output() {
            Ok(output) => output,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AdapterError::ExecutableNotFound(program.clone()));
            }
            Err(err) => return Err(AdapterError::Io(err)),
        };

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
