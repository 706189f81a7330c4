//! Subprocess execution for external build tools.
//!
//! Tool output is always captured so that a failing configure or compile can
//! be reported verbatim alongside the stage that ran it.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

/// How a tool invocation ended, when it did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStatus {
    /// The program could not be spawned at all
    NotStarted,
    /// The program exited with a non-zero code
    Exited(i32),
    /// The program was killed by a signal
    Terminated,
}

impl fmt::Display for FailureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStatus::NotStarted => write!(f, "could not be started"),
            FailureStatus::Exited(code) => write!(f, "exited with code {}", code),
            FailureStatus::Terminated => write!(f, "was terminated by a signal"),
        }
    }
}

/// A failed tool invocation with everything it printed.
#[derive(Debug, Clone, Error)]
#[error("`{command}` {status}")]
pub struct ToolFailure {
    /// The command line that was run
    pub command: String,

    /// How it ended
    pub status: FailureStatus,

    /// Combined stdout and stderr, or the spawn error
    pub output: String,
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    pub fn get_program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Run to completion, capturing output, and require success.
    pub fn exec(&self) -> Result<ProcessOutput, ToolFailure> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        tracing::debug!("running `{}`", self.display_command());

        let output = cmd.output().map_err(|e| ToolFailure {
            command: self.display_command(),
            status: FailureStatus::NotStarted,
            output: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            return Ok(ProcessOutput { stdout, stderr });
        }

        let status = match output.status.code() {
            Some(code) => FailureStatus::Exited(code),
            None => FailureStatus::Terminated,
        };

        let mut combined = stdout;
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&stderr);

        Err(ToolFailure {
            command: self.display_command(),
            status,
            output: combined,
        })
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
