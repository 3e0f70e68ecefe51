//! Opt-in execution of generated programs
//!
//! Running translated code is arbitrary code execution, so it never happens
//! as a side effect of translation. An [`Executor`] can only be built with
//! [`Executor::opt_in`], naming the Python interpreter to use; the program
//! runs in a child process with its output captured.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::translator::GeneratedProgram;

/// Interpreter used when none is configured
pub const DEFAULT_PYTHON: &str = "python3";

/// Errors starting or talking to the interpreter. A generated program that
/// runs and fails is not an error; see [`ExecutionOutput::status`].
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to start {}: {source}", python.display())]
    Spawn {
        python: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to collect program output: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured result of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs generated programs with an external Python interpreter
#[derive(Debug, Clone)]
pub struct Executor {
    python: PathBuf,
    stdin: Option<String>,
    work_dir: Option<PathBuf>,
}

impl Executor {
    /// The only way to obtain an executor: the caller explicitly accepts
    /// that generated code will run with `python`.
    pub fn opt_in(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            stdin: None,
            work_dir: None,
        }
    }

    /// Text fed to the program's standard input (answers for `GET LIST`)
    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Directory the program runs in; record files are created there
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    /// Whether the configured interpreter can be started at all
    pub fn is_available(&self) -> bool {
        Command::new(&self.python)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    pub fn execute(&self, program: &GeneratedProgram) -> Result<ExecutionOutput, ExecError> {
        tracing::info!(
            python = %self.python().display(),
            procedure = %program.name,
            "executing generated program"
        );

        let mut cmd = Command::new(&self.python);
        cmd.arg("-c").arg(&program.code);
        cmd.env("PYTHONIOENCODING", "utf-8");
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(if self.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            python: self.python.clone(),
            source,
        })?;

        // Feed stdin from its own thread so a chatty program cannot
        // deadlock against a full output pipe
        let feeder = match (self.stdin.clone(), child.stdin.take()) {
            (Some(input), Some(mut pipe)) => Some(std::thread::spawn(move || {
                // The program may exit without reading everything
                let _ = pipe.write_all(input.as_bytes());
            })),
            _ => None,
        };

        let output = child.wait_with_output()?;
        if let Some(feeder) = feeder {
            let _ = feeder.join();
        }

        let result = ExecutionOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(status = ?result.status, "generated program finished");

        Ok(result)
    }
}
