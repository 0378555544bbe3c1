//! External process execution.
//!
//! Targets never spawn processes directly. They describe the call as an
//! [`Invocation`] and hand it to a [`CommandRunner`], which lets tests swap in
//! a recording runner and count invocations.

use std::future::Future;

use tokio::process::Command;
use tracing::{debug, info};

use super::types::{ExecuteError, Invocation};

/// Runs external processes to completion.
pub trait CommandRunner {
  /// Run `invocation` and wait for it to exit.
  ///
  /// Returns the trimmed stdout on success. A non-zero exit is an error
  /// carrying the exit code and stderr.
  fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<String, ExecuteError>>;
}

/// Runs processes on the host with tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  async fn run(&self, invocation: &Invocation) -> Result<String, ExecuteError> {
    info!(cmd = %invocation, "executing command");

    let mut command = Command::new(&invocation.program);
    command.args(&invocation.args).envs(&invocation.env);
    if let Some(cwd) = &invocation.cwd {
      command.current_dir(cwd);
    }

    debug!(program = ?invocation.program, cwd = ?invocation.cwd, "spawning process");

    let output = command.output().await.map_err(|e| ExecuteError::Spawn {
      program: invocation.program.display().to_string(),
      source: e,
    })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr).to_string();
      let stdout = String::from_utf8_lossy(&output.stdout);

      if !stdout.is_empty() {
        debug!(stdout = %stdout, "command stdout");
      }

      return Err(ExecuteError::CmdFailed {
        cmd: invocation.to_string(),
        code: output.status.code(),
        stderr,
      });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command output");
    }

    Ok(stdout)
  }
}
