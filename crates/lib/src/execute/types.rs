//! Types for running external processes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running an external process.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The process could not be started at all.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The process ran but exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}{}", format_stderr(.stderr))]
  CmdFailed {
    cmd: String,
    code: Option<i32>,
    stderr: String,
  },
}

fn format_stderr(stderr: &str) -> String {
  if stderr.trim().is_empty() {
    String::new()
  } else {
    format!("\n{}", stderr.trim_end())
  }
}

/// A single external process call: program, arguments and extra environment.
///
/// Extra environment variables are layered on top of the inherited
/// environment; tools like `tar` still need the caller's `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub program: PathBuf,
  pub args: Vec<String>,
  pub env: BTreeMap<String, String>,
  pub cwd: Option<PathBuf>,
}

impl Invocation {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      env: BTreeMap::new(),
      cwd: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn path_arg(self, path: &Path) -> Self {
    self.arg(path.to_string_lossy())
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
    self.env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program.display())?;
    for arg in &self.args {
      if arg.contains(' ') {
        write!(f, " \"{}\"", arg)?;
      } else {
        write!(f, " {}", arg)?;
      }
    }
    Ok(())
  }
}
