//! Types for pipeline execution.
//!
//! This module defines the target identifiers, the error type every target
//! returns and the aggregated result of a run.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::context::ContextError;
use crate::execute::ExecuteError;
use crate::layout::LayoutError;
use crate::platform::permissions::PermissionError;

/// A named step of the packaging pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetId {
  Prepare,
  InitPackage,
  GenerateVersionBadge,
  GenerateCompressedFile,
  GenerateInstaller,
  GenerateNugetPackages,
  TestInstaller,
}

impl TargetId {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Prepare => "prepare",
      Self::InitPackage => "init-package",
      Self::GenerateVersionBadge => "generate-version-badge",
      Self::GenerateCompressedFile => "generate-compressed-file",
      Self::GenerateInstaller => "generate-installer",
      Self::GenerateNugetPackages => "generate-nuget-packages",
      Self::TestInstaller => "test-installer",
    }
  }
}

impl fmt::Display for TargetId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Errors a target (or pipeline validation) can fail with.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Context(#[from] ContextError),

  #[error("layout error: {0}")]
  Layout(#[from] LayoutError),

  #[error("permission fix-up failed: {0}")]
  Permissions(#[from] PermissionError),

  #[error("archive error: {0}")]
  Archive(#[from] ArchiveError),

  #[error("{what} not found: {path}")]
  MissingInput { what: &'static str, path: PathBuf },

  #[error("{action} {path}: {source}")]
  Io {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The packaging tool failed for one project.
  #[error("packaging {project} failed: {source}")]
  PackFailed {
    project: String,
    #[source]
    source: ExecuteError,
  },

  /// An installer hook exited unsuccessfully.
  #[error("{hook} hook failed: {source}")]
  HookFailed {
    hook: &'static str,
    #[source]
    source: ExecuteError,
  },

  /// A target reads a key nothing writes.
  #[error("target {target} consumes '{key}' but no target produces it")]
  MissingProducer { target: TargetId, key: String },

  /// A target reads a key that is only written by itself or a later target.
  #[error("target {target} consumes '{key}' before {producer} produces it")]
  OutOfOrder {
    target: TargetId,
    key: String,
    producer: TargetId,
  },

  #[error("target dependency cycle detected")]
  CycleDetected,
}

impl PipelineError {
  pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
    let path = path.into();
    move |source| Self::Io { action, path, source }
  }
}

/// Result of a target: `Ok(())` on success, the failure reason otherwise.
pub type TargetResult = Result<(), PipelineError>;

/// Outcome of a whole pipeline run.
#[derive(Debug, Default)]
pub struct PipelineResult {
  /// Targets that ran to completion, in order.
  pub completed: Vec<TargetId>,

  /// The target that failed and stopped the run (at most one).
  pub failed: Option<(TargetId, PipelineError)>,

  /// Targets that never started because of an earlier failure or a skip request.
  pub not_run: Vec<TargetId>,

  /// True when the run was turned into a no-op by the skip switch.
  pub skipped_by_request: bool,
}

impl PipelineResult {
  /// Returns true if no target failed.
  pub fn is_success(&self) -> bool {
    self.failed.is_none()
  }

  /// Returns the total number of targets accounted for.
  pub fn total(&self) -> usize {
    self.completed.len() + self.failed.iter().count() + self.not_run.len()
  }
}
