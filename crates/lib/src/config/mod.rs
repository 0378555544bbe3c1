//! Packaging configuration.
//!
//! Settings come from an optional `stagepack.toml` at the repository root,
//! then environment overrides. Every field has a default so an empty or
//! missing file yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  CONFIG_FILENAME, CONFIGURATION_ENV, DEFAULT_ARCHIVE_PREFIX, DEFAULT_CONFIGURATION, DEFAULT_LAUNCHERS,
  DEFAULT_PROJECTS, DEFAULT_TFM, SKIP_PACKAGING_ENV,
};
use crate::version::BuildVersion;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
  /// Build configuration passed to the packaging tool (e.g. `Debug`).
  pub configuration: String,
  /// Target framework moniker exported to collaborator scripts.
  pub tfm: String,
  /// File names that keep execute bits after the permission fix-up.
  pub launchers: Vec<String>,
  /// Leading part of archive and badge file names.
  pub archive_prefix: String,
  pub version: BuildVersion,
  pub packaging: PackagingConfig,
  pub installer: InstallerConfig,
}

impl Default for PackageConfig {
  fn default() -> Self {
    Self {
      configuration: DEFAULT_CONFIGURATION.to_string(),
      tfm: DEFAULT_TFM.to_string(),
      launchers: DEFAULT_LAUNCHERS.iter().map(|s| s.to_string()).collect(),
      archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
      version: BuildVersion::default(),
      packaging: PackagingConfig::default(),
      installer: InstallerConfig::default(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagingConfig {
  /// Packaging tool to invoke. Defaults to the stage2 `dotnet` host.
  pub tool: Option<PathBuf>,
  /// Library projects to pack, in order.
  pub projects: Vec<String>,
}

impl Default for PackagingConfig {
  fn default() -> Self {
    Self {
      tool: None,
      projects: DEFAULT_PROJECTS.iter().map(|s| s.to_string()).collect(),
    }
  }
}

/// External installer hooks. Each is a program followed by its arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
  pub generate: Option<Vec<String>>,
  pub test: Option<Vec<String>>,
}

impl PackageConfig {
  /// Parse a config file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;
    Self::parse(&content, path)
  }

  fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      source: e,
    })
  }

  /// Load `stagepack.toml` from the repo root, or defaults when absent.
  pub fn discover(repo_root: &Path) -> Result<Self, ConfigError> {
    let path = repo_root.join(CONFIG_FILENAME);
    if path.is_file() {
      debug!(path = ?path, "loading config");
      Self::load(&path)
    } else {
      debug!(path = ?path, "no config file, using defaults");
      Ok(Self::default())
    }
  }

  /// Apply overrides from the process environment.
  pub fn apply_env_overrides(&mut self) {
    if let Ok(configuration) = std::env::var(CONFIGURATION_ENV)
      && !configuration.is_empty()
    {
      debug!(configuration = %configuration, "configuration overridden from environment");
      self.configuration = configuration;
    }
  }
}

/// Returns true when the environment asks for packaging to be skipped.
pub fn skip_packaging_requested() -> bool {
  std::env::var(SKIP_PACKAGING_ENV)
    .map(|v| is_truthy(&v))
    .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
  matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
