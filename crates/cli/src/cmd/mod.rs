mod env;
mod info;
mod package;
mod plan;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use stagepack_lib::config::{PackageConfig, skip_packaging_requested};
use stagepack_lib::pipeline::PipelineSettings;
use stagepack_lib::platform::Platform;

use crate::output::OutputFormat;

pub use env::cmd_env;
pub use info::cmd_info;
pub use package::cmd_package;
pub use plan::cmd_plan;

/// Options shared by every subcommand.
pub struct GlobalOpts {
  pub repo_root: Option<PathBuf>,
  pub config: Option<PathBuf>,
  pub configuration: Option<String>,
  pub output: OutputFormat,
}

impl GlobalOpts {
  fn repo_root(&self) -> Result<PathBuf> {
    let root = match &self.repo_root {
      Some(root) => root.clone(),
      None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    dunce::canonicalize(&root).with_context(|| format!("Repository root not found: {}", root.display()))
  }

  /// Resolve settings from config file, environment and flags, in that order.
  pub fn settings(&self) -> Result<PipelineSettings> {
    let repo_root = self.repo_root()?;

    let mut config = match &self.config {
      Some(path) => PackageConfig::load(path)?,
      None => PackageConfig::discover(&repo_root)?,
    };
    config.apply_env_overrides();
    if let Some(configuration) = &self.configuration {
      config.configuration = configuration.clone();
    }

    let platform = Platform::current().context("Unsupported host platform")?;
    debug!(repo_root = ?repo_root, rid = %platform.rid(), "resolved settings");

    let mut settings = PipelineSettings::new(&repo_root, config, platform);
    settings.skip_packaging = skip_packaging_requested();
    Ok(settings)
  }
}
