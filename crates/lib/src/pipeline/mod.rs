//! Target pipeline runner.
//!
//! A packaging run is a fixed sequence of targets sharing one
//! [`BuildContext`]. Targets run strictly one after another; the first
//! failure stops the run and later targets are reported as not run. Nothing
//! is rolled back: files written before a failure stay in place and are
//! rebuilt from scratch by the next run.

pub mod env;
pub mod plan;
pub mod targets;
pub mod types;

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, error, info};

use crate::archive::Archiver;
use crate::config::PackageConfig;
use crate::context::BuildContext;
use crate::execute::CommandRunner;
use crate::platform::Platform;
use crate::platform::paths::Dirs;
use crate::platform::permissions::PermissionFixup;

pub use env::common_env_vars;
pub use plan::{TargetDescriptor, default_targets, validate_order};
pub use types::{PipelineError, PipelineResult, TargetId, TargetResult};

/// Everything a run needs to know besides the build context.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
  pub dirs: Dirs,
  pub config: PackageConfig,
  pub platform: Platform,
  /// Turn the run into a no-op that succeeds immediately.
  pub skip_packaging: bool,
}

impl PipelineSettings {
  /// Settings with the standard directory layout under `repo_root`.
  pub fn new(repo_root: &Path, config: PackageConfig, platform: Platform) -> Self {
    Self {
      dirs: Dirs::new(repo_root, &platform.rid()),
      config,
      platform,
      skip_packaging: false,
    }
  }

  /// Packaging tool to invoke for each project.
  pub fn packaging_tool(&self) -> PathBuf {
    self.config.packaging.tool.clone().unwrap_or_else(|| {
      self
        .dirs
        .stage2
        .join(format!("dotnet{}", self.platform.os.exe_suffix()))
    })
  }
}

/// The packaging pipeline for one host platform.
///
/// The archiver and the permission fix-up are selected once, from the
/// platform in the settings, when the pipeline is created.
pub struct Pipeline<R> {
  settings: PipelineSettings,
  archiver: Archiver,
  permissions: PermissionFixup,
  targets: Vec<TargetDescriptor>,
  runner: R,
}

impl<R: CommandRunner> Pipeline<R> {
  pub fn new(settings: PipelineSettings, runner: R) -> Self {
    let archiver = Archiver::for_os(settings.platform.os);
    let permissions = PermissionFixup::for_os(settings.platform.os, &settings.config.launchers);
    Self {
      settings,
      archiver,
      permissions,
      targets: default_targets(),
      runner,
    }
  }

  pub fn settings(&self) -> &PipelineSettings {
    &self.settings
  }

  pub fn archiver(&self) -> Archiver {
    self.archiver
  }

  pub fn targets(&self) -> &[TargetDescriptor] {
    &self.targets
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  /// Check the target order against the keys already in `ctx`.
  pub fn validate(&self, ctx: &BuildContext) -> Result<(), PipelineError> {
    validate_order(&self.targets, &ctx.keys())
  }

  /// Run every target in order.
  ///
  /// Returns `Err` only if the target order is invalid. Target failures are
  /// recorded in the returned [`PipelineResult`].
  pub async fn run(&self, ctx: &mut BuildContext) -> Result<PipelineResult, PipelineError> {
    let mut result = PipelineResult::default();

    if self.settings.skip_packaging {
      info!("packaging skipped by request");
      result.skipped_by_request = true;
      result.not_run = self.targets.iter().map(|t| t.id).collect();
      return Ok(result);
    }

    self.validate(ctx)?;

    info!(
      targets = self.targets.len(),
      rid = %self.settings.platform.rid(),
      archiver = ?self.archiver,
      "starting packaging pipeline"
    );

    for (idx, target) in self.targets.iter().enumerate() {
      let start = Instant::now();
      info!(name = %target.id, "running target");

      match self.run_target(target.id, ctx).await {
        Ok(()) => {
          debug!(name = %target.id, elapsed = ?start.elapsed(), "target complete");
          result.completed.push(target.id);
        }
        Err(e) => {
          error!(name = %target.id, error = %e, "target failed");
          result.failed = Some((target.id, e));
          result.not_run = self.targets[idx + 1..].iter().map(|t| t.id).collect();
          break;
        }
      }
    }

    Ok(result)
  }

  async fn run_target(&self, id: TargetId, ctx: &mut BuildContext) -> TargetResult {
    match id {
      TargetId::Prepare => self.prepare(ctx),
      TargetId::InitPackage => self.init_package(ctx),
      TargetId::GenerateVersionBadge => self.generate_version_badge(ctx),
      TargetId::GenerateCompressedFile => self.generate_compressed_file(ctx).await,
      TargetId::GenerateInstaller => self.generate_installer(ctx).await,
      TargetId::GenerateNugetPackages => self.generate_nuget_packages(ctx).await,
      TargetId::TestInstaller => self.test_installer(ctx).await,
    }
  }
}
