//! Target implementations.
//!
//! Every target reads what it needs from the build context, does its
//! filesystem or process work, and publishes its outputs under the keys its
//! descriptor declares.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::archive::Archiver;
use crate::consts::VERSION_BADGE_TOKEN;
use crate::context::{BuildContext, keys};
use crate::execute::{CommandRunner, Invocation};
use crate::layout::{self, LayoutError};
use crate::platform::paths::Dirs;
use crate::version::BuildVersion;

use super::env::common_env_vars;
use super::types::{PipelineError, TargetResult};
use super::Pipeline;

/// How a primary layout is filled from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyMode {
  Recursive,
  TopLevelFiles,
}

impl<R: CommandRunner> Pipeline<R> {
  /// Publish the version, configuration and artifact paths.
  pub(super) fn prepare(&self, ctx: &mut BuildContext) -> TargetResult {
    let settings = self.settings();
    let version = settings.config.version.clone();
    let nuget = version.nuget_version();
    let rid = settings.platform.rid();
    let ext = self.archiver().extension();
    let prefix = &settings.config.archive_prefix;
    let packages = &settings.dirs.packages;

    ctx.set(
      keys::VERSION_BADGE,
      settings.dirs.output.join(format!(
        "sdk_{}_{}_{}.svg",
        nuget, settings.platform.os, settings.platform.arch
      )),
    );
    ctx.set(
      keys::COMBINED_HOST_ARCHIVE,
      packages.join(format!("{prefix}-{rid}.{nuget}{ext}")),
    );
    ctx.set(
      keys::COMBINED_NO_HOST_ARCHIVE,
      packages.join(format!("{prefix}-nohost-{rid}.{nuget}{ext}")),
    );
    ctx.set(
      keys::SDK_SYMBOLS_ARCHIVE,
      packages.join(format!("{prefix}-debug-{rid}.{nuget}{ext}")),
    );
    ctx.set(keys::CONFIGURATION, settings.config.configuration.clone());

    info!(version = %nuget, configuration = %settings.config.configuration, "build context prepared");
    ctx.set(keys::BUILD_VERSION, version);

    Ok(())
  }

  /// Rebuild every layout directory from the stage2 output.
  pub(super) fn init_package(&self, ctx: &mut BuildContext) -> TargetResult {
    let dirs = &self.settings().dirs;
    let obj = &dirs.intermediate;

    let sdk = self.copy_layout(&dirs.stage2.join("sdk"), &obj.join("clisdk"), CopyMode::Recursive)?;
    ctx.set(keys::SDK_ROOT, sdk);

    let shared_host = self.copy_layout(&dirs.stage2, &obj.join("sharedHost"), CopyMode::TopLevelFiles)?;
    ctx.set(keys::SHARED_HOST_ROOT, shared_host);

    let host_fxr = self.copy_layout(&dirs.stage2.join("host"), &obj.join("hostFxr"), CopyMode::Recursive)?;
    ctx.set(keys::HOST_FXR_ROOT, host_fxr);

    let shared_fx = self.copy_layout(&dirs.stage2.join("shared"), &obj.join("sharedFx"), CopyMode::Recursive)?;
    ctx.set(keys::SHARED_FRAMEWORK_ROOT, shared_fx);

    let combined_host = combine(
      ctx,
      &[
        keys::SDK_ROOT,
        keys::SHARED_FRAMEWORK_ROOT,
        keys::SHARED_HOST_ROOT,
        keys::HOST_FXR_ROOT,
      ],
      &obj.join("combined-framework-sdk-host"),
    )?;
    ctx.set(keys::COMBINED_HOST_ROOT, combined_host);

    let combined_no_host = combine(
      ctx,
      &[keys::SDK_ROOT, keys::SHARED_FRAMEWORK_ROOT],
      &obj.join("combined-framework-sdk"),
    )?;
    ctx.set(keys::COMBINED_NO_HOST_ROOT, combined_no_host);

    fs::create_dir_all(&dirs.packages).map_err(PipelineError::io("failed to create", &dirs.packages))?;

    Ok(())
  }

  /// Stamp the version into the badge template.
  pub(super) fn generate_version_badge(&self, ctx: &BuildContext) -> TargetResult {
    let version: &BuildVersion = ctx.get(keys::BUILD_VERSION)?;
    let output: &PathBuf = ctx.get(keys::VERSION_BADGE)?;
    let template = self.settings().dirs.version_badge_template();

    if !template.is_file() {
      return Err(PipelineError::MissingInput {
        what: "version badge template",
        path: template,
      });
    }

    let content = fs::read_to_string(&template).map_err(PipelineError::io("failed to read", &template))?;
    let stamped = stamp_version(&content, &version.nuget_version());

    if let Some(parent) = output.parent() {
      fs::create_dir_all(parent).map_err(PipelineError::io("failed to create", parent))?;
    }
    fs::write(output, stamped).map_err(PipelineError::io("failed to write", output))?;

    info!(path = ?output, "version badge written");
    Ok(())
  }

  /// Archive the combined layouts and the sdk symbols.
  pub(super) async fn generate_compressed_file(&self, ctx: &BuildContext) -> TargetResult {
    let combined_host: &PathBuf = ctx.get(keys::COMBINED_HOST_ROOT)?;
    let combined_no_host: &PathBuf = ctx.get(keys::COMBINED_NO_HOST_ROOT)?;
    let host_archive: &PathBuf = ctx.get(keys::COMBINED_HOST_ARCHIVE)?;
    let no_host_archive: &PathBuf = ctx.get(keys::COMBINED_NO_HOST_ARCHIVE)?;
    let symbols_archive: &PathBuf = ctx.get(keys::SDK_SYMBOLS_ARCHIVE)?;
    let symbols = self.settings().dirs.stage2_symbols.join("sdk");

    let jobs: Vec<(&Path, &Path)> = match self.archiver() {
      Archiver::Zip => vec![
        (combined_host.as_path(), host_archive.as_path()),
        (combined_no_host.as_path(), no_host_archive.as_path()),
        (symbols.as_path(), symbols_archive.as_path()),
      ],
      Archiver::TarGz => vec![
        (combined_host.as_path(), host_archive.as_path()),
        (symbols.as_path(), symbols_archive.as_path()),
      ],
    };

    for (dir, artifact) in jobs {
      self.archiver().archive(dir, artifact, self.runner()).await?;
    }

    Ok(())
  }

  pub(super) async fn generate_installer(&self, ctx: &BuildContext) -> TargetResult {
    self
      .run_hook("generate-installer", self.settings().config.installer.generate.as_deref(), ctx)
      .await
  }

  /// Pack every configured project, stopping at the first failure.
  pub(super) async fn generate_nuget_packages(&self, ctx: &BuildContext) -> TargetResult {
    let version: &BuildVersion = ctx.get(keys::BUILD_VERSION)?;
    let configuration: &String = ctx.get(keys::CONFIGURATION)?;
    let env = common_env_vars(ctx, self.settings())?;
    let dirs = &self.settings().dirs;
    let tool = self.settings().packaging_tool();
    let version_suffix = version.commit_count_string();

    fs::create_dir_all(&dirs.packages).map_err(PipelineError::io("failed to create", &dirs.packages))?;

    for project in &self.settings().config.packaging.projects {
      info!(project = %project, "packing project");

      let invocation = pack_invocation(&tool, dirs, project, configuration, &version_suffix).envs(&env);
      self
        .runner()
        .run(&invocation)
        .await
        .map_err(|e| PipelineError::PackFailed {
          project: project.clone(),
          source: e,
        })?;
    }

    Ok(())
  }

  pub(super) async fn test_installer(&self, ctx: &BuildContext) -> TargetResult {
    self
      .run_hook("test-installer", self.settings().config.installer.test.as_deref(), ctx)
      .await
  }

  /// Delete, recreate and fill one primary layout, then fix its permissions.
  fn copy_layout(&self, src: &Path, dst: &Path, mode: CopyMode) -> Result<PathBuf, PipelineError> {
    if !src.is_dir() {
      return Err(LayoutError::MissingSource(src.to_path_buf()).into());
    }

    layout::reset_dir(dst)?;
    match mode {
      CopyMode::Recursive => layout::copy_dir_recursive(src, dst)?,
      CopyMode::TopLevelFiles => layout::copy_top_level_files(src, dst)?,
    }
    self.permissions.apply(dst)?;

    info!(from = ?src, to = ?dst, "layout copied");
    Ok(dst.to_path_buf())
  }

  /// Run an installer hook with the environment table, if one is configured.
  async fn run_hook(&self, hook: &'static str, command: Option<&[String]>, ctx: &BuildContext) -> TargetResult {
    let Some((program, args)) = command.and_then(|c| c.split_first()) else {
      info!(hook, "no command configured, skipping");
      return Ok(());
    };

    let env = common_env_vars(ctx, self.settings())?;
    let invocation = Invocation::new(program)
      .args(args.iter().cloned())
      .envs(&env)
      .current_dir(&self.settings().dirs.repo_root);

    self
      .runner()
      .run(&invocation)
      .await
      .map_err(|e| PipelineError::HookFailed { hook, source: e })?;

    Ok(())
  }
}

/// Compose the layouts stored under `root_keys` into `dst`, in order.
fn combine(ctx: &BuildContext, root_keys: &[&str], dst: &Path) -> Result<PathBuf, PipelineError> {
  let roots = root_keys
    .iter()
    .map(|key| ctx.get::<PathBuf>(key).map(PathBuf::as_path))
    .collect::<Result<Vec<_>, _>>()?;

  layout::compose(&roots, dst)?;

  info!(to = ?dst, roots = roots.len(), "combined layout composed");
  Ok(dst.to_path_buf())
}

/// Replace every version token in a badge template.
pub fn stamp_version(template: &str, version: &str) -> String {
  template.replace(VERSION_BADGE_TOKEN, version)
}

/// Packaging tool call for a single project.
pub fn pack_invocation(tool: &Path, dirs: &Dirs, project: &str, configuration: &str, version_suffix: &str) -> Invocation {
  Invocation::new(tool)
    .arg("pack")
    .path_arg(&dirs.project_file(project))
    .arg("--no-build")
    .arg("--serviceable")
    .arg("--build-base-path")
    .path_arg(&dirs.packaging_build_base())
    .arg("--output")
    .path_arg(&dirs.packages)
    .arg("--configuration")
    .arg(configuration)
    .arg("--version-suffix")
    .arg(version_suffix)
}
